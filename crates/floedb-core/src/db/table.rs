use crate::{
    patch::{MergeCustomizer, TablePatch, merge_record},
    value::{EntityId, Record, RefValue},
};
use derive_more::{Deref, DerefMut};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

///
/// EntityTable
/// Every entity record known to the store, keyed by type then id.
/// A plain value: snapshots are clones, fully detached from live state.
///

#[derive(Clone, Debug, Default, Deref, DerefMut, Eq, PartialEq, Serialize, Deserialize)]
pub struct EntityTable(BTreeMap<String, BTreeMap<EntityId, Record>>);

impl EntityTable {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Look up one entity record.
    #[must_use]
    pub fn entity(&self, entity: &str, id: &EntityId) -> Option<&Record> {
        self.0.get(entity)?.get(id)
    }

    /// All records of one entity type, keyed by id.
    #[must_use]
    pub fn entities_of(&self, entity: &str) -> Option<&BTreeMap<EntityId, Record>> {
        self.0.get(entity)
    }

    #[must_use]
    pub fn contains_entity(&self, entity: &str, id: &EntityId) -> bool {
        self.entity(entity, id).is_some()
    }

    /// Total number of records across all entity types.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.0.values().map(BTreeMap::len).sum()
    }

    /// Pre-create an empty id map for an entity type.
    pub(crate) fn ensure_type(&mut self, entity: impl Into<String>) {
        self.0.entry(entity.into()).or_default();
    }

    /// Compute the next table with a patch deep-merged in. The receiver
    /// is untouched; tables are replaced wholesale, never edited in
    /// place.
    #[must_use]
    pub(crate) fn merged_with(
        &self,
        patch: TablePatch,
        customizer: Option<&dyn MergeCustomizer>,
    ) -> Self {
        let mut next = self.clone();
        for (entity, records) in patch {
            let table = next.0.entry(entity).or_default();
            for (id, record) in records {
                let merged = match table.get(&id) {
                    Some(existing) => merge_record(existing, &record, customizer),
                    None => record,
                };
                table.insert(id, merged);
            }
        }

        next
    }
}

///
/// StoredQueryTable
/// Current value of every stored query, keyed by query name.
///

#[derive(Clone, Debug, Default, Deref, Eq, PartialEq, Serialize, Deserialize)]
pub struct StoredQueryTable(BTreeMap<String, RefValue>);

impl StoredQueryTable {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub(crate) fn set(&mut self, name: impl Into<String>, value: RefValue) {
        self.0.insert(name.into(), value);
    }
}
