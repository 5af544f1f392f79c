pub mod merge;

#[cfg(test)]
mod tests;

pub use merge::{MergeCustomizer, merge_record, merge_value};

use crate::{
    db::table::EntityTable,
    value::{EntityId, Record, RefValue},
};
use derive_more::{Deref, DerefMut, IntoIterator};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt::{self, Debug},
};

///
/// TablePatch
/// Partial entity tables keyed by type then id. The unit of write for
/// merge operations.
///

#[derive(
    Clone,
    Debug,
    Default,
    Deref,
    DerefMut,
    Eq,
    IntoIterator,
    PartialEq,
    Serialize,
    Deserialize,
)]
pub struct TablePatch(BTreeMap<String, BTreeMap<EntityId, Record>>);

impl TablePatch {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder: add one entity record.
    #[must_use]
    pub fn entity(
        mut self,
        entity: impl Into<String>,
        id: impl Into<EntityId>,
        record: Record,
    ) -> Self {
        self.insert_record(entity, id, record);
        self
    }

    /// Add one entity record, deep-merging if the patch already carries
    /// a record for the same id.
    pub fn insert_record(
        &mut self,
        entity: impl Into<String>,
        id: impl Into<EntityId>,
        record: Record,
    ) {
        let id = id.into();
        let records = self.0.entry(entity.into()).or_default();
        let merged = match records.get(&id) {
            Some(existing) => merge_record(existing, &record, None),
            None => record,
        };
        records.insert(id, merged);
    }

    /// Total number of records across all entity types.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.0.values().map(BTreeMap::len).sum()
    }
}

///
/// EntityPatch
/// A write against the entity tables: either a literal partial table,
/// or an updater that derives one from the current tables.
///

pub enum EntityPatch {
    Literal(TablePatch),
    Updater(Box<dyn FnOnce(&EntityTable) -> TablePatch>),
}

impl EntityPatch {
    #[must_use]
    pub const fn literal(patch: TablePatch) -> Self {
        Self::Literal(patch)
    }

    #[must_use]
    pub fn updater(f: impl FnOnce(&EntityTable) -> TablePatch + 'static) -> Self {
        Self::Updater(Box::new(f))
    }

    /// Resolve to a concrete patch against the current tables.
    pub(crate) fn resolve(self, entities: &EntityTable) -> TablePatch {
        match self {
            Self::Literal(patch) => patch,
            Self::Updater(f) => f(entities),
        }
    }
}

impl From<TablePatch> for EntityPatch {
    fn from(patch: TablePatch) -> Self {
        Self::Literal(patch)
    }
}

impl Debug for EntityPatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(patch) => f.debug_tuple("Literal").field(patch).finish(),
            Self::Updater(_) => f.debug_tuple("Updater").finish(),
        }
    }
}

///
/// StoredQueryUpdate
/// A write against one stored query's value: either a replacement
/// value, or an updater that derives one from the current value.
///

pub enum StoredQueryUpdate {
    Set(RefValue),
    Update(Box<dyn FnOnce(&RefValue) -> RefValue>),
}

impl StoredQueryUpdate {
    #[must_use]
    pub const fn set(value: RefValue) -> Self {
        Self::Set(value)
    }

    #[must_use]
    pub fn update(f: impl FnOnce(&RefValue) -> RefValue + 'static) -> Self {
        Self::Update(Box::new(f))
    }

    /// Resolve to the next value against the current one.
    pub(crate) fn resolve(self, current: &RefValue) -> RefValue {
        match self {
            Self::Set(value) => value,
            Self::Update(f) => f(current),
        }
    }
}

impl From<RefValue> for StoredQueryUpdate {
    fn from(value: RefValue) -> Self {
        Self::Set(value)
    }
}

impl Debug for StoredQueryUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Set(value) => f.debug_tuple("Set").field(value).finish(),
            Self::Update(_) => f.debug_tuple("Update").finish(),
        }
    }
}
