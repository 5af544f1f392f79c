use crate::{
    db::{Db, EntityTable, Query, QueryError, StoredQueryTable},
    patch::{EntityPatch, MergeCustomizer, StoredQueryUpdate},
    value::Value,
};
use tracing::debug;

///
/// DbSession
///
/// Session-scoped store handle with policy (debug) and operation
/// routing. Cheap to copy; all state lives on the Db it borrows.
///

#[derive(Clone, Copy)]
pub struct DbSession<'a> {
    db: &'a Db,
    debug: bool,
}

impl<'a> DbSession<'a> {
    #[must_use]
    pub(crate) const fn new(db: &'a Db) -> Self {
        Self { db, debug: false }
    }

    #[must_use]
    pub const fn debug(mut self) -> Self {
        self.debug = true;
        self
    }

    // ----
    // write path
    // ----

    /// Deep-merge an entity patch into the store.
    pub fn merge_entities(&self, patch: impl Into<EntityPatch>) {
        if self.debug {
            debug!("session merge");
        }
        self.db.merge(patch.into(), None);
    }

    /// Deep-merge with a customizer consulted at every value pair.
    pub fn merge_entities_with(
        &self,
        patch: impl Into<EntityPatch>,
        customizer: &dyn MergeCustomizer,
    ) {
        if self.debug {
            debug!("session merge with customizer");
        }
        self.db.merge(patch.into(), Some(customizer));
    }

    /// Replace or update the value held by a stored query slot.
    pub fn update_stored_query(
        &self,
        name: &str,
        update: impl Into<StoredQueryUpdate>,
    ) -> Result<(), QueryError> {
        if self.debug {
            debug!(query = name, "session stored query update");
        }
        self.db.update_stored_query(name, update.into())
    }

    // ----
    // read path
    // ----

    /// Materialize an ad hoc query against the current tables.
    #[must_use]
    pub fn execute_query(&self, query: &Query) -> Option<Value> {
        let result = self.db.execute_query(query);
        if self.debug {
            debug!(resolved = result.is_some(), "session query executed");
        }

        result
    }

    /// Fetch a stored query slot as an executable query.
    pub fn get_stored_query(&self, name: &str) -> Result<Query, QueryError> {
        self.db.stored_query(name)
    }

    /// Fetch and materialize a stored query in one step.
    pub fn execute_stored_query(&self, name: &str) -> Result<Option<Value>, QueryError> {
        let query = self.get_stored_query(name)?;

        Ok(self.execute_query(&query))
    }

    // ----
    // snapshots
    // ----

    /// Clone the entity tables as they stand.
    #[must_use]
    pub fn entities(&self) -> EntityTable {
        self.db.entities()
    }

    /// Clone the stored query slots as they stand.
    #[must_use]
    pub fn stored_queries(&self) -> StoredQueryTable {
        self.db.stored_queries()
    }

    /// Run a closure against the live entity tables without cloning.
    pub fn with_entities<R>(&self, f: impl FnOnce(&EntityTable) -> R) -> R {
        self.db.with_entities(f)
    }
}

///
/// TESTS
///
