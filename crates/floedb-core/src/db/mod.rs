pub mod normalize;
pub mod query;
pub mod session;
pub mod table;

pub use normalize::{NormalizeError, Normalized, normalize};
pub use query::{Query, QueryError, StoredQueryDef};
pub use session::DbSession;
pub use table::{EntityTable, StoredQueryTable};

use crate::{
    obs::{ChangeEvent, StoreObserver, Topic, WatchId, WatchRegistry},
    patch::{EntityPatch, MergeCustomizer, StoredQueryUpdate, TablePatch},
    value::Value,
};
use floedb_schema::{MAX_QUERY_NAME_LEN, err, error::ErrorTree, schema::Schema};
use std::{
    cell::RefCell,
    collections::{BTreeMap, BTreeSet},
    fmt,
    panic::{AssertUnwindSafe, catch_unwind},
    rc::Rc,
};
use thiserror::Error as ThisError;
use tracing::{debug, info, trace, warn};

///
/// OpenError
///

#[derive(Debug, ThisError)]
pub enum OpenError {
    #[error("stored query validation failed: {0}")]
    Validation(ErrorTree),
}

///
/// DbConfig
///

#[derive(Default)]
pub struct DbConfig {
    pub default_entities: TablePatch,
    pub observer: Option<Box<dyn StoreObserver>>,
}

impl DbConfig {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            default_entities: TablePatch::new(),
            observer: None,
        }
    }

    /// Seed the store with records before any merge runs.
    #[must_use]
    pub fn default_entities(mut self, patch: TablePatch) -> Self {
        self.default_entities = patch;
        self
    }

    /// Attach an observer that receives a snapshot after every merge.
    #[must_use]
    pub fn observer(mut self, observer: impl StoreObserver + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("default_entities", &self.default_entities.record_count())
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

///
/// DbState
///

#[derive(Clone, Debug, Default)]
struct DbState {
    entities: EntityTable,
    stored_queries: StoredQueryTable,
}

///
/// Db
///
/// A normalized in-memory store: entity tables, named query slots, and
/// the watcher registry that bridges changes out. Single-threaded by
/// construction; all interior mutability is RefCell.
///

pub struct Db {
    schema: Schema,
    queries: BTreeMap<String, StoredQueryDef>,
    state: RefCell<DbState>,
    watchers: WatchRegistry,
    observer: Option<Box<dyn StoreObserver>>,
}

impl Db {
    /// Open a store from a validated schema and its stored query defs.
    pub fn open(
        schema: Schema,
        queries: Vec<StoredQueryDef>,
        config: DbConfig,
    ) -> Result<Self, OpenError> {
        let mut errs = ErrorTree::new();

        // Phase 1: per-query naming and shape checks
        for def in &queries {
            if def.name.is_empty() {
                err!(errs, "stored query has an empty name");
            } else if def.name.len() > MAX_QUERY_NAME_LEN {
                err!(
                    errs,
                    "stored query '{}' exceeds {MAX_QUERY_NAME_LEN} characters",
                    def.name
                );
            }
            if let Err(shape_errs) = schema.validate_shape(&def.shape) {
                for msg in shape_errs.iter() {
                    err!(errs, "stored query '{}': {msg}", def.name);
                }
            }
        }

        // Phase 2: cross-query checks
        let mut seen = BTreeSet::new();
        for def in &queries {
            if !def.name.is_empty() && !seen.insert(def.name.as_str()) {
                err!(errs, "duplicate stored query name '{}'", def.name);
            }
        }

        errs.result().map_err(OpenError::Validation)?;

        let mut entities = EntityTable::new();
        for name in schema.names() {
            entities.ensure_type(name);
        }
        let entities = entities.merged_with(filter_unknown(&schema, config.default_entities), None);

        let mut stored_queries = StoredQueryTable::new();
        let mut by_name = BTreeMap::new();
        for def in queries {
            stored_queries.set(def.name.clone(), def.default.clone());
            by_name.insert(def.name.clone(), def);
        }

        info!(
            entities = entities.record_count(),
            queries = by_name.len(),
            "opened floedb store"
        );

        Ok(Self {
            schema,
            queries: by_name,
            state: RefCell::new(DbState {
                entities,
                stored_queries,
            }),
            watchers: WatchRegistry::new(),
            observer: config.observer,
        })
    }

    #[must_use]
    pub const fn session(&self) -> DbSession<'_> {
        DbSession::new(self)
    }

    #[must_use]
    pub const fn schema(&self) -> &Schema {
        &self.schema
    }

    // ----
    // watching
    // ----

    /// Register a callback for a set of topics.
    pub fn watch(
        &self,
        topics: impl IntoIterator<Item = Topic>,
        callback: impl Fn(&ChangeEvent) + 'static,
    ) -> WatchId {
        self.watchers
            .watch(topics.into_iter().collect(), Rc::new(callback))
    }

    /// Drop a watch registration, returning whether it existed.
    pub fn unwatch(&self, id: WatchId) -> bool {
        self.watchers.unwatch(id)
    }

    // ----
    // write path
    // ----

    pub(crate) fn merge(&self, patch: EntityPatch, customizer: Option<&dyn MergeCustomizer>) {
        // Updaters run under a shared borrow so they may read back
        // through the session. A nested write panics.
        let resolved = {
            let state = self.state.borrow();
            patch.resolve(&state.entities)
        };
        let filtered = filter_unknown(&self.schema, resolved);

        let touched: BTreeSet<String> = filtered.keys().cloned().collect();
        let incoming = filtered.record_count();
        for (entity, records) in filtered.iter() {
            trace!(entity = %entity, records = records.len(), "merging entity records");
        }

        let changed = {
            let mut state = self.state.borrow_mut();
            let next = state.entities.merged_with(filtered, customizer);
            let changed: BTreeSet<Topic> = touched
                .into_iter()
                .filter(|entity| state.entities.entities_of(entity) != next.entities_of(entity))
                .map(Topic::Entities)
                .collect();
            state.entities = next;

            changed
        };

        debug!(
            records = incoming,
            changed = changed.len(),
            "merged entity patch"
        );

        if let Some(observer) = &self.observer {
            let snapshot = self.state.borrow().entities.clone();
            if catch_unwind(AssertUnwindSafe(|| observer.on_merge(snapshot))).is_err() {
                warn!("store observer panicked during merge");
            }
        }

        self.watchers.notify(&changed);
    }

    pub(crate) fn update_stored_query(
        &self,
        name: &str,
        update: StoredQueryUpdate,
    ) -> Result<(), QueryError> {
        if !self.queries.contains_key(name) {
            return Err(QueryError::NoSuchQuery(name.to_string()));
        }

        // Same borrow discipline as merge: the update closure may read,
        // a nested write panics.
        let (current, next) = {
            let state = self.state.borrow();
            let current = state.stored_queries.get(name).cloned().unwrap_or_default();
            let next = update.resolve(&current);

            (current, next)
        };

        if next == current {
            return Ok(());
        }

        self.state.borrow_mut().stored_queries.set(name, next);
        debug!(query = name, "stored query updated");
        self.watchers
            .notify(&BTreeSet::from([Topic::stored_query(name)]));

        Ok(())
    }

    // ----
    // read path
    // ----

    pub(crate) fn execute_query(&self, query: &Query) -> Option<Value> {
        let state = self.state.borrow();

        query::denormalize(&self.schema, &query.shape, &query.value, &state.entities)
    }

    pub(crate) fn stored_query(&self, name: &str) -> Result<Query, QueryError> {
        let Some(def) = self.queries.get(name) else {
            return Err(QueryError::NoSuchQuery(name.to_string()));
        };
        let value = self
            .state
            .borrow()
            .stored_queries
            .get(name)
            .cloned()
            .unwrap_or_else(|| def.default.clone());

        Ok(Query::new(def.shape.clone(), value))
    }

    pub(crate) fn entities(&self) -> EntityTable {
        self.state.borrow().entities.clone()
    }

    pub(crate) fn stored_queries(&self) -> StoredQueryTable {
        self.state.borrow().stored_queries.clone()
    }

    pub(crate) fn with_entities<R>(&self, f: impl FnOnce(&EntityTable) -> R) -> R {
        f(&self.state.borrow().entities)
    }
}

impl fmt::Debug for Db {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Db")
            .field("entities", &self.schema.len())
            .field("queries", &self.queries.len())
            .finish_non_exhaustive()
    }
}

// Drop patch keys that name no schema entity. Merges never fail on
// unknown types, they shed them.
fn filter_unknown(schema: &Schema, patch: TablePatch) -> TablePatch {
    let mut filtered = TablePatch::new();
    for (entity, records) in patch {
        if schema.contains(&entity) {
            filtered.insert(entity, records);
        } else {
            debug!(entity = %entity, "dropping records for unknown entity type");
        }
    }

    filtered
}

///
/// TESTS
///
