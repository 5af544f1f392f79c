//! FloeDB — a normalized in-memory entity store with stored queries.
//!
//! This is the public meta-crate. Downstream users depend on **floedb** only.
//!
//! It re-exports the stable public API from:
//!   - `floedb-core`   (values, patches, the store, queries, watching)
//!   - `floedb-schema` (entity definitions, shapes, validation)

pub use floedb_core as core;
pub use floedb_schema as schema;

pub use floedb_core::{
    db::{
        Db, DbConfig, DbSession, EntityTable, NormalizeError, Normalized, OpenError, Query,
        QueryError, StoredQueryDef, StoredQueryTable, normalize,
    },
    obs::{ChangeEvent, StoreObserver, Topic, WatchId},
    patch::{
        EntityPatch, MergeCustomizer, StoredQueryUpdate, TablePatch, merge_record, merge_value,
    },
    value::{EntityId, Record, RefValue, Value},
};
pub use floedb_schema::{
    entity::{EntityDef, ReferenceDef},
    error::ErrorTree,
    schema::Schema,
    shape::Shape,
    types::Cardinality,
};

use thiserror::Error as ThisError;

///
/// Error
/// Umbrella error for embedders that funnel every failure into one type.
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] floedb_schema::Error),

    #[error(transparent)]
    Open(#[from] OpenError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

//
// Prelude
//

pub mod prelude {
    pub use floedb_core::prelude::*;
    pub use floedb_schema::prelude::*;
}
