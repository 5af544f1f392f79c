//! Core runtime for FloeDB: values, patches, the normalized store, the
//! query engine, and the ergonomics exported via the `prelude`.
#![warn(unreachable_pub)]

pub mod db;
pub mod obs;
pub mod patch;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_fixtures;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, tables, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        db::{Db, DbConfig, DbSession, Query, StoredQueryDef, normalize},
        obs::{ChangeEvent, StoreObserver, Topic, WatchId},
        patch::{EntityPatch, MergeCustomizer, StoredQueryUpdate, TablePatch},
        value::{EntityId, Record, RefValue, Value},
    };
}
