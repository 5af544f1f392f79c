pub mod entity;
pub mod error;
pub mod schema;
pub mod shape;
pub mod types;
pub mod validate;

/// Maximum length for entity type identifiers.
pub const MAX_ENTITY_NAME_LEN: usize = 64;

/// Maximum length for attribute identifiers (id attributes and reference fields).
pub const MAX_ATTRIBUTE_NAME_LEN: usize = 64;

/// Maximum length for stored query identifiers.
pub const MAX_QUERY_NAME_LEN: usize = 64;

use crate::error::ErrorTree;
use thiserror::Error as ThisError;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        entity::{EntityDef, ReferenceDef},
        err,
        error::ErrorTree,
        schema::Schema,
        shape::Shape,
        types::Cardinality,
    };
    pub use serde::{Deserialize, Serialize};
}

///
/// Error
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("schema validation failed: {0}")]
    Validation(ErrorTree),
}
