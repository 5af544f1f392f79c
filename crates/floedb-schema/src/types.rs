use serde::{Deserialize, Serialize};

///
/// Cardinality
/// Arity of a reference attribute.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Cardinality {
    /// the attribute holds a single referenced id
    One,
    /// the attribute holds an ordered list of referenced ids
    Many,
}
