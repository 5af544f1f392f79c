use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

///
/// EntityId
/// Identity of one entity within its type's table. Ids are typed: the
/// integer 1 and the text "1" are different ids.
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Int(i64),
    Text(String),
}

impl EntityId {
    /// Read an id out of an attribute value, if the value can carry one.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(i) => Some(Self::Int(*i)),
            Value::Uint(u) => i64::try_from(*u).ok().map(Self::Int),
            Value::Text(s) => Some(Self::Text(s.clone())),
            _ => None,
        }
    }

    /// Render the id back as an attribute value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Int(i) => Value::Int(*i),
            Self::Text(s) => Value::Text(s.clone()),
        }
    }
}

impl Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for EntityId {
    fn from(id: i64) -> Self {
        Self::Int(id)
    }
}

impl From<i32> for EntityId {
    fn from(id: i32) -> Self {
        Self::Int(i64::from(id))
    }
}

impl From<u32> for EntityId {
    fn from(id: u32) -> Self {
        Self::Int(i64::from(id))
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_string())
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self::Text(id)
    }
}
