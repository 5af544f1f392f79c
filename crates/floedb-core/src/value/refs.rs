use crate::value::EntityId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

///
/// RefValue
/// The normalized form of a query result: entity ids arranged in the
/// query's shape, with no attribute data. Serializes to plain JSON
/// (null, scalar id, array, object).
///

#[derive(Clone, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RefValue {
    #[default]
    None,
    Id(EntityId),
    List(Vec<Self>),
    Map(BTreeMap<String, Self>),
}

impl RefValue {
    #[must_use]
    pub fn id(id: impl Into<EntityId>) -> Self {
        Self::Id(id.into())
    }

    /// An id list, in iteration order.
    #[must_use]
    pub fn ids<T, I>(ids: I) -> Self
    where
        T: Into<EntityId>,
        I: IntoIterator<Item = T>,
    {
        Self::List(ids.into_iter().map(|id| Self::Id(id.into())).collect())
    }

    #[must_use]
    pub fn map<K, I>(slots: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Self)>,
    {
        Self::Map(slots.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Append an id to an id list, keeping existing order and skipping
    /// ids already present. Applied to a non-list value this is a no-op.
    #[must_use]
    pub fn with_id(self, id: impl Into<EntityId>) -> Self {
        let id = Self::Id(id.into());
        match self {
            Self::List(mut ids) => {
                if !ids.contains(&id) {
                    ids.push(id);
                }
                Self::List(ids)
            }
            other => {
                debug!(kind = other.kind(), "with_id applied to a non-list value");
                other
            }
        }
    }

    /// Remove every occurrence of an id from an id list. Applied to a
    /// non-list value this is a no-op.
    #[must_use]
    pub fn without_id(self, id: &EntityId) -> Self {
        match self {
            Self::List(mut ids) => {
                ids.retain(|item| !matches!(item, Self::Id(existing) if existing == id));
                Self::List(ids)
            }
            other => {
                debug!(kind = other.kind(), "without_id applied to a non-list value");
                other
            }
        }
    }

    /// Whether an id list contains the given id.
    #[must_use]
    pub fn contains_id(&self, id: &EntityId) -> bool {
        match self {
            Self::Id(existing) => existing == id,
            Self::List(ids) => ids
                .iter()
                .any(|item| matches!(item, Self::Id(existing) if existing == id)),
            _ => false,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Id(_) => "id",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }
}

impl From<EntityId> for RefValue {
    fn from(id: EntityId) -> Self {
        Self::Id(id)
    }
}
