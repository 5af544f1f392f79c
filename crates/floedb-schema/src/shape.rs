use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

///
/// Shape
/// The reference shape of a query result: a single entity, a uniform
/// list of shapes, or a named composite of shapes.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Entity(String),
    List(Box<Shape>),
    Map(BTreeMap<String, Shape>),
}

impl Shape {
    #[must_use]
    pub fn entity(name: impl Into<String>) -> Self {
        Self::Entity(name.into())
    }

    #[must_use]
    pub fn list_of(inner: Self) -> Self {
        Self::List(Box::new(inner))
    }

    #[must_use]
    pub fn map<K, I>(slots: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Self)>,
    {
        Self::Map(slots.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Every entity type name mentioned anywhere in the shape.
    #[must_use]
    pub fn entity_names(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        self.collect_entity_names(&mut names);

        names
    }

    fn collect_entity_names<'a>(&'a self, names: &mut BTreeSet<&'a str>) {
        match self {
            Self::Entity(name) => {
                names.insert(name.as_str());
            }
            Self::List(inner) => inner.collect_entity_names(names),
            Self::Map(slots) => {
                for shape in slots.values() {
                    shape.collect_entity_names(names);
                }
            }
        }
    }
}
