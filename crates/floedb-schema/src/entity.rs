use crate::types::Cardinality;
use serde::{Deserialize, Serialize};

///
/// ReferenceDef
/// A named attribute of one entity type whose value refers to entities
/// of another type, by id.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ReferenceDef {
    pub field: String,
    pub target: String,
    pub cardinality: Cardinality,
}

///
/// EntityDef
/// One entity type: its name, the attribute that carries identity, and
/// the attributes that reference other entity types.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct EntityDef {
    pub name: String,
    pub id_attribute: String,
    pub references: Vec<ReferenceDef>,
}

impl EntityDef {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id_attribute: "id".to_string(),
            references: Vec::new(),
        }
    }

    /// Override the attribute that carries the entity id.
    #[must_use]
    pub fn id_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.id_attribute = attribute.into();
        self
    }

    /// Declare a single-valued reference attribute.
    #[must_use]
    pub fn reference(mut self, field: impl Into<String>, target: impl Into<String>) -> Self {
        self.references.push(ReferenceDef {
            field: field.into(),
            target: target.into(),
            cardinality: Cardinality::One,
        });
        self
    }

    /// Declare a list-valued reference attribute.
    #[must_use]
    pub fn reference_list(mut self, field: impl Into<String>, target: impl Into<String>) -> Self {
        self.references.push(ReferenceDef {
            field: field.into(),
            target: target.into(),
            cardinality: Cardinality::Many,
        });
        self
    }

    #[must_use]
    pub fn get_reference(&self, field: &str) -> Option<&ReferenceDef> {
        self.references.iter().find(|r| r.field == field)
    }
}
