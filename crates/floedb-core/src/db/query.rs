use crate::{
    db::table::EntityTable,
    value::{EntityId, RefValue, Value},
};
use floedb_schema::{entity::ReferenceDef, schema::Schema, shape::Shape, types::Cardinality};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error as ThisError;

///
/// QueryError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum QueryError {
    #[error("no stored query named '{0}'")]
    NoSuchQuery(String),
}

///
/// Query
/// An ad hoc query: a shape plus the normalized value to materialize
/// against it.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub shape: Shape,
    pub value: RefValue,
}

impl Query {
    #[must_use]
    pub const fn new(shape: Shape, value: RefValue) -> Self {
        Self { shape, value }
    }
}

///
/// StoredQueryDef
/// A named query registered at open: its shape, and the default value
/// its slot holds before the first update.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct StoredQueryDef {
    pub name: String,
    pub shape: Shape,
    pub default: RefValue,
}

impl StoredQueryDef {
    #[must_use]
    pub fn new(name: impl Into<String>, shape: Shape) -> Self {
        Self {
            name: name.into(),
            shape,
            default: RefValue::None,
        }
    }

    /// Override the value the query slot holds before the first update.
    #[must_use]
    pub fn default_value(mut self, value: RefValue) -> Self {
        self.default = value;
        self
    }
}

// Materialize a normalized value against the entity tables.
//
// Missing data surfaces as absence, never as an error: a missing
// top-level entity or map slot is absent, a missing list element is a
// Null hole, and a single-reference field whose target is missing keeps
// the raw id. A reference back-edge also keeps the raw id, which keeps
// cyclic graphs finite.
pub(crate) fn denormalize(
    schema: &Schema,
    shape: &Shape,
    value: &RefValue,
    entities: &EntityTable,
) -> Option<Value> {
    let mut visiting = BTreeSet::new();

    resolve(schema, shape, value, entities, &mut visiting)
}

fn resolve(
    schema: &Schema,
    shape: &Shape,
    value: &RefValue,
    entities: &EntityTable,
    visiting: &mut BTreeSet<(String, EntityId)>,
) -> Option<Value> {
    match (shape, value) {
        (_, RefValue::None) => None,
        (Shape::Entity(name), RefValue::Id(id)) => {
            resolve_entity(schema, name, id, entities, visiting)
        }
        (Shape::List(inner), RefValue::List(items)) => {
            let resolved = items
                .iter()
                .map(|item| {
                    resolve(schema, inner, item, entities, visiting).unwrap_or(Value::Null)
                })
                .collect();

            Some(Value::List(resolved))
        }
        (Shape::Map(slots), RefValue::Map(entries)) => {
            let mut out = BTreeMap::new();
            for (key, slot_shape) in slots {
                let Some(entry) = entries.get(key) else {
                    continue;
                };
                if let Some(resolved) = resolve(schema, slot_shape, entry, entities, visiting) {
                    out.insert(key.clone(), resolved);
                }
            }

            Some(Value::Map(out))
        }
        // Shape/value mismatches resolve to absence, never an error.
        _ => None,
    }
}

fn resolve_entity(
    schema: &Schema,
    name: &str,
    id: &EntityId,
    entities: &EntityTable,
    visiting: &mut BTreeSet<(String, EntityId)>,
) -> Option<Value> {
    let record = entities.entity(name, id)?;
    let def = schema.get(name)?;

    let key = (name.to_string(), id.clone());
    if !visiting.insert(key.clone()) {
        // Back-edge: keep the raw id instead of recursing forever.
        return Some(id.to_value());
    }

    let mut attributes: BTreeMap<String, Value> = record
        .iter()
        .map(|(attribute, value)| (attribute.clone(), value.clone()))
        .collect();

    for reference in &def.references {
        let Some(raw) = record.get(&reference.field) else {
            continue;
        };
        if let Some(resolved) = resolve_reference(schema, reference, raw, entities, visiting) {
            attributes.insert(reference.field.clone(), resolved);
        }
    }

    visiting.remove(&key);

    Some(Value::Map(attributes))
}

// Resolve one reference attribute. None means "keep the raw value".
fn resolve_reference(
    schema: &Schema,
    reference: &ReferenceDef,
    raw: &Value,
    entities: &EntityTable,
    visiting: &mut BTreeSet<(String, EntityId)>,
) -> Option<Value> {
    match (reference.cardinality, raw) {
        (Cardinality::One, value) => {
            let id = EntityId::from_value(value)?;
            resolve_entity(schema, &reference.target, &id, entities, visiting)
        }
        (Cardinality::Many, Value::List(items)) => {
            let resolved = items
                .iter()
                .map(|item| {
                    EntityId::from_value(item)
                        .and_then(|id| {
                            resolve_entity(schema, &reference.target, &id, entities, visiting)
                        })
                        .unwrap_or(Value::Null)
                })
                .collect();

            Some(Value::List(resolved))
        }
        (Cardinality::Many, _) => None,
    }
}

///
/// TESTS
///
