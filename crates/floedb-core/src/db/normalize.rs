use crate::{
    patch::TablePatch,
    value::{EntityId, Record, RefValue, Value},
};
use floedb_schema::{entity::ReferenceDef, schema::Schema, shape::Shape, types::Cardinality};
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

///
/// NormalizeError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum NormalizeError {
    #[error("shape refers to undefined entity '{0}'")]
    UnknownEntity(String),

    #[error("entity '{entity}' is missing its id attribute '{attribute}'")]
    MissingId { entity: String, attribute: String },

    #[error("entity '{entity}' has a non-id value in attribute '{attribute}'")]
    IdKind { entity: String, attribute: String },

    #[error("shape mismatch: expected {expected}, found {found}")]
    ShapeMismatch {
        expected: &'static str,
        found: &'static str,
    },
}

///
/// Normalized
/// The outcome of lifting a nested value: the reference skeleton that
/// mirrors the shape, and the entity records extracted along the way.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Normalized {
    pub result: RefValue,
    pub entities: TablePatch,
}

// Lift a nested value into id references plus flat entity records.
//
// Normalization is all or nothing. Any record that cannot yield an id
// fails the whole call, so a partial patch never escapes.
pub fn normalize(
    value: &Value,
    shape: &Shape,
    schema: &Schema,
) -> Result<Normalized, NormalizeError> {
    let mut entities = TablePatch::new();
    let result = lift(schema, shape, value, &mut entities)?;

    Ok(Normalized { result, entities })
}

fn lift(
    schema: &Schema,
    shape: &Shape,
    value: &Value,
    entities: &mut TablePatch,
) -> Result<RefValue, NormalizeError> {
    match (shape, value) {
        (_, Value::Null) => Ok(RefValue::None),
        (Shape::Entity(name), Value::Map(attrs)) => {
            lift_entity(schema, name, attrs, entities).map(RefValue::Id)
        }
        (Shape::List(inner), Value::List(items)) => {
            let lifted = items
                .iter()
                .map(|item| lift(schema, inner, item, entities))
                .collect::<Result<Vec<_>, _>>()?;

            Ok(RefValue::List(lifted))
        }
        (Shape::Map(slots), Value::Map(entries)) => {
            // Shape slots absent from the value are simply omitted.
            let mut out = BTreeMap::new();
            for (key, slot_shape) in slots {
                let Some(entry) = entries.get(key) else {
                    continue;
                };
                out.insert(key.clone(), lift(schema, slot_shape, entry, entities)?);
            }

            Ok(RefValue::Map(out))
        }
        (shape, value) => Err(NormalizeError::ShapeMismatch {
            expected: shape_kind(shape),
            found: value.kind(),
        }),
    }
}

fn lift_entity(
    schema: &Schema,
    name: &str,
    attrs: &BTreeMap<String, Value>,
    entities: &mut TablePatch,
) -> Result<EntityId, NormalizeError> {
    let Some(def) = schema.get(name) else {
        return Err(NormalizeError::UnknownEntity(name.to_string()));
    };

    let Some(raw_id) = attrs.get(&def.id_attribute) else {
        return Err(NormalizeError::MissingId {
            entity: name.to_string(),
            attribute: def.id_attribute.clone(),
        });
    };
    let Some(id) = EntityId::from_value(raw_id) else {
        return Err(NormalizeError::IdKind {
            entity: name.to_string(),
            attribute: def.id_attribute.clone(),
        });
    };

    let mut record = Record::new();
    for (attribute, value) in attrs {
        let lifted = match def.get_reference(attribute) {
            Some(reference) => lift_reference(schema, reference, value, entities)?,
            None => value.clone(),
        };
        record.insert(attribute.clone(), lifted);
    }

    entities.insert_record(name, id.clone(), record);

    Ok(id)
}

// Rewrite one reference attribute to ids, extracting nested records.
// Values that already look like ids pass through untouched.
fn lift_reference(
    schema: &Schema,
    reference: &ReferenceDef,
    raw: &Value,
    entities: &mut TablePatch,
) -> Result<Value, NormalizeError> {
    match (reference.cardinality, raw) {
        (Cardinality::One, Value::Map(attrs)) => {
            lift_entity(schema, &reference.target, attrs, entities).map(|id| id.to_value())
        }
        (Cardinality::Many, Value::List(items)) => {
            let lifted = items
                .iter()
                .map(|item| match item {
                    Value::Map(attrs) => lift_entity(schema, &reference.target, attrs, entities)
                        .map(|id| id.to_value()),
                    other => Ok(other.clone()),
                })
                .collect::<Result<Vec<_>, _>>()?;

            Ok(Value::List(lifted))
        }
        (_, other) => Ok(other.clone()),
    }
}

const fn shape_kind(shape: &Shape) -> &'static str {
    match shape {
        Shape::Entity(_) => "entity",
        Shape::List(_) => "list",
        Shape::Map(_) => "map",
    }
}

///
/// TESTS
///
