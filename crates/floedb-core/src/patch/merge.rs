use crate::value::{Record, Value};

///
/// MergeCustomizer
/// Attribute-level override consulted before the default merge rule,
/// including for nested map members. Returning None falls through to
/// the default.
///

pub trait MergeCustomizer {
    fn resolve(&self, existing: &Value, incoming: &Value) -> Option<Value>;
}

impl<F> MergeCustomizer for F
where
    F: Fn(&Value, &Value) -> Option<Value>,
{
    fn resolve(&self, existing: &Value, incoming: &Value) -> Option<Value> {
        self(existing, incoming)
    }
}

/// Merge one incoming attribute value over an existing one.
///
/// Maps merge recursively, key by key. Lists, sets, and scalars replace
/// wholly. An explicit incoming Null clears the existing value.
#[must_use]
pub fn merge_value(
    existing: &Value,
    incoming: &Value,
    customizer: Option<&dyn MergeCustomizer>,
) -> Value {
    if let Some(custom) = customizer
        && let Some(resolved) = custom.resolve(existing, incoming)
    {
        return resolved;
    }

    match (existing, incoming) {
        (Value::Map(old), Value::Map(new)) => {
            let mut merged = old.clone();
            for (key, value) in new {
                let next = match merged.get(key) {
                    Some(prev) => merge_value(prev, value, customizer),
                    None => value.clone(),
                };
                merged.insert(key.clone(), next);
            }

            Value::Map(merged)
        }
        (_, replacement) => replacement.clone(),
    }
}

/// Merge an incoming partial record over an existing one, attribute by
/// attribute. Attributes absent from the incoming record are untouched.
#[must_use]
pub fn merge_record(
    existing: &Record,
    incoming: &Record,
    customizer: Option<&dyn MergeCustomizer>,
) -> Record {
    let mut merged = existing.clone();
    for (attribute, value) in incoming.iter() {
        let next = match merged.get(attribute) {
            Some(prev) => merge_value(prev, value, customizer),
            None => value.clone(),
        };
        merged.insert(attribute.clone(), next);
    }

    merged
}

///
/// TESTS
///
