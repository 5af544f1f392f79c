use crate::{MAX_ATTRIBUTE_NAME_LEN, MAX_ENTITY_NAME_LEN, prelude::*};
use std::collections::BTreeSet;

// Validate one definition's local naming rules.
pub fn validate_def_naming(def: &EntityDef, errs: &mut ErrorTree) {
    if def.name.is_empty() {
        err!(errs, "entity name cannot be empty");
    }
    if def.name.len() > MAX_ENTITY_NAME_LEN {
        err!(
            errs,
            "entity name '{0}' exceeds {MAX_ENTITY_NAME_LEN} characters",
            def.name
        );
    }

    if def.id_attribute.is_empty() {
        err!(errs, "entity '{0}' has an empty id attribute", def.name);
    }
    if def.id_attribute.len() > MAX_ATTRIBUTE_NAME_LEN {
        err!(
            errs,
            "entity '{0}' id attribute '{1}' exceeds {MAX_ATTRIBUTE_NAME_LEN} characters",
            def.name,
            def.id_attribute
        );
    }

    let mut seen = BTreeSet::new();
    for reference in &def.references {
        if reference.field.is_empty() {
            err!(errs, "entity '{0}' has a reference with an empty field", def.name);
        }
        if reference.field.len() > MAX_ATTRIBUTE_NAME_LEN {
            err!(
                errs,
                "entity '{0}' reference field '{1}' exceeds {MAX_ATTRIBUTE_NAME_LEN} characters",
                def.name,
                reference.field
            );
        }
        if reference.target.is_empty() {
            err!(
                errs,
                "entity '{0}' reference field '{1}' has an empty target",
                def.name,
                reference.field
            );
        }

        if !seen.insert(reference.field.as_str()) {
            err!(
                errs,
                "duplicate reference field '{0}' on entity '{1}'",
                reference.field,
                def.name
            );
        }
    }
}

// Validate that entity names are unique across the registry.
pub fn validate_unique_names(defs: &[EntityDef], errs: &mut ErrorTree) {
    let mut seen = BTreeSet::new();
    for def in defs {
        if !seen.insert(def.name.as_str()) {
            err!(errs, "duplicate entity name '{0}'", def.name);
        }
    }
}
