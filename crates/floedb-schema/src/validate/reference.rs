use crate::prelude::*;
use std::collections::BTreeSet;

// Validate that every reference target names a defined entity type.
pub fn validate_reference_targets(defs: &[EntityDef], errs: &mut ErrorTree) {
    let names: BTreeSet<&str> = defs.iter().map(|d| d.name.as_str()).collect();

    for def in defs {
        for reference in &def.references {
            if reference.target.is_empty() {
                continue;
            }
            if !names.contains(reference.target.as_str()) {
                err!(
                    errs,
                    "entity '{0}', field '{1}', refers to undefined entity '{2}'",
                    def.name,
                    reference.field,
                    reference.target
                );
            }
        }
    }
}
