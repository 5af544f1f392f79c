//! Definition validation orchestration.

pub mod naming;
pub mod reference;

use crate::{entity::EntityDef, error::ErrorTree};

/// Run full definition validation in a staged, deterministic order.
pub(crate) fn validate_defs(defs: &[EntityDef]) -> Result<(), ErrorTree> {
    // Phase 1: validate each definition (structural + local invariants).
    let mut errors = ErrorTree::new();
    for def in defs {
        naming::validate_def_naming(def, &mut errors);
    }

    // Phase 2: enforce registry-wide invariants.
    naming::validate_unique_names(defs, &mut errors);
    reference::validate_reference_targets(defs, &mut errors);

    errors.result()
}
