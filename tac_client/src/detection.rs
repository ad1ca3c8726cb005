//! Detection derivation.
//!
//! Inverts the self-reported contact lists of the commanded side into a
//! per-target "who detects me, and how" set. This is the most expensive
//! per-tick computation, O(units × contacts), so the engine only calls it
//! when a dirty flag says the inputs changed.

use std::collections::HashMap;

use ahash::RandomState;

use tac_schema::{Coalition, DetectionMethod, Unit, UnitId};

/// Recompute every unit's derived detection set from the contact reports of
/// live, commanded-side observers. Returns how many units' sets changed.
pub(crate) fn derive(
    units: &mut HashMap<UnitId, Unit, RandomState>,
    commanded: Coalition,
) -> usize {
    tracing::debug!(
        target: "tacmap::detection",
        unit_count = units.len(),
        commanded = commanded.name(),
        "detection derivation start"
    );

    let mut seen: HashMap<UnitId, Vec<DetectionMethod>, RandomState> = HashMap::default();
    for unit in units.values() {
        if !unit.is_alive() || unit.mission.coalition != commanded {
            continue;
        }
        for contact in &unit.mission.contacts {
            seen.entry(contact.target).or_default().push(contact.method);
        }
    }

    let mut changed = 0;
    for unit in units.values_mut() {
        let mut methods = seen.remove(&unit.id).unwrap_or_default();
        methods.sort_unstable();
        methods.dedup();
        if unit.detected_by() != methods.as_slice() {
            unit.set_detected_by(methods);
            changed += 1;
        }
    }

    tracing::debug!(
        target: "tacmap::detection",
        changed,
        "detection derivation end"
    );
    changed
}
