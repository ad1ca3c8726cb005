//! Per-unit visibility.
//!
//! Whether the local client renders a unit at all. Deliberately separate
//! from detection: visibility is a cheap per-unit predicate over UI-driven
//! hide flags and the alive flag, recomputed whenever queried.

use std::collections::HashSet;

use tac_schema::{Coalition, Unit, UnitCategory};

use crate::config::ClientConfig;

/// Read-only source of coalition/category hide flags. The map UI owns the
/// actual toggles; this core only consumes them.
pub trait VisibilityFlags {
    fn coalition_hidden(&self, coalition: Coalition) -> bool;
    fn category_hidden(&self, category: UnitCategory) -> bool;
}

/// A unit is hidden if its coalition is hidden, its category is hidden, or
/// it is dead.
pub fn is_visible<F: VisibilityFlags>(unit: &Unit, flags: &F) -> bool {
    unit.is_alive()
        && !flags.coalition_hidden(unit.mission.coalition)
        && !flags.category_hidden(unit.category)
}

/// Concrete flag source backed by plain sets, seeded from the client
/// configuration and toggled at runtime by the UI.
#[derive(Debug, Clone, Default)]
pub struct HiddenSets {
    coalitions: HashSet<Coalition>,
    categories: HashSet<UnitCategory>,
}

impl HiddenSets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        let mut sets = Self::default();
        for name in &config.hidden_coalitions {
            match Coalition::from_name(name) {
                Some(coalition) => {
                    sets.coalitions.insert(coalition);
                }
                None => log::warn!("unknown coalition {:?} in hidden_coalitions", name),
            }
        }
        for name in &config.hidden_categories {
            match UnitCategory::from_wire_name(name) {
                Some(category) => {
                    sets.categories.insert(category);
                }
                None => log::warn!("unknown category {:?} in hidden_categories", name),
            }
        }
        sets
    }

    pub fn set_coalition_hidden(&mut self, coalition: Coalition, hidden: bool) {
        if hidden {
            self.coalitions.insert(coalition);
        } else {
            self.coalitions.remove(&coalition);
        }
    }

    pub fn set_category_hidden(&mut self, category: UnitCategory, hidden: bool) {
        if hidden {
            self.categories.insert(category);
        } else {
            self.categories.remove(&category);
        }
    }
}

impl VisibilityFlags for HiddenSets {
    fn coalition_hidden(&self, coalition: Coalition) -> bool {
        self.coalitions.contains(&coalition)
    }

    fn category_hidden(&self, category: UnitCategory) -> bool {
        self.categories.contains(&category)
    }
}
