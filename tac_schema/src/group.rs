//! Named unit groups.
//!
//! A group is created lazily the first time a named, non-empty group name is
//! observed on a unit. Membership mirrors the simulation's semantics: a unit
//! joins at most one group and never leaves it, even if its reported group
//! name later changes.

use serde::{Deserialize, Serialize};

use crate::unit::UnitId;

/// A named collection of units sharing a group name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    name: String,
    members: Vec<UnitId>,
}

impl Group {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            members: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[UnitId] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Add a member. Joining twice is a no-op.
    pub fn join(&mut self, id: UnitId) {
        if !self.members.contains(&id) {
            self.members.push(id);
        }
    }

    /// Drop a member that was explicitly removed from the unit table.
    pub fn leave(&mut self, id: UnitId) {
        self.members.retain(|member| *member != id);
    }
}
