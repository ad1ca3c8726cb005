//! Partially-updatable sub-records of a unit.
//!
//! The wire format is a diff: an update only carries the fields that changed,
//! and everything else keeps its previous value. Defaults here are therefore
//! the state of a brand-new unit before its first full update lands.

use serde::{Deserialize, Serialize};

use crate::enums::{Coalition, ReactionToThreat, RulesOfEngagement, UnitState};

/// Identity and naming.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseData {
    pub name: String,
    pub unit_name: String,
    pub group_name: String,
    pub ai_controlled: bool,
    pub alive: bool,
}

impl Default for BaseData {
    fn default() -> Self {
        Self {
            name: String::new(),
            unit_name: String::new(),
            group_name: String::new(),
            ai_controlled: false,
            // A unit announced by the server is live unless told otherwise.
            alive: true,
        }
    }
}

/// Spatial and kinematic state. SI units, heading in radians.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlightData {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub heading: f64,
    pub speed: f64,
}

/// One weapon station entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmmoSlot {
    pub name: String,
    pub quantity: u16,
}

/// A directed detection edge as self-reported by the observing unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub target: crate::unit::UnitId,
    pub method: crate::enums::DetectionMethod,
}

/// Mission state: consumables, crew, sensors, side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MissionData {
    /// Remaining fuel, percent of internal capacity.
    pub fuel: u16,
    pub human: bool,
    pub ammo: Vec<AmmoSlot>,
    pub contacts: Vec<Contact>,
    pub has_task: bool,
    pub coalition: Coalition,
}

/// Formation state. A wire leader id of zero means no leader.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormationData {
    pub leader_id: Option<crate::unit::UnitId>,
}

/// One point of an active navigation path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

/// TACAN beacon configuration for tanker duties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tacan {
    pub enabled: bool,
    pub channel: u8,
    /// `'X'` or `'Y'`.
    pub band: char,
    pub callsign: String,
}

impl Default for Tacan {
    fn default() -> Self {
        Self {
            enabled: false,
            channel: 0,
            band: 'X',
            callsign: String::new(),
        }
    }
}

/// Radio configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Radio {
    pub frequency_hz: u32,
    pub callsign: u8,
    pub callsign_number: u8,
}

/// Automation/task state as last reported by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskData {
    pub state: UnitState,
    pub task: String,
    pub active_path: Vec<Waypoint>,
    pub desired_speed: f64,
    pub desired_altitude: f64,
    pub is_active_tanker: bool,
    pub is_active_awacs: bool,
    pub tacan: Tacan,
    pub radio: Radio,
}

/// Behavior options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionsData {
    pub roe: RulesOfEngagement,
    pub reaction_to_threat: ReactionToThreat,
}
