//! Enumerations carried on the wire.
//!
//! Every enum here has a fixed one-byte wire value. `from_wire` returns
//! `None` for out-of-range bytes so the decoder can reject them instead of
//! guessing; the table of valid values must stay in lockstep with the
//! server's encoder.

use serde::{Deserialize, Serialize};

/// Side a unit belongs to.
#[repr(u8)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Coalition {
    #[default]
    Neutral = 0,
    Blue = 1,
    Red = 2,
}

impl Coalition {
    pub fn from_wire(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Neutral),
            1 => Some(Self::Blue),
            2 => Some(Self::Red),
            _ => None,
        }
    }

    pub fn as_wire(self) -> u8 {
        self as u8
    }

    /// Lower-case name used in configuration files.
    pub fn name(self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Blue => "blue",
            Self::Red => "red",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "neutral" => Some(Self::Neutral),
            "blue" => Some(Self::Blue),
            "red" => Some(Self::Red),
            _ => None,
        }
    }
}

/// Automation state reported by the server. The client renders whatever the
/// last update declared and never infers a transition locally.
#[repr(u8)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitState {
    #[default]
    Idle = 0,
    Moving = 1,
    Attacking = 2,
    Following = 3,
    Refueling = 4,
    Landing = 5,
    Bombing = 6,
    Firing = 7,
}

impl UnitState {
    pub fn from_wire(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Idle),
            1 => Some(Self::Moving),
            2 => Some(Self::Attacking),
            3 => Some(Self::Following),
            4 => Some(Self::Refueling),
            5 => Some(Self::Landing),
            6 => Some(Self::Bombing),
            7 => Some(Self::Firing),
            _ => None,
        }
    }

    pub fn as_wire(self) -> u8 {
        self as u8
    }
}

/// Rules of engagement option.
#[repr(u8)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RulesOfEngagement {
    Free = 0,
    #[default]
    Designated = 1,
    ReturnFire = 2,
    Hold = 3,
}

impl RulesOfEngagement {
    pub fn from_wire(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Free),
            1 => Some(Self::Designated),
            2 => Some(Self::ReturnFire),
            3 => Some(Self::Hold),
            _ => None,
        }
    }

    pub fn as_wire(self) -> u8 {
        self as u8
    }
}

/// Reaction-to-threat option for airborne units.
#[repr(u8)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReactionToThreat {
    #[default]
    None = 0,
    Maneuver = 1,
    Passive = 2,
    Evade = 3,
}

impl ReactionToThreat {
    pub fn from_wire(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::Maneuver),
            2 => Some(Self::Passive),
            3 => Some(Self::Evade),
            _ => None,
        }
    }

    pub fn as_wire(self) -> u8 {
        self as u8
    }
}

/// Sensing modality by which one unit perceives another.
#[repr(u8)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum DetectionMethod {
    Visual = 0,
    Optic = 1,
    Radar = 2,
    Irst = 3,
    Rwr = 4,
    DataLink = 5,
}

impl DetectionMethod {
    pub fn from_wire(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Visual),
            1 => Some(Self::Optic),
            2 => Some(Self::Radar),
            3 => Some(Self::Irst),
            4 => Some(Self::Rwr),
            5 => Some(Self::DataLink),
            _ => None,
        }
    }

    pub fn as_wire(self) -> u8 {
        self as u8
    }
}
