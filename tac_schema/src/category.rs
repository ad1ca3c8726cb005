//! The closed set of unit categories.
//!
//! Category determines which wire fields apply to a unit and how the client
//! treats it (selectability, marker class). Dispatch is a `match` over the
//! closed enum rather than an inheritance hierarchy.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Concrete kind of a simulated unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitCategory {
    Aircraft,
    Helicopter,
    GroundUnit,
    NavyUnit,
    Missile,
    Bomb,
}

impl UnitCategory {
    /// Category string as transmitted on the wire.
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Aircraft => "Aircraft",
            Self::Helicopter => "Helicopter",
            Self::GroundUnit => "GroundUnit",
            Self::NavyUnit => "NavyUnit",
            Self::Missile => "Missile",
            Self::Bomb => "Bomb",
        }
    }

    /// Parse a wire category string. Anything unrecognized is the caller's
    /// problem to report; no fallback category exists.
    pub fn from_wire_name(name: &str) -> Option<Self> {
        match name {
            "Aircraft" => Some(Self::Aircraft),
            "Helicopter" => Some(Self::Helicopter),
            "GroundUnit" => Some(Self::GroundUnit),
            "NavyUnit" => Some(Self::NavyUnit),
            "Missile" => Some(Self::Missile),
            "Bomb" => Some(Self::Bomb),
            _ => None,
        }
    }

    /// Weapons are tracked but never selectable or commandable.
    pub fn is_weapon(self) -> bool {
        matches!(self, Self::Missile | Self::Bomb)
    }

    pub fn is_airborne(self) -> bool {
        matches!(self, Self::Aircraft | Self::Helicopter)
    }

    /// Marker class used by the rendering layer to pick an icon set.
    pub fn marker_class(self) -> &'static str {
        match self {
            Self::Aircraft => "aircraft",
            Self::Helicopter => "helicopter",
            Self::GroundUnit => "groundunit",
            Self::NavyUnit => "navyunit",
            Self::Missile | Self::Bomb => "weapon",
        }
    }

    pub fn mask(self) -> CategoryMask {
        match self {
            Self::Aircraft => CategoryMask::AIRCRAFT,
            Self::Helicopter => CategoryMask::HELICOPTER,
            Self::GroundUnit => CategoryMask::GROUND,
            Self::NavyUnit => CategoryMask::NAVY,
            Self::Missile => CategoryMask::MISSILE,
            Self::Bomb => CategoryMask::BOMB,
        }
    }
}

bitflags! {
    /// Set of categories a wire field applies to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CategoryMask: u8 {
        const AIRCRAFT = 1 << 0;
        const HELICOPTER = 1 << 1;
        const GROUND = 1 << 2;
        const NAVY = 1 << 3;
        const MISSILE = 1 << 4;
        const BOMB = 1 << 5;
    }
}

impl CategoryMask {
    /// Every category.
    pub const ANY: Self = Self::all();
    /// Everything the player can command: all non-weapon categories.
    pub const CONTROLLABLE: Self = Self::AIRCRAFT
        .union(Self::HELICOPTER)
        .union(Self::GROUND)
        .union(Self::NAVY);
    /// Airborne units.
    pub const AIRBORNE: Self = Self::AIRCRAFT.union(Self::HELICOPTER);
    /// Fixed-wing only.
    pub const FIXED_WING: Self = Self::AIRCRAFT;

    pub fn allows(self, category: UnitCategory) -> bool {
        self.contains(category.mask())
    }
}
