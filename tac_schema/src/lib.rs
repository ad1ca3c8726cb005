//! Data contracts for the tactical map client.
//!
//! Defines the closed set of unit categories, the coalition/state/option
//! enumerations carried on the wire, the partially-updatable sub-records that
//! make up a unit, and the [`Unit`] state machine itself. The wire layer in
//! `tac_proto` and the reconciliation engine in `tac_client` both build on
//! these types.

mod category;
mod data;
mod enums;
mod group;
mod unit;

pub use category::{CategoryMask, UnitCategory};
pub use data::{
    AmmoSlot, BaseData, Contact, FlightData, FormationData, MissionData, OptionsData, Radio,
    Tacan, TaskData, Waypoint,
};
pub use enums::{Coalition, DetectionMethod, ReactionToThreat, RulesOfEngagement, UnitState};
pub use group::Group;
pub use unit::{Applied, FieldUpdate, Unit, UnitId};
