//! The unit state machine.
//!
//! A [`Unit`] is the addressable record for one simulated object. Updates
//! arrive as a stream of [`FieldUpdate`] values decoded from the wire;
//! [`Unit::apply`] merges exactly one field and reports the side effects the
//! reconciliation engine has to care about. Merges are idempotent per field,
//! which is what makes mid-buffer abandonment safe.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::category::UnitCategory;
use crate::data::{
    AmmoSlot, BaseData, Contact, FlightData, FormationData, MissionData, OptionsData, Radio,
    Tacan, TaskData, Waypoint,
};
use crate::enums::{
    Coalition, DetectionMethod, ReactionToThreat, RulesOfEngagement, UnitState,
};

/// Server-assigned identifier, stable for the unit's lifetime.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One decoded wire field, carrying its final typed value.
///
/// One variant per field tag; the codec table in `tac_proto` is the single
/// place that maps tag bytes to these variants.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate {
    Category(UnitCategory),
    Alive(bool),
    Human(bool),
    AiControlled(bool),
    Name(String),
    UnitName(String),
    GroupName(String),
    Coalition(Coalition),
    Latitude(f64),
    Longitude(f64),
    Altitude(f64),
    Heading(f64),
    Speed(f64),
    Fuel(u16),
    Ammo(Vec<AmmoSlot>),
    Contacts(Vec<Contact>),
    HasTask(bool),
    ActiveTanker(bool),
    ActiveAwacs(bool),
    LeaderId(Option<UnitId>),
    State(UnitState),
    Task(String),
    ActivePath(Vec<Waypoint>),
    DesiredSpeed(f64),
    DesiredAltitude(f64),
    Tacan(Tacan),
    Radio(Radio),
    Roe(RulesOfEngagement),
    ReactionToThreat(ReactionToThreat),
}

/// Side effects of applying one field, surfaced to the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Applied {
    /// The unit transitioned from alive to dead on this field.
    pub died: bool,
    /// The unit's self-reported contact list changed.
    pub contacts_changed: bool,
}

/// State of one simulated unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub category: UnitCategory,
    pub base: BaseData,
    pub flight: FlightData,
    pub mission: MissionData,
    pub formation: FormationData,
    pub task: TaskData,
    pub options: OptionsData,
    /// Client-side selection state. Never replicated.
    selected: bool,
    /// User-assigned keyboard hotgroup. Never replicated.
    hot_group: Option<u8>,
    /// Group the unit was assigned to on first sight. Permanent for the
    /// session once set.
    assigned_group: Option<String>,
    /// Methods by which the commanded side currently detects this unit.
    /// Derived, not transmitted.
    detected_by: Vec<DetectionMethod>,
}

impl Unit {
    /// A brand-new unit as first seen on the wire. Every sub-record starts at
    /// its default; the first full update fills it in.
    pub fn new(id: UnitId, category: UnitCategory) -> Self {
        Self {
            id,
            category,
            base: BaseData::default(),
            flight: FlightData::default(),
            mission: MissionData::default(),
            formation: FormationData::default(),
            task: TaskData::default(),
            options: OptionsData::default(),
            selected: false,
            hot_group: None,
            assigned_group: None,
            detected_by: Vec::new(),
        }
    }

    /// Merge exactly one decoded field into this unit.
    ///
    /// A `Category` update for an existing unit is a no-op re-announcement;
    /// the category is fixed at creation.
    pub fn apply(&mut self, update: FieldUpdate) -> Applied {
        let mut applied = Applied::default();
        match update {
            FieldUpdate::Category(_) => {}
            FieldUpdate::Alive(alive) => {
                if self.base.alive && !alive {
                    applied.died = true;
                }
                self.set_alive(alive);
            }
            FieldUpdate::Human(human) => self.mission.human = human,
            FieldUpdate::AiControlled(controlled) => self.base.ai_controlled = controlled,
            FieldUpdate::Name(name) => self.base.name = name,
            FieldUpdate::UnitName(name) => self.base.unit_name = name,
            FieldUpdate::GroupName(name) => self.base.group_name = name,
            FieldUpdate::Coalition(coalition) => self.mission.coalition = coalition,
            FieldUpdate::Latitude(value) => self.flight.latitude = value,
            FieldUpdate::Longitude(value) => self.flight.longitude = value,
            FieldUpdate::Altitude(value) => self.flight.altitude = value,
            FieldUpdate::Heading(value) => self.flight.heading = value,
            FieldUpdate::Speed(value) => self.flight.speed = value,
            FieldUpdate::Fuel(value) => self.mission.fuel = value,
            FieldUpdate::Ammo(ammo) => self.mission.ammo = ammo,
            FieldUpdate::Contacts(contacts) => {
                if self.mission.contacts != contacts {
                    applied.contacts_changed = true;
                }
                self.mission.contacts = contacts;
            }
            FieldUpdate::HasTask(value) => self.mission.has_task = value,
            FieldUpdate::ActiveTanker(value) => self.task.is_active_tanker = value,
            FieldUpdate::ActiveAwacs(value) => self.task.is_active_awacs = value,
            FieldUpdate::LeaderId(leader) => self.formation.leader_id = leader,
            FieldUpdate::State(state) => self.task.state = state,
            FieldUpdate::Task(task) => self.task.task = task,
            FieldUpdate::ActivePath(path) => self.task.active_path = path,
            FieldUpdate::DesiredSpeed(value) => self.task.desired_speed = value,
            FieldUpdate::DesiredAltitude(value) => self.task.desired_altitude = value,
            FieldUpdate::Tacan(tacan) => self.task.tacan = tacan,
            FieldUpdate::Radio(radio) => self.task.radio = radio,
            FieldUpdate::Roe(roe) => self.options.roe = roe,
            FieldUpdate::ReactionToThreat(reaction) => {
                self.options.reaction_to_threat = reaction
            }
        }
        applied
    }

    /// Force the alive flag. Death clears selection and any rendered path.
    pub fn set_alive(&mut self, alive: bool) {
        self.base.alive = alive;
        if !alive {
            self.selected = false;
            self.task.active_path.clear();
        }
    }

    pub fn is_alive(&self) -> bool {
        self.base.alive
    }

    /// Weapons and dead units can never be selected.
    pub fn is_selectable(&self) -> bool {
        !self.category.is_weapon() && self.base.alive
    }

    /// Attempt to change selection. Returns the resulting selection state;
    /// selection attempts on non-selectable units are refused.
    pub fn set_selected(&mut self, selected: bool) -> bool {
        if selected && !self.is_selectable() {
            return self.selected;
        }
        self.selected = selected;
        self.selected
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn hot_group(&self) -> Option<u8> {
        self.hot_group
    }

    pub fn set_hot_group(&mut self, slot: Option<u8>) {
        self.hot_group = slot;
    }

    /// Group this unit was permanently assigned to, if any.
    pub fn assigned_group(&self) -> Option<&str> {
        self.assigned_group.as_deref()
    }

    /// Record the permanent group assignment. Only the engine calls this,
    /// and only once per unit.
    pub fn assign_group(&mut self, name: &str) {
        if self.assigned_group.is_none() {
            self.assigned_group = Some(name.to_owned());
        }
    }

    /// A wingman is any unit currently following a leader.
    pub fn is_wingman(&self) -> bool {
        self.formation.leader_id.is_some()
    }

    pub fn detected_by(&self) -> &[DetectionMethod] {
        &self.detected_by
    }

    /// Replace the derived detection set. The engine keeps it sorted and
    /// deduplicated.
    pub fn set_detected_by(&mut self, methods: Vec<DetectionMethod>) {
        self.detected_by = methods;
    }
}
