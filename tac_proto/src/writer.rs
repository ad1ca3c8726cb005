//! Encoder half of the wire format.
//!
//! The server side of tests, the round-trip property and the bench harness
//! all build buffers through [`UpdateWriter`]. It shares the tag table with
//! the decoder, so the two cannot drift apart within one build.

use tac_schema::{FieldUpdate, Unit, UnitId};

use crate::fields::FieldTag;

/// Builds one update message: timestamp header plus a sequence of
/// `(unit id, tag, value)` records.
#[derive(Debug)]
pub struct UpdateWriter {
    buf: Vec<u8>,
}

impl UpdateWriter {
    pub fn new(timestamp: u64) -> Self {
        let mut buf = Vec::with_capacity(64);
        buf.extend_from_slice(&timestamp.to_le_bytes());
        Self { buf }
    }

    /// Append one field record for the given unit.
    pub fn field(&mut self, id: UnitId, update: &FieldUpdate) -> &mut Self {
        self.buf.extend_from_slice(&id.0.to_le_bytes());
        self.buf.push(FieldTag::of(update).as_wire());
        self.value(update);
        self
    }

    /// Append every replicated field of a unit, category first so the
    /// receiver can construct it from scratch.
    pub fn full_unit(&mut self, unit: &Unit) -> &mut Self {
        let id = unit.id;
        self.field(id, &FieldUpdate::Category(unit.category));
        self.field(id, &FieldUpdate::Alive(unit.base.alive));
        self.field(id, &FieldUpdate::Name(unit.base.name.clone()));
        self.field(id, &FieldUpdate::Coalition(unit.mission.coalition));
        self.field(id, &FieldUpdate::Latitude(unit.flight.latitude));
        self.field(id, &FieldUpdate::Longitude(unit.flight.longitude));
        self.field(id, &FieldUpdate::Altitude(unit.flight.altitude));
        self.field(id, &FieldUpdate::Heading(unit.flight.heading));
        self.field(id, &FieldUpdate::Speed(unit.flight.speed));
        if !unit.category.is_weapon() {
            self.field(id, &FieldUpdate::Human(unit.mission.human));
            self.field(id, &FieldUpdate::AiControlled(unit.base.ai_controlled));
            self.field(id, &FieldUpdate::UnitName(unit.base.unit_name.clone()));
            self.field(id, &FieldUpdate::GroupName(unit.base.group_name.clone()));
            self.field(id, &FieldUpdate::Ammo(unit.mission.ammo.clone()));
            self.field(id, &FieldUpdate::Contacts(unit.mission.contacts.clone()));
            self.field(id, &FieldUpdate::HasTask(unit.mission.has_task));
            self.field(id, &FieldUpdate::State(unit.task.state));
            self.field(id, &FieldUpdate::Task(unit.task.task.clone()));
            self.field(id, &FieldUpdate::ActivePath(unit.task.active_path.clone()));
            self.field(id, &FieldUpdate::DesiredSpeed(unit.task.desired_speed));
            self.field(id, &FieldUpdate::Roe(unit.options.roe));
        }
        if unit.category.is_airborne() {
            self.field(id, &FieldUpdate::Fuel(unit.mission.fuel));
            self.field(id, &FieldUpdate::LeaderId(unit.formation.leader_id));
            self.field(
                id,
                &FieldUpdate::DesiredAltitude(unit.task.desired_altitude),
            );
            self.field(id, &FieldUpdate::Radio(unit.task.radio.clone()));
            self.field(
                id,
                &FieldUpdate::ReactionToThreat(unit.options.reaction_to_threat),
            );
        }
        if unit.category == tac_schema::UnitCategory::Aircraft {
            self.field(id, &FieldUpdate::ActiveTanker(unit.task.is_active_tanker));
            self.field(id, &FieldUpdate::ActiveAwacs(unit.task.is_active_awacs));
            self.field(id, &FieldUpdate::Tacan(unit.task.tacan.clone()));
        }
        self
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }

    fn value(&mut self, update: &FieldUpdate) {
        match update {
            FieldUpdate::Category(category) => self.put_string(category.wire_name()),
            FieldUpdate::Alive(value)
            | FieldUpdate::Human(value)
            | FieldUpdate::AiControlled(value)
            | FieldUpdate::HasTask(value)
            | FieldUpdate::ActiveTanker(value)
            | FieldUpdate::ActiveAwacs(value) => self.buf.push(u8::from(*value)),
            FieldUpdate::Name(text)
            | FieldUpdate::UnitName(text)
            | FieldUpdate::GroupName(text)
            | FieldUpdate::Task(text) => self.put_string(text),
            FieldUpdate::Coalition(coalition) => self.buf.push(coalition.as_wire()),
            FieldUpdate::Latitude(value)
            | FieldUpdate::Longitude(value)
            | FieldUpdate::Altitude(value)
            | FieldUpdate::Heading(value)
            | FieldUpdate::Speed(value)
            | FieldUpdate::DesiredSpeed(value)
            | FieldUpdate::DesiredAltitude(value) => {
                self.buf.extend_from_slice(&value.to_le_bytes())
            }
            FieldUpdate::Fuel(value) => self.buf.extend_from_slice(&value.to_le_bytes()),
            FieldUpdate::Ammo(ammo) => {
                self.buf.push(ammo.len() as u8);
                for slot in ammo {
                    self.buf.extend_from_slice(&slot.quantity.to_le_bytes());
                    self.put_string(&slot.name);
                }
            }
            FieldUpdate::Contacts(contacts) => {
                self.buf
                    .extend_from_slice(&(contacts.len() as u16).to_le_bytes());
                for contact in contacts {
                    self.buf.extend_from_slice(&contact.target.0.to_le_bytes());
                    self.buf.push(contact.method.as_wire());
                }
            }
            FieldUpdate::LeaderId(leader) => {
                let raw = leader.map_or(0, |id| id.0);
                self.buf.extend_from_slice(&raw.to_le_bytes());
            }
            FieldUpdate::State(state) => self.buf.push(state.as_wire()),
            FieldUpdate::ActivePath(path) => {
                self.buf
                    .extend_from_slice(&(path.len() as u16).to_le_bytes());
                for waypoint in path {
                    self.buf.extend_from_slice(&waypoint.latitude.to_le_bytes());
                    self.buf
                        .extend_from_slice(&waypoint.longitude.to_le_bytes());
                    self.buf.extend_from_slice(&waypoint.altitude.to_le_bytes());
                }
            }
            FieldUpdate::Tacan(tacan) => {
                self.buf.push(u8::from(tacan.enabled));
                self.buf.push(tacan.channel);
                self.buf.push(tacan.band as u8);
                self.put_string(&tacan.callsign);
            }
            FieldUpdate::Radio(radio) => {
                self.buf.extend_from_slice(&radio.frequency_hz.to_le_bytes());
                self.buf.push(radio.callsign);
                self.buf.push(radio.callsign_number);
            }
            FieldUpdate::Roe(roe) => self.buf.push(roe.as_wire()),
            FieldUpdate::ReactionToThreat(reaction) => self.buf.push(reaction.as_wire()),
        }
    }

    fn put_string(&mut self, text: &str) {
        self.buf
            .extend_from_slice(&(text.len() as u16).to_le_bytes());
        self.buf.extend_from_slice(text.as_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tac_schema::{
        AmmoSlot, Coalition, Contact, DetectionMethod, Radio, RulesOfEngagement, Tacan,
        UnitCategory, UnitState, Waypoint,
    };

    use crate::cursor::ByteCursor;
    use crate::fields::decode_field;

    fn round_trip(category: UnitCategory, update: FieldUpdate) {
        let mut writer = UpdateWriter::new(42);
        writer.field(UnitId(7), &update);
        let buf = writer.finish();

        let mut cursor = ByteCursor::new(&buf);
        assert_eq!(cursor.read_u64().unwrap(), 42);
        assert_eq!(cursor.read_u32().unwrap(), 7);
        let decoded = decode_field(&mut cursor, category).unwrap();
        assert_eq!(decoded, update);
        assert!(cursor.is_empty(), "cursor must land on the buffer end");
    }

    #[test]
    fn every_record_lands_the_cursor_on_the_next_boundary() {
        round_trip(
            UnitCategory::Missile,
            FieldUpdate::Category(UnitCategory::Missile),
        );
        round_trip(UnitCategory::Aircraft, FieldUpdate::Alive(false));
        round_trip(
            UnitCategory::GroundUnit,
            FieldUpdate::UnitName("Gun Truck 1-1".to_owned()),
        );
        round_trip(UnitCategory::NavyUnit, FieldUpdate::Coalition(Coalition::Red));
        round_trip(UnitCategory::Bomb, FieldUpdate::Latitude(41.6));
        round_trip(UnitCategory::Aircraft, FieldUpdate::Fuel(73));
        round_trip(
            UnitCategory::Aircraft,
            FieldUpdate::Ammo(vec![
                AmmoSlot {
                    name: "AIM-120C".to_owned(),
                    quantity: 4,
                },
                AmmoSlot {
                    name: "AIM-9X".to_owned(),
                    quantity: 2,
                },
            ]),
        );
        round_trip(
            UnitCategory::Helicopter,
            FieldUpdate::Contacts(vec![Contact {
                target: UnitId(99),
                method: DetectionMethod::Irst,
            }]),
        );
        round_trip(
            UnitCategory::Helicopter,
            FieldUpdate::LeaderId(Some(UnitId(12))),
        );
        round_trip(UnitCategory::GroundUnit, FieldUpdate::State(UnitState::Firing));
        round_trip(
            UnitCategory::Aircraft,
            FieldUpdate::ActivePath(vec![
                Waypoint {
                    latitude: 36.1,
                    longitude: -115.1,
                    altitude: 7620.0,
                },
                Waypoint {
                    latitude: 36.3,
                    longitude: -115.4,
                    altitude: 7620.0,
                },
            ]),
        );
        round_trip(
            UnitCategory::Aircraft,
            FieldUpdate::Tacan(Tacan {
                enabled: true,
                channel: 74,
                band: 'Y',
                callsign: "TKR".to_owned(),
            }),
        );
        round_trip(
            UnitCategory::Aircraft,
            FieldUpdate::Radio(Radio {
                frequency_hz: 251_000_000,
                callsign: 2,
                callsign_number: 1,
            }),
        );
        round_trip(UnitCategory::NavyUnit, FieldUpdate::Roe(RulesOfEngagement::Hold));
    }

    #[test]
    fn empty_collections_encode_as_zero_counts() {
        round_trip(UnitCategory::Aircraft, FieldUpdate::Ammo(Vec::new()));
        round_trip(UnitCategory::Aircraft, FieldUpdate::Contacts(Vec::new()));
        round_trip(UnitCategory::Aircraft, FieldUpdate::ActivePath(Vec::new()));
    }

    #[test]
    fn full_unit_snapshot_is_decodable_from_scratch() {
        let mut unit = Unit::new(UnitId(31), UnitCategory::Aircraft);
        unit.apply(FieldUpdate::Name("F-16C".to_owned()));
        unit.apply(FieldUpdate::GroupName("Viper".to_owned()));
        unit.apply(FieldUpdate::Coalition(Coalition::Blue));
        unit.apply(FieldUpdate::Fuel(88));

        let mut writer = UpdateWriter::new(1_000);
        writer.full_unit(&unit);
        let buf = writer.finish();

        let mut cursor = ByteCursor::new(&buf);
        assert_eq!(cursor.read_u64().unwrap(), 1_000);
        let mut rebuilt: Option<Unit> = None;
        while !cursor.is_empty() {
            let id = UnitId(cursor.read_u32().unwrap());
            match rebuilt.as_mut() {
                None => {
                    let update = decode_field(&mut cursor, UnitCategory::Aircraft).unwrap();
                    match update {
                        FieldUpdate::Category(category) => {
                            rebuilt = Some(Unit::new(id, category));
                        }
                        other => panic!("expected category first, got {other:?}"),
                    }
                }
                Some(unit) => {
                    let update = decode_field(&mut cursor, unit.category).unwrap();
                    unit.apply(update);
                }
            }
        }

        let rebuilt = rebuilt.expect("unit decoded");
        assert_eq!(rebuilt.base, unit.base);
        assert_eq!(rebuilt.flight, unit.flight);
        assert_eq!(rebuilt.mission, unit.mission);
        assert_eq!(rebuilt.task, unit.task);
        assert_eq!(rebuilt.options, unit.options);
    }
}
