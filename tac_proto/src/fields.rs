//! Field tag codec table.
//!
//! Single source of truth for the wire layout: one tag byte per field, a
//! fixed value encoding per tag, and the set of unit categories each tag is
//! valid for. Adding a field means adding it here and in the server's
//! encoder in the same deployment; there is no version negotiation.

use tac_schema::{
    AmmoSlot, CategoryMask, Coalition, Contact, DetectionMethod, FieldUpdate, Radio,
    ReactionToThreat, RulesOfEngagement, Tacan, UnitCategory, UnitId, UnitState, Waypoint,
};

use crate::cursor::ByteCursor;
use crate::ProtocolError;

/// One-byte code identifying which attribute of a unit the following value
/// updates. Discriminants are the wire values.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldTag {
    Category = 1,
    Alive = 2,
    Human = 3,
    AiControlled = 4,
    Name = 5,
    UnitName = 6,
    GroupName = 7,
    Coalition = 8,
    Latitude = 9,
    Longitude = 10,
    Altitude = 11,
    Heading = 12,
    Speed = 13,
    Fuel = 14,
    Ammo = 15,
    Contacts = 16,
    HasTask = 17,
    IsActiveTanker = 18,
    IsActiveAwacs = 19,
    LeaderId = 20,
    State = 21,
    Task = 22,
    ActivePath = 23,
    DesiredSpeed = 24,
    DesiredAltitude = 25,
    Tacan = 26,
    Radio = 27,
    Roe = 28,
    ReactionToThreat = 29,
}

impl TryFrom<u8> for FieldTag {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        let tag = match value {
            1 => Self::Category,
            2 => Self::Alive,
            3 => Self::Human,
            4 => Self::AiControlled,
            5 => Self::Name,
            6 => Self::UnitName,
            7 => Self::GroupName,
            8 => Self::Coalition,
            9 => Self::Latitude,
            10 => Self::Longitude,
            11 => Self::Altitude,
            12 => Self::Heading,
            13 => Self::Speed,
            14 => Self::Fuel,
            15 => Self::Ammo,
            16 => Self::Contacts,
            17 => Self::HasTask,
            18 => Self::IsActiveTanker,
            19 => Self::IsActiveAwacs,
            20 => Self::LeaderId,
            21 => Self::State,
            22 => Self::Task,
            23 => Self::ActivePath,
            24 => Self::DesiredSpeed,
            25 => Self::DesiredAltitude,
            26 => Self::Tacan,
            27 => Self::Radio,
            28 => Self::Roe,
            29 => Self::ReactionToThreat,
            other => return Err(ProtocolError::UnknownTag(other)),
        };
        Ok(tag)
    }
}

impl FieldTag {
    pub fn as_wire(self) -> u8 {
        self as u8
    }

    /// Read and validate one tag byte.
    pub fn read(cursor: &mut ByteCursor<'_>) -> Result<Self, ProtocolError> {
        Self::try_from(cursor.read_u8()?)
    }

    /// Categories this tag may legally appear on.
    pub fn valid_categories(self) -> CategoryMask {
        match self {
            Self::Category
            | Self::Alive
            | Self::Name
            | Self::Coalition
            | Self::Latitude
            | Self::Longitude
            | Self::Altitude
            | Self::Heading
            | Self::Speed => CategoryMask::ANY,
            Self::Human
            | Self::AiControlled
            | Self::UnitName
            | Self::GroupName
            | Self::Ammo
            | Self::Contacts
            | Self::HasTask
            | Self::State
            | Self::Task
            | Self::ActivePath
            | Self::DesiredSpeed
            | Self::Roe => CategoryMask::CONTROLLABLE,
            Self::Fuel
            | Self::LeaderId
            | Self::DesiredAltitude
            | Self::Radio
            | Self::ReactionToThreat => CategoryMask::AIRBORNE,
            Self::IsActiveTanker | Self::IsActiveAwacs | Self::Tacan => {
                CategoryMask::FIXED_WING
            }
        }
    }

    pub fn valid_for(self, category: UnitCategory) -> bool {
        self.valid_categories().allows(category)
    }

    /// Decode this tag's value. The cursor must sit just past the tag byte;
    /// on success it lands exactly on the next record.
    pub fn decode(self, cursor: &mut ByteCursor<'_>) -> Result<FieldUpdate, ProtocolError> {
        let update = match self {
            Self::Category => {
                let name = cursor.read_string()?;
                let category = UnitCategory::from_wire_name(&name)
                    .ok_or(ProtocolError::UnknownCategory(name))?;
                FieldUpdate::Category(category)
            }
            Self::Alive => FieldUpdate::Alive(cursor.read_bool()?),
            Self::Human => FieldUpdate::Human(cursor.read_bool()?),
            Self::AiControlled => FieldUpdate::AiControlled(cursor.read_bool()?),
            Self::Name => FieldUpdate::Name(cursor.read_string()?),
            Self::UnitName => FieldUpdate::UnitName(cursor.read_string()?),
            Self::GroupName => FieldUpdate::GroupName(cursor.read_string()?),
            Self::Coalition => {
                let value = cursor.read_u8()?;
                let coalition = Coalition::from_wire(value).ok_or(ProtocolError::InvalidEnum {
                    field: "coalition",
                    value,
                })?;
                FieldUpdate::Coalition(coalition)
            }
            Self::Latitude => FieldUpdate::Latitude(cursor.read_f64()?),
            Self::Longitude => FieldUpdate::Longitude(cursor.read_f64()?),
            Self::Altitude => FieldUpdate::Altitude(cursor.read_f64()?),
            Self::Heading => FieldUpdate::Heading(cursor.read_f64()?),
            Self::Speed => FieldUpdate::Speed(cursor.read_f64()?),
            Self::Fuel => FieldUpdate::Fuel(cursor.read_u16()?),
            Self::Ammo => {
                let count = cursor.read_u8()? as usize;
                let mut ammo = Vec::with_capacity(count);
                for _ in 0..count {
                    let quantity = cursor.read_u16()?;
                    let name = cursor.read_string()?;
                    ammo.push(AmmoSlot { name, quantity });
                }
                FieldUpdate::Ammo(ammo)
            }
            Self::Contacts => {
                let count = cursor.read_u16()? as usize;
                let mut contacts = Vec::with_capacity(count);
                for _ in 0..count {
                    let target = UnitId(cursor.read_u32()?);
                    let value = cursor.read_u8()?;
                    let method =
                        DetectionMethod::from_wire(value).ok_or(ProtocolError::InvalidEnum {
                            field: "detection method",
                            value,
                        })?;
                    contacts.push(Contact { target, method });
                }
                FieldUpdate::Contacts(contacts)
            }
            Self::HasTask => FieldUpdate::HasTask(cursor.read_bool()?),
            Self::IsActiveTanker => FieldUpdate::ActiveTanker(cursor.read_bool()?),
            Self::IsActiveAwacs => FieldUpdate::ActiveAwacs(cursor.read_bool()?),
            Self::LeaderId => {
                let raw = cursor.read_u32()?;
                FieldUpdate::LeaderId((raw != 0).then_some(UnitId(raw)))
            }
            Self::State => {
                let value = cursor.read_u8()?;
                let state = UnitState::from_wire(value).ok_or(ProtocolError::InvalidEnum {
                    field: "unit state",
                    value,
                })?;
                FieldUpdate::State(state)
            }
            Self::Task => FieldUpdate::Task(cursor.read_string()?),
            Self::ActivePath => {
                let count = cursor.read_u16()? as usize;
                let mut path = Vec::with_capacity(count);
                for _ in 0..count {
                    path.push(Waypoint {
                        latitude: cursor.read_f64()?,
                        longitude: cursor.read_f64()?,
                        altitude: cursor.read_f64()?,
                    });
                }
                FieldUpdate::ActivePath(path)
            }
            Self::DesiredSpeed => FieldUpdate::DesiredSpeed(cursor.read_f64()?),
            Self::DesiredAltitude => FieldUpdate::DesiredAltitude(cursor.read_f64()?),
            Self::Tacan => {
                let enabled = cursor.read_bool()?;
                let channel = cursor.read_u8()?;
                let band = cursor.read_u8()?;
                if band != b'X' && band != b'Y' {
                    return Err(ProtocolError::InvalidEnum {
                        field: "tacan band",
                        value: band,
                    });
                }
                let callsign = cursor.read_string()?;
                FieldUpdate::Tacan(Tacan {
                    enabled,
                    channel,
                    band: band as char,
                    callsign,
                })
            }
            Self::Radio => FieldUpdate::Radio(Radio {
                frequency_hz: cursor.read_u32()?,
                callsign: cursor.read_u8()?,
                callsign_number: cursor.read_u8()?,
            }),
            Self::Roe => {
                let value = cursor.read_u8()?;
                let roe =
                    RulesOfEngagement::from_wire(value).ok_or(ProtocolError::InvalidEnum {
                        field: "rules of engagement",
                        value,
                    })?;
                FieldUpdate::Roe(roe)
            }
            Self::ReactionToThreat => {
                let value = cursor.read_u8()?;
                let reaction =
                    ReactionToThreat::from_wire(value).ok_or(ProtocolError::InvalidEnum {
                        field: "reaction to threat",
                        value,
                    })?;
                FieldUpdate::ReactionToThreat(reaction)
            }
        };
        Ok(update)
    }

    /// Tag for an already-decoded update. Keeps the encoder on the same
    /// table as the decoder.
    pub fn of(update: &FieldUpdate) -> Self {
        match update {
            FieldUpdate::Category(_) => Self::Category,
            FieldUpdate::Alive(_) => Self::Alive,
            FieldUpdate::Human(_) => Self::Human,
            FieldUpdate::AiControlled(_) => Self::AiControlled,
            FieldUpdate::Name(_) => Self::Name,
            FieldUpdate::UnitName(_) => Self::UnitName,
            FieldUpdate::GroupName(_) => Self::GroupName,
            FieldUpdate::Coalition(_) => Self::Coalition,
            FieldUpdate::Latitude(_) => Self::Latitude,
            FieldUpdate::Longitude(_) => Self::Longitude,
            FieldUpdate::Altitude(_) => Self::Altitude,
            FieldUpdate::Heading(_) => Self::Heading,
            FieldUpdate::Speed(_) => Self::Speed,
            FieldUpdate::Fuel(_) => Self::Fuel,
            FieldUpdate::Ammo(_) => Self::Ammo,
            FieldUpdate::Contacts(_) => Self::Contacts,
            FieldUpdate::HasTask(_) => Self::HasTask,
            FieldUpdate::ActiveTanker(_) => Self::IsActiveTanker,
            FieldUpdate::ActiveAwacs(_) => Self::IsActiveAwacs,
            FieldUpdate::LeaderId(_) => Self::LeaderId,
            FieldUpdate::State(_) => Self::State,
            FieldUpdate::Task(_) => Self::Task,
            FieldUpdate::ActivePath(_) => Self::ActivePath,
            FieldUpdate::DesiredSpeed(_) => Self::DesiredSpeed,
            FieldUpdate::DesiredAltitude(_) => Self::DesiredAltitude,
            FieldUpdate::Tacan(_) => Self::Tacan,
            FieldUpdate::Radio(_) => Self::Radio,
            FieldUpdate::Roe(_) => Self::Roe,
            FieldUpdate::ReactionToThreat(_) => Self::ReactionToThreat,
        }
    }
}

/// Decode one field for a unit of a known category: read the tag, check it
/// is legal for the category, decode the value.
///
/// A category mismatch means the client's table disagrees with the stream;
/// the conservative response is to stop trusting the rest of the buffer, so
/// the error is surfaced before any value bytes are consumed.
pub fn decode_field(
    cursor: &mut ByteCursor<'_>,
    category: UnitCategory,
) -> Result<FieldUpdate, ProtocolError> {
    let tag = FieldTag::read(cursor)?;
    if !tag.valid_for(category) {
        return Err(ProtocolError::TagCategoryMismatch { tag, category });
    }
    tag.decode(cursor)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_TAGS: [FieldTag; 29] = [
        FieldTag::Category,
        FieldTag::Alive,
        FieldTag::Human,
        FieldTag::AiControlled,
        FieldTag::Name,
        FieldTag::UnitName,
        FieldTag::GroupName,
        FieldTag::Coalition,
        FieldTag::Latitude,
        FieldTag::Longitude,
        FieldTag::Altitude,
        FieldTag::Heading,
        FieldTag::Speed,
        FieldTag::Fuel,
        FieldTag::Ammo,
        FieldTag::Contacts,
        FieldTag::HasTask,
        FieldTag::IsActiveTanker,
        FieldTag::IsActiveAwacs,
        FieldTag::LeaderId,
        FieldTag::State,
        FieldTag::Task,
        FieldTag::ActivePath,
        FieldTag::DesiredSpeed,
        FieldTag::DesiredAltitude,
        FieldTag::Tacan,
        FieldTag::Radio,
        FieldTag::Roe,
        FieldTag::ReactionToThreat,
    ];

    #[test]
    fn tag_bytes_round_trip() {
        for tag in ALL_TAGS {
            assert_eq!(FieldTag::try_from(tag.as_wire()).unwrap(), tag);
        }
    }

    #[test]
    fn tag_zero_and_high_bytes_are_unknown() {
        assert_eq!(
            FieldTag::try_from(0).unwrap_err(),
            ProtocolError::UnknownTag(0)
        );
        assert_eq!(
            FieldTag::try_from(30).unwrap_err(),
            ProtocolError::UnknownTag(30)
        );
        assert_eq!(
            FieldTag::try_from(0xff).unwrap_err(),
            ProtocolError::UnknownTag(0xff)
        );
    }

    #[test]
    fn kinematics_apply_to_weapons_but_fuel_does_not() {
        assert!(FieldTag::Latitude.valid_for(UnitCategory::Missile));
        assert!(FieldTag::Heading.valid_for(UnitCategory::Bomb));
        assert!(!FieldTag::Fuel.valid_for(UnitCategory::Missile));
        assert!(!FieldTag::Contacts.valid_for(UnitCategory::Bomb));
    }

    #[test]
    fn tanker_fields_are_fixed_wing_only() {
        assert!(FieldTag::IsActiveTanker.valid_for(UnitCategory::Aircraft));
        assert!(!FieldTag::IsActiveTanker.valid_for(UnitCategory::Helicopter));
        assert!(!FieldTag::Tacan.valid_for(UnitCategory::GroundUnit));
    }

    #[test]
    fn category_value_decodes_to_concrete_variant() {
        let mut data = vec![8, 0];
        data.extend_from_slice(b"Aircraft");
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(
            FieldTag::Category.decode(&mut cursor).unwrap(),
            FieldUpdate::Category(UnitCategory::Aircraft)
        );
    }

    #[test]
    fn unknown_category_consumes_the_string() {
        let mut data = vec![6, 0];
        data.extend_from_slice(b"Static");
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(
            FieldTag::Category.decode(&mut cursor).unwrap_err(),
            ProtocolError::UnknownCategory("Static".to_owned())
        );
        // The cursor sits on the next record, so the stream stays decodable.
        assert!(cursor.is_empty());
    }

    #[test]
    fn leader_id_zero_is_no_leader() {
        let data = 0u32.to_le_bytes();
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(
            FieldTag::LeaderId.decode(&mut cursor).unwrap(),
            FieldUpdate::LeaderId(None)
        );

        let data = 7u32.to_le_bytes();
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(
            FieldTag::LeaderId.decode(&mut cursor).unwrap(),
            FieldUpdate::LeaderId(Some(UnitId(7)))
        );
    }

    #[test]
    fn invalid_enum_byte_is_rejected() {
        let data = [9u8];
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(
            FieldTag::State.decode(&mut cursor).unwrap_err(),
            ProtocolError::InvalidEnum {
                field: "unit state",
                value: 9
            }
        );
    }

    #[test]
    fn mismatched_tag_aborts_before_consuming_value_bytes() {
        let mut data = vec![FieldTag::Fuel.as_wire()];
        data.extend_from_slice(&42u16.to_le_bytes());
        let mut cursor = ByteCursor::new(&data);
        let err = decode_field(&mut cursor, UnitCategory::GroundUnit).unwrap_err();
        assert_eq!(
            err,
            ProtocolError::TagCategoryMismatch {
                tag: FieldTag::Fuel,
                category: UnitCategory::GroundUnit
            }
        );
        assert_eq!(cursor.position(), 1);
    }
}
