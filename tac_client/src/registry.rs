//! The reconciliation engine.
//!
//! [`UnitRegistry`] owns the full unit table. Once per network tick it is
//! handed an opaque buffer, decodes `(unit id, field tag, value)` records
//! until the buffer runs out, creates units on first sight, merges every
//! decoded field into the matching unit, then runs the post-update passes
//! (group assignment, dirty-flag-gated detection derivation).
//!
//! Failure semantics: malformed or truncated buffers never propagate out of
//! [`UnitRegistry::apply_update`]. The loop aborts, fields merged so far are
//! kept (per-field merges are idempotent, so there is nothing to roll back)
//! and the next tick resynchronizes.

use std::collections::{HashMap, HashSet};

use ahash::RandomState;
use thiserror::Error;

use tac_proto::{decode_field, ByteCursor, FieldTag, ProtocolError};
use tac_schema::{Coalition, FieldUpdate, Group, Unit, UnitId};

use crate::config::ClientConfig;
use crate::detection;
use crate::metrics::ClientMetrics;
use crate::visibility::{is_visible, VisibilityFlags};

/// Why a tick's decode loop stopped before the end of the buffer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbortReason {
    /// The buffer ended mid-record. The remainder arrives next tick.
    #[error("update truncated: {0}")]
    Truncated(ProtocolError),
    /// The stream and the client disagree about the wire layout. Trusting
    /// the rest of the buffer would corrupt unrelated units.
    #[error("malformed update: {0}")]
    Malformed(ProtocolError),
    /// A brand-new unit id arrived without a category field; the rest of
    /// the buffer is deferred until a full update for it lands.
    #[error("unit {0} appeared without a category field")]
    NewUnitWithoutCategory(UnitId),
}

/// Outcome of one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Complete,
    Aborted(AbortReason),
}

/// Explicit state-change notification for downstream consumers. Returned
/// from [`UnitRegistry::apply_update`] instead of being broadcast through an
/// ambient event bus, so callers see changes in a defined order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateEvent {
    UnitCreated { id: UnitId },
    UnitDied { id: UnitId },
    SelectionCleared { id: UnitId },
    GroupCreated { name: String },
    UnitGrouped { id: UnitId, group: String },
    DetectionChanged { units: usize },
}

/// Result of applying one update buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    /// Timestamp read from the buffer header, if it was present at all.
    pub timestamp: Option<u64>,
    pub outcome: TickOutcome,
    pub events: Vec<StateEvent>,
}

/// Owns the live unit and group tables. Single-threaded: one buffer is
/// fully processed before the next is accepted, and only this type mutates
/// unit state.
#[derive(Debug, Clone)]
pub struct UnitRegistry {
    units: HashMap<UnitId, Unit, RandomState>,
    groups: HashMap<String, Group, RandomState>,
    commanded: Coalition,
    detection_dirty: bool,
    recompute_detection: bool,
    metrics: ClientMetrics,
}

impl UnitRegistry {
    pub fn new(commanded: Coalition) -> Self {
        Self {
            units: HashMap::default(),
            groups: HashMap::default(),
            commanded,
            detection_dirty: false,
            recompute_detection: true,
            metrics: ClientMetrics::default(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        let mut registry = Self::new(config.commanded());
        registry.recompute_detection = config.recompute_detection;
        registry
    }

    /// Decode one tick's update buffer and merge it into the table.
    pub fn apply_update(&mut self, buffer: &[u8]) -> TickReport {
        let mut events = Vec::new();
        let mut cursor = ByteCursor::new(buffer);

        // Units whose category string was unrecognized this tick. Their
        // records are decoded and discarded so the cursor stays aligned.
        let mut ignored: HashSet<UnitId, RandomState> = HashSet::default();

        let timestamp = match cursor.read_u64() {
            Ok(timestamp) => timestamp,
            Err(err) => {
                self.metrics.ticks_aborted += 1;
                tracing::warn!(
                    target: "tacmap::reconcile",
                    error = %err,
                    "update shorter than its timestamp header"
                );
                return TickReport {
                    timestamp: None,
                    outcome: TickOutcome::Aborted(AbortReason::Truncated(err)),
                    events,
                };
            }
        };
        self.metrics.last_timestamp = Some(timestamp);

        let mut outcome = TickOutcome::Complete;
        while !cursor.is_empty() {
            let id = match cursor.read_u32() {
                Ok(raw) => UnitId(raw),
                Err(err) => {
                    outcome = TickOutcome::Aborted(AbortReason::Truncated(err));
                    break;
                }
            };

            let step = if let Some(unit) = self.units.get_mut(&id) {
                let was_selected = unit.is_selected();
                match decode_field(&mut cursor, unit.category) {
                    Ok(update) => {
                        let applied = unit.apply(update);
                        self.metrics.fields_applied += 1;
                        if applied.contacts_changed {
                            self.detection_dirty = true;
                        }
                        if applied.died {
                            self.detection_dirty = true;
                            events.push(StateEvent::UnitDied { id });
                            if was_selected {
                                events.push(StateEvent::SelectionCleared { id });
                            }
                        }
                        Ok(())
                    }
                    Err(err) => Err(err),
                }
            } else if ignored.contains(&id) {
                Self::discard_record(&mut cursor)
            } else {
                match self.introduce_unit(&mut cursor, id, &mut ignored) {
                    Ok(created) => {
                        if created {
                            events.push(StateEvent::UnitCreated { id });
                        }
                        Ok(())
                    }
                    Err(IntroduceError::NoCategory) => {
                        outcome =
                            TickOutcome::Aborted(AbortReason::NewUnitWithoutCategory(id));
                        break;
                    }
                    Err(IntroduceError::Protocol(err)) => Err(err),
                }
            };

            if let Err(err) = step {
                outcome = TickOutcome::Aborted(Self::classify(err));
                break;
            }
        }

        match &outcome {
            TickOutcome::Complete => self.metrics.ticks_applied += 1,
            TickOutcome::Aborted(reason) => {
                self.metrics.ticks_aborted += 1;
                tracing::warn!(
                    target: "tacmap::reconcile",
                    timestamp,
                    position = cursor.position(),
                    reason = %reason,
                    "dropping remainder of update buffer"
                );
            }
        }

        self.assign_groups(&mut events);

        if self.detection_dirty && self.recompute_detection {
            let changed = detection::derive(&mut self.units, self.commanded);
            self.detection_dirty = false;
            self.metrics.detection_recomputes += 1;
            if changed > 0 {
                events.push(StateEvent::DetectionChanged { units: changed });
            }
        }

        TickReport {
            timestamp: Some(timestamp),
            outcome,
            events,
        }
    }

    /// Handle a record for an id not present in the table. Only a category
    /// field may introduce a unit; an unrecognized category string parks the
    /// id in the tick's ignore set instead of costing the whole buffer.
    fn introduce_unit(
        &mut self,
        cursor: &mut ByteCursor<'_>,
        id: UnitId,
        ignored: &mut HashSet<UnitId, RandomState>,
    ) -> Result<bool, IntroduceError> {
        let tag = FieldTag::read(cursor).map_err(IntroduceError::Protocol)?;
        if tag != FieldTag::Category {
            return Err(IntroduceError::NoCategory);
        }
        match tag.decode(cursor) {
            Ok(FieldUpdate::Category(category)) => {
                self.units.insert(id, Unit::new(id, category));
                self.metrics.units_created += 1;
                self.detection_dirty = true;
                tracing::debug!(
                    target: "tacmap::reconcile",
                    unit = %id,
                    category = category.wire_name(),
                    "unit created"
                );
                Ok(true)
            }
            Ok(_) => unreachable!("category tag decodes to a category update"),
            Err(ProtocolError::UnknownCategory(name)) => {
                tracing::warn!(
                    target: "tacmap::reconcile",
                    unit = %id,
                    category = %name,
                    "dropping unit with unrecognized category for this tick"
                );
                ignored.insert(id);
                Ok(false)
            }
            Err(err) => Err(IntroduceError::Protocol(err)),
        }
    }

    /// Decode and throw away one record for an ignored unit. Tag widths are
    /// category-independent, so this keeps the cursor on record boundaries.
    fn discard_record(cursor: &mut ByteCursor<'_>) -> Result<(), ProtocolError> {
        let tag = FieldTag::read(cursor)?;
        match tag.decode(cursor) {
            Ok(_) => Ok(()),
            // A repeated unknown-category announcement for an already
            // ignored unit changes nothing.
            Err(ProtocolError::UnknownCategory(_)) => Ok(()),
            Err(err) => Err(err),
        }
    }

    fn classify(err: ProtocolError) -> AbortReason {
        match err {
            ProtocolError::BufferUnderrun { .. } => AbortReason::Truncated(err),
            _ => AbortReason::Malformed(err),
        }
    }

    /// Assign every as-yet-ungrouped unit with a non-empty group name to its
    /// group, creating groups on demand. Membership is permanent: a unit
    /// that already joined a group stays there whatever it reports later.
    fn assign_groups(&mut self, events: &mut Vec<StateEvent>) {
        for unit in self.units.values_mut() {
            if unit.assigned_group().is_some() || unit.base.group_name.is_empty() {
                continue;
            }
            let name = unit.base.group_name.clone();
            let group = self.groups.entry(name.clone()).or_insert_with(|| {
                self.metrics.groups_created += 1;
                events.push(StateEvent::GroupCreated { name: name.clone() });
                Group::new(&name)
            });
            group.join(unit.id);
            unit.assign_group(&name);
            events.push(StateEvent::UnitGrouped {
                id: unit.id,
                group: name,
            });
        }
    }

    /// Explicitly remove a unit from the table. This is the only way a unit
    /// leaves it; the decoder never garbage-collects.
    pub fn remove_unit(&mut self, id: UnitId) -> bool {
        match self.units.remove(&id) {
            Some(unit) => {
                if let Some(group) = unit
                    .assigned_group()
                    .and_then(|name| self.groups.get_mut(name))
                {
                    group.leave(id);
                }
                self.metrics.units_removed += 1;
                self.detection_dirty = true;
                true
            }
            None => false,
        }
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.get(name)
    }

    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }

    pub fn commanded(&self) -> Coalition {
        self.commanded
    }

    /// Change the locally-commanded side. Detection edges are derived from
    /// that side's contact reports, so this dirties them.
    pub fn set_commanded(&mut self, coalition: Coalition) {
        if self.commanded != coalition {
            self.commanded = coalition;
            self.detection_dirty = true;
        }
    }

    /// Attempt to select a unit. Refused for weapons and dead units.
    pub fn select(&mut self, id: UnitId) -> bool {
        self.units
            .get_mut(&id)
            .map(|unit| unit.set_selected(true))
            .unwrap_or(false)
    }

    pub fn deselect(&mut self, id: UnitId) {
        if let Some(unit) = self.units.get_mut(&id) {
            unit.set_selected(false);
        }
    }

    pub fn selected_units(&self) -> Vec<UnitId> {
        let mut ids: Vec<UnitId> = self
            .units
            .values()
            .filter(|unit| unit.is_selected())
            .map(|unit| unit.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn set_hot_group(&mut self, id: UnitId, slot: Option<u8>) {
        if let Some(unit) = self.units.get_mut(&id) {
            unit.set_hot_group(slot);
        }
    }

    pub fn hot_group_members(&self, slot: u8) -> Vec<UnitId> {
        let mut ids: Vec<UnitId> = self
            .units
            .values()
            .filter(|unit| unit.hot_group() == Some(slot))
            .map(|unit| unit.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Units the local client should render under the given flags.
    pub fn visible_units<'a, F: VisibilityFlags>(
        &'a self,
        flags: &'a F,
    ) -> impl Iterator<Item = &'a Unit> {
        self.units.values().filter(move |unit| is_visible(unit, flags))
    }

    /// Clear the selection of every unit the flags now hide. Selection must
    /// not survive a unit becoming hidden.
    pub fn enforce_visibility<F: VisibilityFlags>(&mut self, flags: &F) -> Vec<StateEvent> {
        let mut events = Vec::new();
        for unit in self.units.values_mut() {
            if unit.is_selected() && !is_visible(unit, flags) {
                unit.set_selected(false);
                events.push(StateEvent::SelectionCleared { id: unit.id });
            }
        }
        events
    }

    pub fn metrics(&self) -> &ClientMetrics {
        &self.metrics
    }
}

enum IntroduceError {
    NoCategory,
    Protocol(ProtocolError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tac_proto::UpdateWriter;
    use tac_schema::{Contact, DetectionMethod, UnitCategory};

    fn spawn(writer: &mut UpdateWriter, id: u32, category: UnitCategory) {
        writer.field(UnitId(id), &FieldUpdate::Category(category));
    }

    #[test]
    fn creates_unit_when_category_arrives_first() {
        let mut registry = UnitRegistry::new(Coalition::Blue);
        let mut writer = UpdateWriter::new(100);
        spawn(&mut writer, 1, UnitCategory::Aircraft);
        writer.field(UnitId(1), &FieldUpdate::Alive(true));
        writer.field(UnitId(1), &FieldUpdate::Latitude(37.2));
        writer.field(UnitId(1), &FieldUpdate::Longitude(-115.8));

        let report = registry.apply_update(&writer.finish());

        assert_eq!(report.timestamp, Some(100));
        assert_eq!(report.outcome, TickOutcome::Complete);
        assert!(report
            .events
            .contains(&StateEvent::UnitCreated { id: UnitId(1) }));
        let unit = registry.unit(UnitId(1)).expect("unit exists");
        assert_eq!(unit.category, UnitCategory::Aircraft);
        assert!(unit.is_alive());
        assert_eq!(unit.flight.latitude, 37.2);
        assert_eq!(unit.flight.longitude, -115.8);
    }

    #[test]
    fn new_id_without_category_aborts_the_tick() {
        let mut registry = UnitRegistry::new(Coalition::Blue);
        let mut writer = UpdateWriter::new(50);
        writer.field(UnitId(9), &FieldUpdate::Latitude(1.0));
        spawn(&mut writer, 10, UnitCategory::GroundUnit);

        let report = registry.apply_update(&writer.finish());

        assert_eq!(
            report.outcome,
            TickOutcome::Aborted(AbortReason::NewUnitWithoutCategory(UnitId(9)))
        );
        assert_eq!(report.timestamp, Some(50));
        // Nothing after the abort point was applied.
        assert_eq!(registry.unit_count(), 0);

        // The next tick carries the full update and recovers.
        let mut writer = UpdateWriter::new(51);
        spawn(&mut writer, 9, UnitCategory::Aircraft);
        writer.field(UnitId(9), &FieldUpdate::Latitude(1.0));
        let report = registry.apply_update(&writer.finish());
        assert_eq!(report.outcome, TickOutcome::Complete);
        assert_eq!(registry.unit_count(), 1);
    }

    #[test]
    fn truncated_buffer_keeps_earlier_updates() {
        let mut registry = UnitRegistry::new(Coalition::Blue);
        let mut writer = UpdateWriter::new(10);
        spawn(&mut writer, 1, UnitCategory::Aircraft);
        writer.field(UnitId(1), &FieldUpdate::Fuel(60));
        let mut buffer = writer.finish();
        // Second record cut off mid-float.
        buffer.extend_from_slice(&1u32.to_le_bytes());
        buffer.push(tac_proto::FieldTag::Latitude.as_wire());
        buffer.extend_from_slice(&37.2f64.to_le_bytes()[..3]);

        let report = registry.apply_update(&buffer);

        assert!(matches!(
            report.outcome,
            TickOutcome::Aborted(AbortReason::Truncated(_))
        ));
        assert_eq!(report.timestamp, Some(10));
        let unit = registry.unit(UnitId(1)).expect("unit survived the abort");
        assert_eq!(unit.mission.fuel, 60);
        assert_eq!(unit.flight.latitude, 0.0);
    }

    #[test]
    fn unknown_category_is_skipped_without_losing_the_tick() {
        let mut registry = UnitRegistry::new(Coalition::Blue);

        let mut buffer = UpdateWriter::new(70);
        spawn(&mut buffer, 1, UnitCategory::Aircraft);
        let mut buffer = buffer.finish();
        // Hand-encode a category announcement the client does not know.
        buffer.extend_from_slice(&2u32.to_le_bytes());
        buffer.push(tac_proto::FieldTag::Category.as_wire());
        buffer.extend_from_slice(&6u16.to_le_bytes());
        buffer.extend_from_slice(b"Static");
        // Follow-up field for the ignored unit, then a good unit.
        buffer.extend_from_slice(&2u32.to_le_bytes());
        buffer.push(tac_proto::FieldTag::Latitude.as_wire());
        buffer.extend_from_slice(&12.5f64.to_le_bytes());
        buffer.extend_from_slice(&3u32.to_le_bytes());
        buffer.push(tac_proto::FieldTag::Category.as_wire());
        buffer.extend_from_slice(&8u16.to_le_bytes());
        buffer.extend_from_slice(b"NavyUnit");

        let report = registry.apply_update(&buffer);

        assert_eq!(report.outcome, TickOutcome::Complete);
        assert_eq!(registry.unit_count(), 2);
        assert!(registry.unit(UnitId(2)).is_none());
        assert!(registry.unit(UnitId(3)).is_some());
    }

    #[test]
    fn tag_category_mismatch_aborts_defensively() {
        let mut registry = UnitRegistry::new(Coalition::Blue);
        let mut writer = UpdateWriter::new(5);
        spawn(&mut writer, 4, UnitCategory::GroundUnit);
        let mut buffer = writer.finish();
        // Fuel is airborne-only; a ground unit reporting it means the
        // tables disagree.
        buffer.extend_from_slice(&4u32.to_le_bytes());
        buffer.push(tac_proto::FieldTag::Fuel.as_wire());
        buffer.extend_from_slice(&10u16.to_le_bytes());

        let report = registry.apply_update(&buffer);

        assert!(matches!(
            report.outcome,
            TickOutcome::Aborted(AbortReason::Malformed(
                ProtocolError::TagCategoryMismatch { .. }
            ))
        ));
    }

    #[test]
    fn groups_form_once_and_membership_is_permanent() {
        let mut registry = UnitRegistry::new(Coalition::Blue);
        let mut writer = UpdateWriter::new(1);
        spawn(&mut writer, 1, UnitCategory::Aircraft);
        writer.field(UnitId(1), &FieldUpdate::GroupName("Enfield".to_owned()));
        spawn(&mut writer, 2, UnitCategory::Aircraft);
        writer.field(UnitId(2), &FieldUpdate::GroupName("Enfield".to_owned()));

        let report = registry.apply_update(&writer.finish());

        let created: Vec<_> = report
            .events
            .iter()
            .filter(|event| matches!(event, StateEvent::GroupCreated { .. }))
            .collect();
        assert_eq!(created.len(), 1);
        assert_eq!(registry.group("Enfield").unwrap().len(), 2);

        // A later rename does not move the unit.
        let mut writer = UpdateWriter::new(2);
        writer.field(UnitId(1), &FieldUpdate::GroupName("Springfield".to_owned()));
        registry.apply_update(&writer.finish());

        assert_eq!(registry.group("Enfield").unwrap().len(), 2);
        assert!(registry.group("Springfield").is_none());
        assert_eq!(
            registry.unit(UnitId(1)).unwrap().assigned_group(),
            Some("Enfield")
        );
    }

    #[test]
    fn death_in_update_clears_selection_and_reports_it() {
        let mut registry = UnitRegistry::new(Coalition::Blue);
        let mut writer = UpdateWriter::new(1);
        spawn(&mut writer, 1, UnitCategory::Aircraft);
        registry.apply_update(&writer.finish());
        assert!(registry.select(UnitId(1)));

        let mut writer = UpdateWriter::new(2);
        writer.field(UnitId(1), &FieldUpdate::Alive(false));
        let report = registry.apply_update(&writer.finish());

        assert!(report
            .events
            .contains(&StateEvent::UnitDied { id: UnitId(1) }));
        assert!(report
            .events
            .contains(&StateEvent::SelectionCleared { id: UnitId(1) }));
        assert!(!registry.unit(UnitId(1)).unwrap().is_selected());
        assert!(registry.selected_units().is_empty());
    }

    #[test]
    fn detection_runs_only_when_inputs_changed() {
        let mut registry = UnitRegistry::new(Coalition::Blue);
        let mut writer = UpdateWriter::new(1);
        spawn(&mut writer, 1, UnitCategory::Aircraft);
        writer.field(UnitId(1), &FieldUpdate::Coalition(Coalition::Blue));
        spawn(&mut writer, 2, UnitCategory::Aircraft);
        writer.field(UnitId(2), &FieldUpdate::Coalition(Coalition::Red));
        writer.field(
            UnitId(1),
            &FieldUpdate::Contacts(vec![Contact {
                target: UnitId(2),
                method: DetectionMethod::Radar,
            }]),
        );
        registry.apply_update(&writer.finish());

        assert_eq!(registry.metrics().detection_recomputes, 1);
        assert_eq!(
            registry.unit(UnitId(2)).unwrap().detected_by(),
            &[DetectionMethod::Radar]
        );

        // A kinematics-only tick must not pay for detection again.
        let mut writer = UpdateWriter::new(2);
        writer.field(UnitId(1), &FieldUpdate::Speed(200.0));
        registry.apply_update(&writer.finish());
        assert_eq!(registry.metrics().detection_recomputes, 1);
    }

    #[test]
    fn remove_unit_leaves_its_group_and_dirties_detection() {
        let mut registry = UnitRegistry::new(Coalition::Blue);
        let mut writer = UpdateWriter::new(1);
        spawn(&mut writer, 1, UnitCategory::Aircraft);
        writer.field(UnitId(1), &FieldUpdate::GroupName("Dodge".to_owned()));
        registry.apply_update(&writer.finish());

        assert!(registry.remove_unit(UnitId(1)));
        assert!(!registry.remove_unit(UnitId(1)));
        assert!(registry.group("Dodge").unwrap().is_empty());
        assert_eq!(registry.metrics().units_removed, 1);
    }

    #[test]
    fn empty_buffer_aborts_without_a_timestamp() {
        let mut registry = UnitRegistry::new(Coalition::Blue);
        let report = registry.apply_update(&[0x01, 0x02]);
        assert_eq!(report.timestamp, None);
        assert!(matches!(
            report.outcome,
            TickOutcome::Aborted(AbortReason::Truncated(_))
        ));
    }
}
