use tac_proto::UpdateWriter;
use tac_schema::{Coalition, FieldUpdate, UnitCategory, UnitId};

/// Append the minimal first-sight records for a unit: category first, then
/// its coalition.
pub fn spawn_unit(
    writer: &mut UpdateWriter,
    id: u32,
    category: UnitCategory,
    coalition: Coalition,
) {
    writer.field(UnitId(id), &FieldUpdate::Category(category));
    writer.field(UnitId(id), &FieldUpdate::Coalition(coalition));
}
