use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use rand::{rngs::SmallRng, Rng, SeedableRng};

use tac_client::UnitRegistry;
use tac_proto::UpdateWriter;
use tac_schema::{Coalition, Contact, DetectionMethod, FieldUpdate, UnitCategory, UnitId};

/// Full first-sight update for `count` aircraft, category first per unit.
fn spawn_buffer(count: u32, rng: &mut SmallRng) -> Vec<u8> {
    let mut writer = UpdateWriter::new(1);
    for id in 1..=count {
        let id = UnitId(id);
        writer.field(id, &FieldUpdate::Category(UnitCategory::Aircraft));
        writer.field(id, &FieldUpdate::Coalition(Coalition::Blue));
        writer.field(id, &FieldUpdate::Name(format!("unit-{}", id)));
        writer.field(id, &FieldUpdate::GroupName(format!("group-{}", id.0 % 16)));
        writer.field(id, &FieldUpdate::Latitude(rng.gen_range(-80.0..80.0)));
        writer.field(id, &FieldUpdate::Longitude(rng.gen_range(-170.0..170.0)));
        writer.field(id, &FieldUpdate::Altitude(rng.gen_range(0.0..12_000.0)));
        writer.field(id, &FieldUpdate::Fuel(rng.gen_range(0..=100)));
    }
    writer.finish()
}

/// Kinematics-plus-contacts diff, the steady-state tick shape.
fn diff_buffer(count: u32, rng: &mut SmallRng) -> Vec<u8> {
    let mut writer = UpdateWriter::new(2);
    for id in 1..=count {
        let unit = UnitId(id);
        writer.field(unit, &FieldUpdate::Latitude(rng.gen_range(-80.0..80.0)));
        writer.field(unit, &FieldUpdate::Longitude(rng.gen_range(-170.0..170.0)));
        writer.field(unit, &FieldUpdate::Heading(rng.gen_range(0.0..6.28)));
        writer.field(unit, &FieldUpdate::Speed(rng.gen_range(0.0..300.0)));
        if id % 8 == 0 {
            writer.field(
                unit,
                &FieldUpdate::Contacts(vec![Contact {
                    target: UnitId(rng.gen_range(1..=count)),
                    method: DetectionMethod::Radar,
                }]),
            );
        }
    }
    writer.finish()
}

fn bench_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply_update");

    for count in [64u32, 256, 1024] {
        let mut rng = SmallRng::seed_from_u64(7);
        let spawn = spawn_buffer(count, &mut rng);
        let diff = diff_buffer(count, &mut rng);

        group.bench_with_input(BenchmarkId::new("first_sight", count), &spawn, |b, buf| {
            b.iter_batched(
                || UnitRegistry::new(Coalition::Blue),
                |mut registry| {
                    registry.apply_update(buf);
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_with_input(BenchmarkId::new("steady_state", count), &diff, |b, buf| {
            b.iter_batched(
                || {
                    let mut registry = UnitRegistry::new(Coalition::Blue);
                    registry.apply_update(&spawn);
                    registry
                },
                |mut registry| {
                    registry.apply_update(buf);
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(decode_benches, bench_apply);
criterion_main!(decode_benches);
