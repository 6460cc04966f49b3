// Tick-pipeline benchmarks: a settle cycle under spawn load.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use tidepool_sim::command::{BurstKind, OverlayAction, OverlayCommand};
use tidepool_sim::sim::OverlaySim;
use tidepool_sim::types::{AvatarId, Vec2};

fn spawn_command(id: u32) -> OverlayCommand {
    OverlayCommand {
        action: OverlayAction::SpawnCreature {
            id: AvatarId(id),
            name: format!("viewer{id}"),
            position: None,
            force: None,
            force_multiplier: 0.0,
            torque: None,
        },
    }
}

/// Five squids plus a firework, then two seconds of free fall.
fn settle_cycle(seed: u64) -> OverlaySim {
    let mut sim = OverlaySim::new(seed);
    let mut commands: Vec<OverlayCommand> = (0..5).map(spawn_command).collect();
    commands.push(OverlayCommand {
        action: OverlayAction::SpawnBurst {
            kind: BurstKind::Firework,
            id: 1,
            position: Vec2::new(960.0, 400.0),
        },
    });
    sim.tick(&commands);
    for _ in 0..120 {
        sim.tick(&[]);
    }
    sim
}

fn bench_tick(c: &mut Criterion) {
    c.bench_function("settle_cycle_121_ticks", |b| {
        b.iter(|| settle_cycle(black_box(42)))
    });

    c.bench_function("tick_with_5_squids", |b| {
        let settled = settle_cycle(42);
        b.iter_batched(
            || settled.clone(),
            |mut sim| sim.tick(&[]),
            criterion::BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_tick);
criterion_main!(benches);
