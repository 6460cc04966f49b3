// The capacity manager.
//
// A best-effort relief valve, not a precise LRU: when the live body count
// exceeds the hard ceiling, evict in two passes —
//   1. loose burst particles, one at a time, until back under the ceiling
//      or no particles remain;
//   2. whole squid composites, each credited at the full per-squid body
//      count toward the ceiling (the budget decrements in that unit, not
//      per actual body).
//
// Body ids are monotonic and the world iterates them in order, so both
// passes evict oldest-first. Runs once per tick, after collision
// resolution and decay.

use crate::config::CapacityParams;
use crate::types::{BodyOwner, BodyRole};
use crate::world::World;

/// What one enforcement pass evicted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EvictionReport {
    pub particles_evicted: usize,
    pub squids_evicted: usize,
}

/// Enforce the hard body ceiling. `squid_body_credit` is the per-squid
/// body count (65 in the default config) credited for each whole-composite
/// eviction.
pub fn enforce(
    world: &mut World,
    capacity: &CapacityParams,
    squid_body_credit: usize,
) -> EvictionReport {
    let mut report = EvictionReport::default();
    let ceiling = capacity.hard_body_ceiling;
    if world.body_count() <= ceiling {
        return report;
    }

    // Pass 1: loose particles, oldest first.
    for id in world.body_ids() {
        if world.body_count() <= ceiling {
            break;
        }
        let is_particle = world
            .body(id)
            .is_some_and(|b| matches!(b.role, BodyRole::Particle { .. }));
        if is_particle && world.remove_body(id) {
            report.particles_evicted += 1;
        }
    }
    if world.body_count() <= ceiling {
        return report;
    }

    // Pass 2: whole squids, credited per composite. First-seen order over
    // spawn-ordered bodies = oldest squid first.
    let mut overage = world.body_count() - ceiling;
    let mut owners: Vec<BodyOwner> = Vec::new();
    for body in world.bodies() {
        if matches!(body.owner, BodyOwner::Avatar(_)) && !owners.contains(&body.owner) {
            owners.push(body.owner);
        }
    }
    for owner in owners {
        if overage == 0 {
            break;
        }
        world.remove_owned(owner);
        report.squids_evicted += 1;
        overage = overage.saturating_sub(squid_body_credit);
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ArenaParams, FireworkParams, SquidParams};
    use crate::rng::OverlayRng;
    use crate::spawn::{spawn_firework, spawn_squid, LaunchSpec};
    use crate::types::{AvatarId, FireworkId, Vec2};

    fn setup() -> (World, OverlayRng, ArenaParams) {
        let arena = ArenaParams::default();
        (World::new(&arena), OverlayRng::new(42), arena)
    }

    fn capacity(soft: usize, hard: usize) -> CapacityParams {
        CapacityParams {
            soft_spawn_threshold: soft,
            hard_body_ceiling: hard,
        }
    }

    #[test]
    fn under_ceiling_is_untouched() {
        let (mut world, mut rng, _) = setup();
        let firework = FireworkParams::default();
        spawn_firework(&mut world, &mut rng, &firework, FireworkId(1), Vec2::new(500.0, 300.0));
        let report = enforce(&mut world, &capacity(630, 700), 65);
        assert_eq!(report, EvictionReport::default());
        assert_eq!(world.body_count(), 240);
    }

    #[test]
    fn particle_overflow_evicts_oldest_particles_only() {
        let (mut world, mut rng, _) = setup();
        // 650 particles against a 630 ceiling.
        let firework = FireworkParams {
            particle_count: 325,
            ..FireworkParams::default()
        };
        spawn_firework(&mut world, &mut rng, &firework, FireworkId(1), Vec2::new(500.0, 300.0));
        spawn_firework(&mut world, &mut rng, &firework, FireworkId(2), Vec2::new(900.0, 300.0));
        assert_eq!(world.body_count(), 650);

        let report = enforce(&mut world, &capacity(630, 630), 65);
        assert_eq!(report.particles_evicted, 20);
        assert_eq!(report.squids_evicted, 0);
        assert_eq!(world.body_count(), 630);
        // Oldest first: all 20 evictions come from the first burst.
        let first_burst_left = world
            .bodies()
            .filter(|b| b.owner == crate::types::BodyOwner::Firework(FireworkId(1)))
            .count();
        assert_eq!(first_burst_left, 305);
    }

    #[test]
    fn squid_overflow_falls_through_to_whole_composite_eviction() {
        let (mut world, mut rng, arena) = setup();
        let squid = SquidParams::default();
        // 11 squids = 715 bodies > 700 ceiling, no particles to shed.
        for i in 0..11 {
            spawn_squid(
                &mut world,
                &mut rng,
                &squid,
                arena.width,
                arena.height,
                AvatarId(i),
                LaunchSpec::default(),
            );
        }
        assert_eq!(world.body_count(), 715);

        let report = enforce(&mut world, &capacity(630, 700), squid.body_count());
        assert_eq!(report.squids_evicted, 1, "one 65-body credit covers a 15-body overage");
        assert_eq!(world.body_count(), 650);
        // The oldest squid went first.
        assert!(!world.owner_alive(crate::types::BodyOwner::Avatar(AvatarId(0))));
        assert!(world.owner_alive(crate::types::BodyOwner::Avatar(AvatarId(10))));
    }

    #[test]
    fn particles_are_shed_before_squids() {
        let (mut world, mut rng, arena) = setup();
        let squid = SquidParams::default();
        for i in 0..10 {
            spawn_squid(
                &mut world,
                &mut rng,
                &squid,
                arena.width,
                arena.height,
                AvatarId(i),
                LaunchSpec::default(),
            );
        }
        let firework = FireworkParams {
            particle_count: 100,
            ..FireworkParams::default()
        };
        spawn_firework(&mut world, &mut rng, &firework, FireworkId(1), Vec2::new(500.0, 300.0));
        // 650 squid bodies + 100 particles = 750.
        assert_eq!(world.body_count(), 750);

        let report = enforce(&mut world, &capacity(630, 700), squid.body_count());
        assert_eq!(report.particles_evicted, 50);
        assert_eq!(report.squids_evicted, 0, "particles alone covered the overage");
        assert_eq!(world.body_count(), 700);
        for i in 0..10 {
            assert!(world.owner_alive(crate::types::BodyOwner::Avatar(AvatarId(i))));
        }
    }
}
