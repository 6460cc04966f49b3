// The body-graph factory.
//
// Builds the articulated squid composite (one head plus `arms` tentacles of
// `segments` spring-linked parts each, arms fanned evenly around the head)
// and the two burst effects (splash and firework — loose, unconstrained
// particle clouds that carry their own decay state).
//
// Every spawned body is tagged with its `BodyOwner`/`BodyRole`
// back-reference, which is all downstream stages need: the collision
// resolver destroys by owner, the capacity manager filters by role, the
// reconciler diffs owners against the roster.
//
// Missing spawn parameters fall back to computed defaults (random origin
// along the arena floor line, jittered upward launch) — never to an error.

use crate::config::{FireworkParams, SplashParams, SquidParams};
use crate::rng::OverlayRng;
use crate::types::{AvatarId, BodyId, BodyOwner, BodyRole, FireworkId, Rgba, SplashId, Vec2};
use crate::world::{Body, Constraint, Decay, Shape, Sprite, World};
use smallvec::SmallVec;
use std::f32::consts::TAU;

/// The squid's flat fill, under the sprite.
const SQUID_FILL: Rgba = Rgba::opaque(0xff, 0xc0, 0xcb);

/// Optional launch overrides for a squid spawn. `default()` gives the
/// viewer-event behavior: computed origin, jittered upward launch, random
/// spin.
#[derive(Clone, Copy, Debug, Default)]
pub struct LaunchSpec {
    /// Spawn position; `None` picks a random spot along the arena floor line.
    pub position: Option<Vec2>,
    /// Explicit launch velocity; `None` jitters the default upward vector.
    pub force: Option<Vec2>,
    /// Scales the default launch speed. Ignored when `force` is set.
    /// A zero multiplier is treated as 1.0 (unset input from the wire).
    pub force_multiplier: f32,
    /// Initial angular velocity for the head; `None` picks a random spin.
    pub torque: Option<f32>,
}

/// Ids of the bodies making up one spawned squid.
pub struct SpawnedSquid {
    pub head: BodyId,
    pub body_count: usize,
}

/// Build a squid composite for `id` and insert it into the world.
///
/// The head gets the launch impulse plus a random initial rotation and
/// angular velocity; each arm is a chain of tapering segments linked by
/// spring constraints, the first segment anchored to the head at the arm's
/// fan angle.
pub fn spawn_squid(
    world: &mut World,
    rng: &mut OverlayRng,
    squid: &SquidParams,
    arena_width: f32,
    arena_height: f32,
    id: AvatarId,
    launch: LaunchSpec,
) -> SpawnedSquid {
    let owner = BodyOwner::Avatar(id);
    let head_radius = squid.head_radius();
    let seg_h = squid.segment_height();

    let origin = launch.position.unwrap_or_else(|| {
        Vec2::new(
            rng.range_f32(squid.spawn_margin, arena_width - squid.spawn_margin),
            arena_height - squid.spawn_rise,
        )
    });

    let multiplier = if launch.force_multiplier > 0.0 {
        launch.force_multiplier
    } else {
        1.0
    };
    let velocity = launch.force.unwrap_or_else(|| {
        Vec2::UP.rotate(rng.jitter_arc(squid.launch_arc_rad)) * (squid.launch_speed * multiplier)
    });
    let spin = launch
        .torque
        .unwrap_or_else(|| rng.range_f32(-squid.max_spin, squid.max_spin));

    let head = world.insert_body(Body {
        id: BodyId(0),
        owner,
        role: BodyRole::Head,
        shape: Shape::Circle {
            radius: head_radius,
        },
        position: origin,
        velocity,
        rotation: rng.range_f32(0.0, TAU),
        angular_velocity: spin,
        mass: squid.head_mass,
        restitution: squid.head_restitution,
        fill: SQUID_FILL,
        sprite: Some(Sprite {
            texture: "squid-head".to_string(),
            scale: squid.head_sprite_scale * squid.scale,
        }),
        decay: None,
    });

    let mut body_count = 1;
    for arm in 0..squid.arms {
        let arm_angle = squid.arm_fan_offset_rad + TAU / squid.arms as f32 * arm as f32;
        let anchor = Vec2::new(-head_radius, 0.0).rotate(arm_angle);

        let mut chain: SmallVec<[BodyId; 8]> = SmallVec::new();
        for segment in 0..squid.segments {
            let position = origin + anchor + Vec2::new(0.0, segment as f32 * seg_h);
            let sprite_scale = (squid.segment_sprite_scale
                - segment as f32 * (0.08 / (squid.segments as f32 + 2.0)))
                * squid.scale;
            let part = world.insert_body(Body {
                id: BodyId(0),
                owner,
                role: BodyRole::TentacleSegment { arm, segment },
                shape: Shape::Rect {
                    half_width: squid.tapered_width(segment) / 2.0,
                    half_height: seg_h / 2.0,
                },
                position,
                velocity: Vec2::ZERO,
                rotation: 0.0,
                angular_velocity: 0.0,
                mass: squid.segment_mass,
                restitution: 0.0,
                fill: SQUID_FILL,
                sprite: Some(Sprite {
                    texture: "tentacle-part".to_string(),
                    scale: sprite_scale,
                }),
                decay: None,
            });
            body_count += 1;

            // Link to the head (at the fan anchor) or to the previous
            // segment. The rest length is the natural anchor spacing in the
            // unrotated build pose — seg_h / 3 for both link types.
            let (body_a, point_a) = match chain.last() {
                None => (head, anchor),
                Some(&prev) => (prev, Vec2::new(0.0, seg_h / 3.0)),
            };
            world.add_constraint(Constraint {
                body_a,
                body_b: part,
                point_a,
                point_b: Vec2::new(0.0, -seg_h / 3.0),
                stiffness: squid.constraint_stiffness,
                damping: squid.constraint_damping,
                rest_length: seg_h / 3.0,
            });
            chain.push(part);
        }
    }

    SpawnedSquid { head, body_count }
}

/// Build a splash burst: `particle_count` loose particles launched upward
/// within the jitter arc, each decaying once it has sunk `sink_depth`
/// below the contact height.
pub fn spawn_splash(
    world: &mut World,
    rng: &mut OverlayRng,
    splash: &SplashParams,
    id: SplashId,
    origin: Vec2,
) -> usize {
    let owner = BodyOwner::Splash(id);
    let start = Vec2::new(origin.x, origin.y - splash.rise);
    for index in 0..splash.particle_count {
        let direction = Vec2::UP.rotate(rng.jitter_arc(splash.launch_arc_rad));
        let speed = rng.range_f32(splash.min_speed, splash.max_speed);
        let brightness = rng.range_u8_inclusive(splash.min_brightness, 0xff);
        world.insert_body(Body {
            id: BodyId(0),
            owner,
            role: BodyRole::Particle { index },
            shape: Shape::Circle {
                radius: rng.range_f32(splash.min_radius, splash.max_radius),
            },
            position: start,
            velocity: direction * speed,
            rotation: 0.0,
            angular_velocity: 0.0,
            mass: splash.particle_mass,
            restitution: splash.restitution,
            fill: Rgba::opaque(brightness, brightness, 0xff),
            sprite: None,
            decay: Some(Decay::SinkPast {
                limit_y: origin.y + splash.sink_depth,
            }),
        });
    }
    splash.particle_count as usize
}

/// Build a firework burst: `particle_count` loose particles launched in a
/// full circle, all sharing one palette color, fading out by alpha.
pub fn spawn_firework(
    world: &mut World,
    rng: &mut OverlayRng,
    firework: &FireworkParams,
    id: FireworkId,
    origin: Vec2,
) -> usize {
    let owner = BodyOwner::Firework(id);
    let palette = FireworkParams::palette();
    // One color per burst, like a real shell.
    let [r, g, b] = *rng.pick(&palette).unwrap_or(&[0xff, 0xff, 0xff]);
    for index in 0..firework.particle_count {
        let direction = Vec2::UP.rotate(rng.range_f32(0.0, TAU));
        let speed = rng.range_f32(firework.min_speed, firework.max_speed);
        world.insert_body(Body {
            id: BodyId(0),
            owner,
            role: BodyRole::Particle { index },
            shape: Shape::Circle {
                radius: rng.range_f32(firework.min_radius, firework.max_radius),
            },
            position: origin,
            velocity: direction * speed,
            rotation: 0.0,
            angular_velocity: 0.0,
            mass: firework.particle_mass,
            restitution: firework.restitution,
            fill: Rgba::opaque(r, g, b),
            sprite: None,
            decay: Some(Decay::Fade {
                decrement: firework.fade_decrement,
                floor: firework.fade_floor,
            }),
        });
    }
    firework.particle_count as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ArenaParams;
    use std::collections::BTreeSet;

    fn setup() -> (World, OverlayRng, ArenaParams) {
        let arena = ArenaParams::default();
        (World::new(&arena), OverlayRng::new(42), arena)
    }

    #[test]
    fn squid_has_head_plus_arms_times_segments() {
        let (mut world, mut rng, arena) = setup();
        let squid = SquidParams::default();
        let spawned = spawn_squid(
            &mut world,
            &mut rng,
            &squid,
            arena.width,
            arena.height,
            AvatarId(1),
            LaunchSpec::default(),
        );
        assert_eq!(spawned.body_count, 65);
        assert_eq!(world.body_count(), 65);
        // One constraint per segment: arms × segments.
        assert_eq!(world.constraint_count(), 64);
    }

    #[test]
    fn squid_roles_are_unique_and_owned() {
        let (mut world, mut rng, arena) = setup();
        let squid = SquidParams::default();
        spawn_squid(
            &mut world,
            &mut rng,
            &squid,
            arena.width,
            arena.height,
            AvatarId(7),
            LaunchSpec::default(),
        );

        let owner = BodyOwner::Avatar(AvatarId(7));
        let mut roles = BTreeSet::new();
        let mut labels = BTreeSet::new();
        for body in world.bodies() {
            assert_eq!(body.owner, owner);
            assert!(roles.insert(body.role), "duplicate role {:?}", body.role);
            let label = body.interop_label();
            assert!(label.starts_with("squid7-"), "bad label {label}");
            assert!(labels.insert(label), "duplicate label");
        }
        assert_eq!(roles.len(), 65);
    }

    #[test]
    fn default_launch_points_upward_within_arc() {
        let (mut world, mut rng, arena) = setup();
        let squid = SquidParams::default();
        for i in 0..20 {
            let spawned = spawn_squid(
                &mut world,
                &mut rng,
                &squid,
                arena.width,
                arena.height,
                AvatarId(i),
                LaunchSpec::default(),
            );
            let head = world.body(spawned.head).unwrap();
            assert!(head.velocity.y < 0.0, "launch must point up");
            // Within ±45° of straight up: |vx| <= |vy|.
            assert!(head.velocity.x.abs() <= head.velocity.y.abs() + 1e-3);
            let margin = squid.spawn_margin;
            assert!(head.position.x >= margin && head.position.x <= arena.width - margin);
        }
    }

    #[test]
    fn explicit_launch_overrides_are_used_directly() {
        let (mut world, mut rng, arena) = setup();
        let squid = SquidParams::default();
        let spec = LaunchSpec {
            position: Some(Vec2::new(333.0, 444.0)),
            force: Some(Vec2::new(50.0, -80.0)),
            force_multiplier: 0.0,
            torque: Some(2.5),
        };
        let spawned = spawn_squid(
            &mut world,
            &mut rng,
            &squid,
            arena.width,
            arena.height,
            AvatarId(1),
            spec,
        );
        let head = world.body(spawned.head).unwrap();
        assert_eq!(head.position, Vec2::new(333.0, 444.0));
        assert_eq!(head.velocity, Vec2::new(50.0, -80.0));
        assert_eq!(head.angular_velocity, 2.5);
    }

    #[test]
    fn splash_particles_are_loose_and_sink_limited() {
        let (mut world, mut rng, _) = setup();
        let splash = SplashParams::default();
        let origin = Vec2::new(800.0, 1000.0);
        let count = spawn_splash(&mut world, &mut rng, &splash, SplashId(4), origin);
        assert_eq!(count, 100);
        assert_eq!(world.body_count(), 100);
        assert_eq!(world.constraint_count(), 0, "burst particles are unconstrained");
        for body in world.bodies() {
            assert_eq!(body.position, Vec2::new(800.0, 980.0));
            assert!(body.velocity.y < 0.0, "splash particles launch upward");
            match body.decay {
                Some(Decay::SinkPast { limit_y }) => assert_eq!(limit_y, 1100.0),
                other => panic!("expected sink decay, got {other:?}"),
            }
            // Blue-white palette: full blue, equal red/green.
            assert_eq!(body.fill.b, 0xff);
            assert_eq!(body.fill.r, body.fill.g);
            assert!(body.fill.r >= splash.min_brightness);
        }
    }

    #[test]
    fn firework_particles_share_one_palette_color() {
        let (mut world, mut rng, _) = setup();
        let firework = FireworkParams::default();
        let count = spawn_firework(
            &mut world,
            &mut rng,
            &firework,
            FireworkId(9),
            Vec2::new(500.0, 300.0),
        );
        assert_eq!(count, 240);
        let first = world.bodies().next().unwrap().fill;
        let palette = FireworkParams::palette();
        assert!(palette.contains(&[first.r, first.g, first.b]));
        for body in world.bodies() {
            assert_eq!((body.fill.r, body.fill.g, body.fill.b), (first.r, first.g, first.b));
            assert_eq!(body.fill.a, 0xff);
            assert!(matches!(body.decay, Some(Decay::Fade { .. })));
        }
    }

    #[test]
    fn pinned_parameter_ranges_spawn_fixed_particles() {
        // min == max pins a range shut; the burst still materializes, with
        // every particle at the pinned value.
        let (mut world, mut rng, _) = setup();
        let firework = FireworkParams {
            min_radius: 2.0,
            max_radius: 2.0,
            min_speed: 0.0,
            max_speed: 0.0,
            ..FireworkParams::default()
        };
        let count = spawn_firework(
            &mut world,
            &mut rng,
            &firework,
            FireworkId(1),
            Vec2::new(500.0, 300.0),
        );
        assert_eq!(count, 240);
        for body in world.bodies() {
            assert_eq!(body.velocity, Vec2::ZERO);
            assert!(matches!(body.shape, Shape::Circle { radius } if radius == 2.0));
        }
    }
}
