// The physics world container.
//
// Owns every dynamic body, every spring constraint, and the static
// boundary fixtures (floor, ceiling, side walls, and the toggleable
// chat-window obstruction). Advances the simulation by a fixed timestep:
// gravity, iterative spring relaxation for tentacle chains, motion
// integration, and static-fixture resolution. Floor overlaps are not
// resolved — they are collected as `Contact`s for the collision resolver,
// which destroys the offending body or composite. All other fixtures
// push bodies out and reflect velocity by restitution.
//
// Bodies live in a `BTreeMap<BodyId, Body>`; ids are allocated
// monotonically, so map order is spawn order. Each body carries its
// logical back-reference (`BodyOwner` + `BodyRole`) and, for burst
// particles, a `Decay` value advanced once per tick by `advance_decay` —
// the centralized replacement for the original's per-particle
// self-rescheduling animation callbacks.
//
// Contact detection approximates every dynamic body by its bounding
// circle (rects use the larger half-extent). Tentacle segments are small
// and destruction-on-contact is the only consumer, so the approximation
// is invisible in practice.

use crate::config::ArenaParams;
use crate::types::{BodyId, BodyOwner, BodyRole, Rgba, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Bodies
// ---------------------------------------------------------------------------

/// Rigid body shape.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub enum Shape {
    Circle { radius: f32 },
    Rect { half_width: f32, half_height: f32 },
}

impl Shape {
    /// Radius of the bounding circle used for fixture contact tests.
    pub fn bounding_radius(self) -> f32 {
        match self {
            Shape::Circle { radius } => radius,
            Shape::Rect {
                half_width,
                half_height,
            } => half_width.max(half_height),
        }
    }
}

/// Per-particle decay state, advanced once per tick by the world.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub enum Decay {
    /// Shrink the fill alpha by `decrement` each tick; the body is removed
    /// once alpha drops below `floor`. Firework particles.
    Fade { decrement: u8, floor: u8 },
    /// Remove the body once it has sunk below `limit_y`. Splash particles.
    SinkPast { limit_y: f32 },
}

/// Opaque sprite descriptor passed through to the rendering collaborator.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Sprite {
    pub texture: String,
    pub scale: f32,
}

/// A dynamic rigid body.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Body {
    pub id: BodyId,
    pub owner: BodyOwner,
    pub role: BodyRole,
    pub shape: Shape,
    pub position: Vec2,
    pub velocity: Vec2,
    pub rotation: f32,
    pub angular_velocity: f32,
    pub mass: f32,
    pub restitution: f32,
    pub fill: Rgba,
    pub sprite: Option<Sprite>,
    pub decay: Option<Decay>,
}

impl Body {
    /// Interop label for the rendering boundary, e.g. `squid7-tentacle3-part2`.
    pub fn interop_label(&self) -> String {
        crate::types::interop_label(self.owner, self.role)
    }
}

/// A spring link between two bodies, with local anchor offsets. Used only
/// to bind tentacle segments to each other and to the head.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Constraint {
    pub body_a: BodyId,
    pub body_b: BodyId,
    /// Anchor offset in `body_a`'s local frame.
    pub point_a: Vec2,
    /// Anchor offset in `body_b`'s local frame.
    pub point_b: Vec2,
    pub stiffness: f32,
    pub damping: f32,
    /// Natural length between the two world-space anchors.
    pub rest_length: f32,
}

// ---------------------------------------------------------------------------
// Static fixtures
// ---------------------------------------------------------------------------

/// The static boundary fixtures, created once at world initialization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FixtureKind {
    Floor,
    Ceiling,
    LeftWall,
    RightWall,
    /// The reserved chat-window region. Toggleable.
    ChatWindow,
}

/// An axis-aligned static rectangle.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Fixture {
    pub kind: FixtureKind,
    pub center: Vec2,
    pub half: Vec2,
}

/// A body/floor overlap observed during a physics step.
#[derive(Clone, Copy, Debug)]
pub struct Contact {
    pub body: BodyId,
    pub point: Vec2,
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// The full mutable physics state: fixtures, bodies, constraints.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct World {
    bodies: BTreeMap<BodyId, Body>,
    constraints: Vec<Constraint>,
    fixtures: Vec<Fixture>,
    next_body_id: u32,
    obstruction_visible: bool,
}

impl World {
    /// Create a world with its static fixtures in place.
    pub fn new(arena: &ArenaParams) -> Self {
        Self {
            bodies: BTreeMap::new(),
            constraints: Vec::new(),
            fixtures: build_fixtures(arena),
            next_body_id: 0,
            obstruction_visible: true,
        }
    }

    /// Insert a body, assigning it the next id. Returns the assigned id.
    pub fn insert_body(&mut self, mut body: Body) -> BodyId {
        let id = BodyId(self.next_body_id);
        self.next_body_id += 1;
        body.id = id;
        self.bodies.insert(id, body);
        id
    }

    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// Remove a single body and any constraints referencing it. Removing
    /// an already-absent body is a no-op.
    pub fn remove_body(&mut self, id: BodyId) -> bool {
        let removed = self.bodies.remove(&id).is_some();
        if removed {
            self.constraints
                .retain(|c| c.body_a != id && c.body_b != id);
        }
        removed
    }

    /// Remove every body belonging to `owner` (a whole composite) and all
    /// their constraints. Returns the number of bodies removed; zero when
    /// the composite is already gone.
    pub fn remove_owned(&mut self, owner: BodyOwner) -> usize {
        let doomed: Vec<BodyId> = self
            .bodies
            .values()
            .filter(|b| b.owner == owner)
            .map(|b| b.id)
            .collect();
        for id in &doomed {
            self.bodies.remove(id);
        }
        if !doomed.is_empty() {
            self.constraints
                .retain(|c| !doomed.contains(&c.body_a) && !doomed.contains(&c.body_b));
        }
        doomed.len()
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(&id)
    }

    pub fn bodies(&self) -> impl Iterator<Item = &Body> {
        self.bodies.values()
    }

    /// Spawn-ordered body ids (ids are allocated monotonically).
    pub fn body_ids(&self) -> Vec<BodyId> {
        self.bodies.keys().copied().collect()
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Whether any live body belongs to `owner`.
    pub fn owner_alive(&self, owner: BodyOwner) -> bool {
        self.bodies.values().any(|b| b.owner == owner)
    }

    pub fn obstruction_visible(&self) -> bool {
        self.obstruction_visible
    }

    /// Remove the chat-window obstruction and the ceiling it visually
    /// depends on. No-op while already hidden.
    pub fn hide_obstruction(&mut self) {
        if !self.obstruction_visible {
            return;
        }
        self.fixtures
            .retain(|f| f.kind != FixtureKind::ChatWindow && f.kind != FixtureKind::Ceiling);
        self.obstruction_visible = false;
    }

    /// Restore the chat-window obstruction and ceiling. No-op while
    /// already visible.
    pub fn restore_obstruction(&mut self, arena: &ArenaParams) {
        if self.obstruction_visible {
            return;
        }
        for fixture in build_fixtures(arena) {
            if fixture.kind == FixtureKind::ChatWindow || fixture.kind == FixtureKind::Ceiling {
                self.fixtures.push(fixture);
            }
        }
        self.obstruction_visible = true;
    }

    pub fn fixtures(&self) -> &[Fixture] {
        &self.fixtures
    }

    /// Drop all dynamic state and restore the fixtures to their initial
    /// layout.
    pub fn reset(&mut self, arena: &ArenaParams) {
        self.bodies.clear();
        self.constraints.clear();
        self.fixtures = build_fixtures(arena);
        self.obstruction_visible = true;
        self.next_body_id = 0;
    }

    // -----------------------------------------------------------------------
    // Physics step
    // -----------------------------------------------------------------------

    /// Advance physics by one fixed timestep. `gravity` is the effective
    /// downward acceleration (base gravity × mode scale). Returns the
    /// floor contacts observed this step.
    pub fn step(&mut self, dt: f32, gravity: f32) -> Vec<Contact> {
        // Gravity.
        for body in self.bodies.values_mut() {
            body.velocity.y += gravity * dt;
        }

        // Spring relaxation. Two passes settle an 8-segment chain well
        // enough at 60 Hz; the chains only need to hang together visually.
        for _ in 0..2 {
            self.relax_constraints();
        }

        // Integrate motion.
        for body in self.bodies.values_mut() {
            body.position += body.velocity * dt;
            body.rotation += body.angular_velocity * dt;
        }

        // Static fixtures: collect floor contacts, bounce off the rest.
        let mut contacts = Vec::new();
        let fixtures = self.fixtures.clone();
        for body in self.bodies.values_mut() {
            for fixture in &fixtures {
                let Some((normal, depth)) = circle_rect_overlap(
                    body.position,
                    body.shape.bounding_radius(),
                    fixture.center,
                    fixture.half,
                ) else {
                    continue;
                };
                if fixture.kind == FixtureKind::Floor {
                    contacts.push(Contact {
                        body: body.id,
                        point: body.position,
                    });
                } else {
                    // Push out and reflect the inward velocity component.
                    body.position += normal * depth;
                    let inward = body.velocity.dot(normal);
                    if inward < 0.0 {
                        body.velocity += normal * (-(1.0 + body.restitution) * inward);
                    }
                }
            }
        }
        contacts
    }

    /// One Gauss-Seidel pass over all spring constraints: positional
    /// correction scaled by stiffness, mass-weighted, plus damping of the
    /// relative velocity along the spring axis.
    fn relax_constraints(&mut self) {
        for i in 0..self.constraints.len() {
            let c = self.constraints[i].clone();
            let (Some(a), Some(b)) = (self.bodies.get(&c.body_a), self.bodies.get(&c.body_b))
            else {
                continue;
            };

            let anchor_a = a.position + c.point_a.rotate(a.rotation);
            let anchor_b = b.position + c.point_b.rotate(b.rotation);
            let delta = anchor_b - anchor_a;
            let dist = delta.length();
            if dist <= f32::EPSILON {
                continue;
            }
            let dir = delta * (1.0 / dist);
            let stretch = dist - c.rest_length;

            let inv_a = 1.0 / a.mass;
            let inv_b = 1.0 / b.mass;
            let inv_sum = inv_a + inv_b;

            let correction = stretch * c.stiffness;
            let rel_vel = (b.velocity - a.velocity).dot(dir);
            let damp = rel_vel * c.damping;

            if let Some(a) = self.bodies.get_mut(&c.body_a) {
                a.position += dir * (correction * (inv_a / inv_sum));
                a.velocity += dir * (damp * (inv_a / inv_sum));
            }
            if let Some(b) = self.bodies.get_mut(&c.body_b) {
                b.position += dir * (-correction * (inv_b / inv_sum));
                b.velocity += dir * (-damp * (inv_b / inv_sum));
            }
        }
    }

    /// Advance all particle decay state by one tick, removing expired
    /// particles from the world. Creature bodies never carry decay.
    pub fn advance_decay(&mut self) {
        let mut expired = Vec::new();
        for body in self.bodies.values_mut() {
            match body.decay {
                Some(Decay::Fade { decrement, floor }) => {
                    body.fill.a = body.fill.a.saturating_sub(decrement);
                    if body.fill.a < floor {
                        expired.push(body.id);
                    }
                }
                Some(Decay::SinkPast { limit_y }) => {
                    if body.position.y > limit_y {
                        expired.push(body.id);
                    }
                }
                None => {}
            }
        }
        for id in expired {
            self.remove_body(id);
        }
    }
}

/// Build the five static fixtures from arena geometry.
fn build_fixtures(arena: &ArenaParams) -> Vec<Fixture> {
    let w = arena.width;
    let h = arena.height;
    let t = arena.wall_thickness;
    vec![
        Fixture {
            kind: FixtureKind::Floor,
            center: Vec2::new(w / 2.0, h + arena.floor_drop),
            half: Vec2::new(w / 2.0, t / 2.0),
        },
        Fixture {
            kind: FixtureKind::Ceiling,
            center: Vec2::new(w / 2.0, -t / 2.0),
            half: Vec2::new((w + t) / 2.0, t / 2.0),
        },
        Fixture {
            kind: FixtureKind::LeftWall,
            center: Vec2::new(-t / 2.0, h / 2.0),
            half: Vec2::new(t / 2.0, h / 2.0),
        },
        Fixture {
            kind: FixtureKind::RightWall,
            center: Vec2::new(w + t / 2.0, h / 2.0),
            half: Vec2::new(t / 2.0, h / 2.0),
        },
        Fixture {
            kind: FixtureKind::ChatWindow,
            center: Vec2::new(arena.chat_window_center[0], arena.chat_window_center[1]),
            half: Vec2::new(
                arena.chat_window_size[0] / 2.0,
                arena.chat_window_size[1] / 2.0,
            ),
        },
    ]
}

/// Circle vs axis-aligned rectangle overlap. Returns the outward push
/// normal (away from the rectangle) and penetration depth, or `None`.
fn circle_rect_overlap(
    center: Vec2,
    radius: f32,
    rect_center: Vec2,
    rect_half: Vec2,
) -> Option<(Vec2, f32)> {
    let min = rect_center - rect_half;
    let max = rect_center + rect_half;
    let closest = Vec2::new(center.x.clamp(min.x, max.x), center.y.clamp(min.y, max.y));
    let delta = center - closest;
    let dist = delta.length();

    if dist > f32::EPSILON {
        if dist >= radius {
            return None;
        }
        Some((delta.normalize_or_zero(), radius - dist))
    } else {
        // Center inside the rectangle: push out along the shallowest face.
        let left = center.x - min.x;
        let right = max.x - center.x;
        let up = center.y - min.y;
        let down = max.y - center.y;
        let shallow = left.min(right).min(up).min(down);
        let normal = if shallow == left {
            Vec2::new(-1.0, 0.0)
        } else if shallow == right {
            Vec2::new(1.0, 0.0)
        } else if shallow == up {
            Vec2::new(0.0, -1.0)
        } else {
            Vec2::new(0.0, 1.0)
        };
        Some((normal, shallow + radius))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AvatarId, FireworkId, SplashId};

    fn test_body(owner: BodyOwner, position: Vec2) -> Body {
        Body {
            id: BodyId(0),
            owner,
            role: BodyRole::Particle { index: 0 },
            shape: Shape::Circle { radius: 5.0 },
            position,
            velocity: Vec2::ZERO,
            rotation: 0.0,
            angular_velocity: 0.0,
            mass: 0.5,
            restitution: 1.0,
            fill: Rgba::opaque(255, 255, 255),
            sprite: None,
            decay: None,
        }
    }

    fn arena() -> ArenaParams {
        ArenaParams::default()
    }

    #[test]
    fn new_world_has_all_five_fixtures() {
        let world = World::new(&arena());
        assert_eq!(world.fixtures().len(), 5);
        assert!(world.obstruction_visible());
    }

    #[test]
    fn obstruction_toggle_removes_chat_window_and_ceiling() {
        let params = arena();
        let mut world = World::new(&params);
        world.hide_obstruction();
        assert_eq!(world.fixtures().len(), 3);
        assert!(!world.obstruction_visible());
        // Hiding twice is a no-op.
        world.hide_obstruction();
        assert_eq!(world.fixtures().len(), 3);

        world.restore_obstruction(&params);
        assert_eq!(world.fixtures().len(), 5);
        assert!(world.obstruction_visible());
        // Restoring twice does not duplicate fixtures.
        world.restore_obstruction(&params);
        assert_eq!(world.fixtures().len(), 5);
    }

    #[test]
    fn gravity_pulls_bodies_down() {
        let mut world = World::new(&arena());
        let id = world.insert_body(test_body(
            BodyOwner::Splash(SplashId(1)),
            Vec2::new(500.0, 500.0),
        ));
        let before = world.body(id).unwrap().position.y;
        for _ in 0..10 {
            world.step(1.0 / 60.0, 980.0);
        }
        assert!(world.body(id).unwrap().position.y > before);
    }

    #[test]
    fn floor_overlap_is_reported_not_resolved() {
        let mut world = World::new(&arena());
        let params = arena();
        let floor_top = params.height + params.floor_drop - params.wall_thickness / 2.0;
        let id = world.insert_body(test_body(
            BodyOwner::Avatar(AvatarId(1)),
            Vec2::new(500.0, floor_top + 2.0),
        ));
        let contacts = world.step(1.0 / 60.0, 0.0);
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].body, id);
        // Still present — destruction is the resolver's job.
        assert!(world.body(id).is_some());
    }

    #[test]
    fn walls_bounce_with_restitution() {
        let mut world = World::new(&arena());
        let mut body = test_body(BodyOwner::Splash(SplashId(1)), Vec2::new(3.0, 500.0));
        body.velocity = Vec2::new(-100.0, 0.0);
        let id = world.insert_body(body);
        world.step(1.0 / 60.0, 0.0);
        let after = world.body(id).unwrap();
        assert!(after.velocity.x > 0.0, "velocity should reflect off the left wall");
        assert!(after.position.x >= 0.0, "body should be pushed out of the wall");
    }

    #[test]
    fn spring_pulls_separated_bodies_together() {
        let mut world = World::new(&arena());
        let a = world.insert_body(test_body(
            BodyOwner::Avatar(AvatarId(1)),
            Vec2::new(500.0, 500.0),
        ));
        let b = world.insert_body(test_body(
            BodyOwner::Avatar(AvatarId(1)),
            Vec2::new(560.0, 500.0),
        ));
        world.add_constraint(Constraint {
            body_a: a,
            body_b: b,
            point_a: Vec2::ZERO,
            point_b: Vec2::ZERO,
            stiffness: 0.3,
            damping: 0.5,
            rest_length: 10.0,
        });
        let gap_before =
            (world.body(b).unwrap().position - world.body(a).unwrap().position).length();
        for _ in 0..30 {
            world.step(1.0 / 60.0, 0.0);
        }
        let gap_after =
            (world.body(b).unwrap().position - world.body(a).unwrap().position).length();
        assert!(gap_after < gap_before, "spring should contract toward rest length");
    }

    #[test]
    fn remove_owned_takes_constraints_too() {
        let mut world = World::new(&arena());
        let owner = BodyOwner::Avatar(AvatarId(7));
        let a = world.insert_body(test_body(owner, Vec2::new(100.0, 100.0)));
        let b = world.insert_body(test_body(owner, Vec2::new(110.0, 100.0)));
        world.insert_body(test_body(
            BodyOwner::Splash(SplashId(1)),
            Vec2::new(500.0, 500.0),
        ));
        world.add_constraint(Constraint {
            body_a: a,
            body_b: b,
            point_a: Vec2::ZERO,
            point_b: Vec2::ZERO,
            stiffness: 0.3,
            damping: 0.5,
            rest_length: 10.0,
        });

        assert_eq!(world.remove_owned(owner), 2);
        assert_eq!(world.body_count(), 1);
        assert_eq!(world.constraint_count(), 0);
        assert!(!world.owner_alive(owner));
        // Already gone: no-op.
        assert_eq!(world.remove_owned(owner), 0);
    }

    #[test]
    fn fade_decay_expires_below_floor() {
        let mut world = World::new(&arena());
        let mut body = test_body(BodyOwner::Firework(FireworkId(1)), Vec2::new(500.0, 500.0));
        body.fill = Rgba::new(255, 85, 85, 30);
        body.decay = Some(Decay::Fade {
            decrement: 4,
            floor: 20,
        });
        let id = world.insert_body(body);

        world.advance_decay();
        assert_eq!(world.body(id).unwrap().fill.a, 26);
        world.advance_decay();
        assert_eq!(world.body(id).unwrap().fill.a, 22);
        world.advance_decay();
        // 18 < 20: expired.
        assert!(world.body(id).is_none());
    }

    #[test]
    fn sink_decay_expires_past_limit() {
        let mut world = World::new(&arena());
        let mut body = test_body(BodyOwner::Splash(SplashId(1)), Vec2::new(500.0, 500.0));
        body.decay = Some(Decay::SinkPast { limit_y: 600.0 });
        let id = world.insert_body(body);

        world.advance_decay();
        assert!(world.body(id).is_some());
        if let Some(b) = world.bodies.get_mut(&id) {
            b.position.y = 601.0;
        }
        world.advance_decay();
        assert!(world.body(id).is_none());
    }

    #[test]
    fn reset_restores_initial_layout() {
        let params = arena();
        let mut world = World::new(&params);
        world.insert_body(test_body(
            BodyOwner::Splash(SplashId(1)),
            Vec2::new(500.0, 500.0),
        ));
        world.hide_obstruction();
        world.reset(&params);
        assert_eq!(world.body_count(), 0);
        assert_eq!(world.fixtures().len(), 5);
        assert!(world.obstruction_visible());
    }
}
