// Core types shared across the simulation.
//
// Defines 2D vector math (`Vec2` — the rotate/scale/combine helpers every
// spawner uses), strongly-typed entity identifiers, the body back-reference
// types (`BodyOwner`, `BodyRole`) that replace the original overlay's
// label-string parsing, and the `Rgba` fill color passed through to the
// rendering collaborator. All types derive `Serialize` and `Deserialize`
// for save/load.
//
// Identity is typed: a physics body knows which logical entity owns it and
// which structural role it plays. The Matter.js-style label grammar
// (`squid7-tentacle3-part2`) survives only as a rendered interop string —
// see `interop_label()` — never as something the core parses back.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub};

// ---------------------------------------------------------------------------
// Vector math
// ---------------------------------------------------------------------------

/// A 2D vector in arena pixels. Y grows downward, matching the overlay's
/// screen coordinates (the floor is *below* the visible arena).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    /// The "up" launch direction. Up is negative Y on screen.
    pub const UP: Vec2 = Vec2 { x: 0.0, y: -1.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Rotate by `angle` radians (clockwise on screen).
    pub fn rotate(self, angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Normalize, or return zero for a (near-)zero vector. The silent
    /// fallback matches the sim's no-error policy: degenerate geometry
    /// degrades, it does not panic.
    pub fn normalize_or_zero(self) -> Self {
        let len = self.length();
        if len <= f32::EPSILON {
            Self::ZERO
        } else {
            Self::new(self.x / len, self.y / len)
        }
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Strongly-typed entity ID wrappers
// ---------------------------------------------------------------------------

// The external roster addresses entities by small sequential integers (the
// original overlay's per-kind counters), so ids are plain u32 newtypes
// rather than UUIDs. Allocation is monotonic per kind — see `roster.rs`
// and `world.rs`.
macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

entity_id!(/// Unique identifier for an avatar (squid) entity.
AvatarId);
entity_id!(/// Unique identifier for a splash burst entity.
SplashId);
entity_id!(/// Unique identifier for a firework burst entity.
FireworkId);
entity_id!(/// Unique identifier for a single physics body.
BodyId);

// ---------------------------------------------------------------------------
// Entity kinds and body back-references
// ---------------------------------------------------------------------------

/// The kind of a logical overlay entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Avatar,
    Splash,
    Firework,
}

impl EntityKind {
    /// The label prefix used at the interop boundary. Avatars render as
    /// "squid" — the overlay's creature — not "avatar".
    pub fn label_prefix(self) -> &'static str {
        match self {
            EntityKind::Avatar => "squid",
            EntityKind::Splash => "splash",
            EntityKind::Firework => "firework",
        }
    }
}

/// Back-reference from a physics body to the logical entity that owns it.
/// This replaces the original's `label.split('-')[0]` parsing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BodyOwner {
    Avatar(AvatarId),
    Splash(SplashId),
    Firework(FireworkId),
}

impl BodyOwner {
    pub fn kind(self) -> EntityKind {
        match self {
            BodyOwner::Avatar(_) => EntityKind::Avatar,
            BodyOwner::Splash(_) => EntityKind::Splash,
            BodyOwner::Firework(_) => EntityKind::Firework,
        }
    }

    pub fn raw_id(self) -> u32 {
        match self {
            BodyOwner::Avatar(id) => id.0,
            BodyOwner::Splash(id) => id.0,
            BodyOwner::Firework(id) => id.0,
        }
    }

    /// Root composite label, e.g. `squid7`.
    pub fn interop_label(self) -> String {
        format!("{}{}", self.kind().label_prefix(), self.raw_id())
    }
}

/// A body's structural role within its composite.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BodyRole {
    /// The single head body of a squid.
    Head,
    /// One segment of one tentacle arm. Arms and segments are 0-indexed.
    TentacleSegment { arm: u8, segment: u8 },
    /// One independent burst particle.
    Particle { index: u16 },
}

/// Render the full interop label for a body, following the original
/// overlay's grammar: `squid7-head`, `squid7-tentacle3-part2`,
/// `splash4-particle12`.
pub fn interop_label(owner: BodyOwner, role: BodyRole) -> String {
    let root = owner.interop_label();
    match role {
        BodyRole::Head => format!("{root}-head"),
        BodyRole::TentacleSegment { arm, segment } => {
            format!("{root}-tentacle{arm}-part{segment}")
        }
        BodyRole::Particle { index } => format!("{root}-particle{index}"),
    }
}

// ---------------------------------------------------------------------------
// Fill color
// ---------------------------------------------------------------------------

/// An RGBA fill color, opaque to the simulation core and passed through to
/// the rendering collaborator. The alpha channel doubles as the firework
/// fade state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 0xff)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The overlay's CSS-style hex form, e.g. `#ff5555ff`.
        write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

/// Gravity mode selected by the overlay operator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GravityMode {
    #[default]
    Normal,
    Low,
}
