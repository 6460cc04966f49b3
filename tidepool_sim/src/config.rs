// Data-driven overlay configuration.
//
// All tunable simulation parameters live here in `OverlayConfig`, grouped
// into nested parameter structs. The sim never uses magic numbers — it
// reads from the config. Defaults reproduce the production overlay's
// constants: a 1920×1080 arena ticked at 60 Hz, 8-armed squids with
// 8-segment tentacles, 100-particle splashes, 240-particle fireworks,
// and the soft-630 / hard-700 capacity pair.
//
// The soft spawn-defer threshold and the hard eviction ceiling are two
// independent constants on purpose: the first queues new spawns, the
// second evicts live bodies. Keep soft < hard.

use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_4;

/// Complete overlay configuration — all parameters the sim reads.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OverlayConfig {
    pub arena: ArenaParams,
    pub squid: SquidParams,
    pub splash: SplashParams,
    pub firework: FireworkParams,
    pub capacity: CapacityParams,
    pub timing: TimingParams,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            arena: ArenaParams::default(),
            squid: SquidParams::default(),
            splash: SplashParams::default(),
            firework: FireworkParams::default(),
            capacity: CapacityParams::default(),
            timing: TimingParams::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Arena geometry and gravity
// ---------------------------------------------------------------------------

/// Arena dimensions, static fixture geometry, and gravity scales.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ArenaParams {
    /// Visible arena width in pixels.
    pub width: f32,
    /// Visible arena height in pixels.
    pub height: f32,
    /// Thickness of the boundary fixtures.
    pub wall_thickness: f32,
    /// How far below the visible arena the floor sits. Bodies fall out of
    /// view before they land.
    pub floor_drop: f32,
    /// Center of the reserved chat-window obstruction.
    pub chat_window_center: [f32; 2],
    /// Width/height of the chat-window obstruction.
    pub chat_window_size: [f32; 2],
    /// Downward acceleration in px/s² before mode scaling.
    pub gravity: f32,
    /// Gravity scale in `GravityMode::Normal`.
    pub gravity_scale_normal: f32,
    /// Gravity scale in `GravityMode::Low`.
    pub gravity_scale_low: f32,
}

impl Default for ArenaParams {
    fn default() -> Self {
        Self {
            width: 1920.0,
            height: 1080.0,
            wall_thickness: 50.0,
            floor_drop: 100.0,
            chat_window_center: [1920.0 - 275.0, 1080.0 - 250.0],
            chat_window_size: [410.0, 360.0],
            gravity: 980.0,
            gravity_scale_normal: 1.0,
            gravity_scale_low: 0.3,
        }
    }
}

// ---------------------------------------------------------------------------
// Squid construction
// ---------------------------------------------------------------------------

/// Squid body-graph parameters. A squid is one head plus `arms` tentacles
/// of `segments` spring-linked parts each.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SquidParams {
    /// Base squid size in pixels before `scale`.
    pub size: f32,
    /// Overall scale applied to the base size.
    pub scale: f32,
    /// Number of tentacle arms.
    pub arms: u8,
    /// Segments per arm.
    pub segments: u8,
    /// Fixed angular offset of the arm fan, radians. Arms are spaced
    /// evenly (`2π / arms`) starting from this offset.
    pub arm_fan_offset_rad: f32,
    pub head_mass: f32,
    pub head_restitution: f32,
    pub segment_mass: f32,
    /// Sprite scale for the head texture, before `scale`.
    pub head_sprite_scale: f32,
    /// Sprite scale for segment textures, before `scale` and taper.
    pub segment_sprite_scale: f32,
    /// Spring stiffness for tentacle constraints.
    pub constraint_stiffness: f32,
    /// Spring damping for tentacle constraints.
    pub constraint_damping: f32,
    /// Launch speed in px/s for a force multiplier of 1.0.
    pub launch_speed: f32,
    /// Half-arc of the random launch jitter, radians.
    pub launch_arc_rad: f32,
    /// Maximum magnitude of the random initial angular velocity, rad/s.
    pub max_spin: f32,
    /// Horizontal margin for the computed-default spawn position.
    pub spawn_margin: f32,
    /// Height above the floor line for the computed-default spawn position.
    pub spawn_rise: f32,
}

impl SquidParams {
    /// Scaled head radius.
    pub fn head_radius(&self) -> f32 {
        self.size * self.scale
    }

    /// Scaled base width of a tentacle segment (before taper).
    pub fn segment_width(&self) -> f32 {
        (self.size / 3.0) * self.scale
    }

    /// Scaled height of a tentacle segment.
    pub fn segment_height(&self) -> f32 {
        (self.size / 2.0) * self.scale
    }

    /// Width of segment `i`, tapering linearly along the chain.
    pub fn tapered_width(&self, segment: u8) -> f32 {
        let base = self.segment_width();
        base - segment as f32 * (base / (self.segments as f32 + 2.0))
    }

    /// Total bodies in one squid composite: 1 head + arms × segments.
    /// The capacity manager credits whole-squid evictions in this unit.
    pub fn body_count(&self) -> usize {
        1 + self.arms as usize * self.segments as usize
    }
}

impl Default for SquidParams {
    fn default() -> Self {
        Self {
            size: 35.0,
            scale: 0.5,
            arms: 8,
            segments: 8,
            arm_fan_offset_rad: 0.45,
            head_mass: 0.5,
            head_restitution: 1.0,
            segment_mass: 0.05,
            head_sprite_scale: 0.08,
            segment_sprite_scale: 0.1,
            constraint_stiffness: 0.3,
            constraint_damping: 0.5,
            launch_speed: 700.0,
            launch_arc_rad: FRAC_PI_4,
            max_spin: 5.0,
            spawn_margin: 80.0,
            spawn_rise: 100.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Burst effects
// ---------------------------------------------------------------------------

/// Splash burst parameters. Splash particles decay by traveled distance:
/// once one sinks `sink_depth` below its spawn height, it is removed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SplashParams {
    pub particle_count: u16,
    pub min_radius: f32,
    pub max_radius: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    pub particle_mass: f32,
    pub restitution: f32,
    /// Half-arc of the upward launch jitter, radians.
    pub launch_arc_rad: f32,
    /// Particles spawn this far above the contact point.
    pub rise: f32,
    /// Removal depth below the spawn height.
    pub sink_depth: f32,
    /// Random blue-white brightness range (red/green channels).
    pub min_brightness: u8,
}

impl Default for SplashParams {
    fn default() -> Self {
        Self {
            particle_count: 100,
            min_radius: 1.0,
            max_radius: 6.0,
            min_speed: 300.0,
            max_speed: 600.0,
            particle_mass: 0.5,
            restitution: 1.0,
            launch_arc_rad: FRAC_PI_4,
            rise: 20.0,
            sink_depth: 100.0,
            min_brightness: 100,
        }
    }
}

/// Firework burst parameters. Firework particles decay by alpha fade:
/// `fade_decrement` per tick from 255, removed below `fade_floor`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FireworkParams {
    pub particle_count: u16,
    pub min_radius: f32,
    pub max_radius: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    pub particle_mass: f32,
    pub restitution: f32,
    pub fade_decrement: u8,
    pub fade_floor: u8,
}

impl FireworkParams {
    /// The fixed pastel palette, one color per whole burst.
    pub fn palette() -> [[u8; 3]; 4] {
        [
            [0xff, 0x55, 0x55],
            [0x55, 0x55, 0xff],
            [0xff, 0x55, 0xff],
            [0xff, 0xff, 0xff],
        ]
    }
}

impl Default for FireworkParams {
    fn default() -> Self {
        Self {
            particle_count: 240,
            min_radius: 1.0,
            max_radius: 3.0,
            min_speed: 150.0,
            max_speed: 300.0,
            particle_mass: 0.002,
            restitution: 0.0,
            fade_decrement: 4,
            fade_floor: 20,
        }
    }
}

// ---------------------------------------------------------------------------
// Capacity and timing
// ---------------------------------------------------------------------------

/// Body-count limits. `soft_spawn_threshold` defers new spawns;
/// `hard_body_ceiling` evicts live bodies. Keep soft < hard.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CapacityParams {
    pub soft_spawn_threshold: usize,
    pub hard_body_ceiling: usize,
}

impl Default for CapacityParams {
    fn default() -> Self {
        Self {
            soft_spawn_threshold: 630,
            hard_body_ceiling: 700,
        }
    }
}

/// Tick-rate and one-shot timer durations.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TimingParams {
    /// Fixed tick rate in Hz. The timestep is always `1 / tick_rate`
    /// regardless of wall-clock drift.
    pub tick_rate: u32,
    /// Ticks the obstruction (and ceiling) stay hidden after a toggle.
    pub obstruction_hide_ticks: u64,
    /// Ticks before a deferred spawn request is retried.
    pub spawn_retry_ticks: u64,
}

impl TimingParams {
    /// The fixed timestep in seconds.
    pub fn dt(&self) -> f32 {
        1.0 / self.tick_rate as f32
    }
}

impl Default for TimingParams {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            obstruction_hide_ticks: 120,
            spawn_retry_ticks: 60,
        }
    }
}
