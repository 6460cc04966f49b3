// Commands that mutate simulation state.
//
// All external mutations go through `OverlayCommand`. The sim is driven as
// `(state, commands) -> (new state, events)`, and commands are the input:
// the event-source integration (viewer follows/subs/cheers) and the
// operator menu both reduce to these four actions.
//
// Commands are fire-and-forget. None returns a success/failure result:
// malformed input falls back to a computed default or degrades to a silent
// no-op, and a spawn arriving while the world is crowded is deferred and
// retried rather than rejected (see `sim.rs`).

use crate::types::{AvatarId, Vec2};
use serde::{Deserialize, Serialize};

/// An externally issued command.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OverlayCommand {
    pub action: OverlayAction,
}

/// The specific action a command performs.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum OverlayAction {
    /// Spawn a squid for the given avatar. Position and launch overrides
    /// are optional — a batched "pile" spawn supplies all three so squids
    /// land predictably; a viewer-event spawn supplies none and gets a
    /// random launch from a computed-default origin.
    SpawnCreature {
        id: AvatarId,
        name: String,
        /// Spawn position override. `None` uses the computed default.
        position: Option<Vec2>,
        /// Explicit launch velocity. When set, used directly; otherwise an
        /// upward vector is jittered within the launch arc and scaled by
        /// `force_multiplier`.
        force: Option<Vec2>,
        /// Scales the default launch speed. Ignored when `force` is set.
        force_multiplier: f32,
        /// Initial angular velocity override for the head.
        torque: Option<f32>,
    },
    /// Spawn a burst effect (splash or firework) at a point. The raw id is
    /// interpreted per `kind` (it comes from the external roster's per-kind
    /// counters).
    SpawnBurst {
        kind: BurstKind,
        id: u32,
        position: Vec2,
    },
    /// Temporarily hide the chat-window obstruction (and the ceiling it
    /// hangs from). A repeated toggle re-arms the pending restoration.
    ToggleObstruction,
    /// Switch between the two fixed gravity scales.
    SetGravityMode { low_gravity: bool },
}

/// Which burst effect a `SpawnBurst` command materializes. Splashes are
/// normally spawned internally by the collision resolver; the external
/// request path exists for both kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BurstKind {
    Splash,
    Firework,
}
