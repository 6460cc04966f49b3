// One-shot timers and the outward event stream.
//
// Two related but distinct concepts live here:
// - `TimerQueue`: tick-indexed one-shot timers the sim schedules for itself
//   (obstruction restoration, deferred spawn retries). A min-heap on
//   `(tick, sequence)` gives a total firing order.
// - `OverlayEvent`: structured notifications emitted as tick output and
//   consumed by the external roster/store and the overlay UI.
//
// Timers fire at most once and carry no ambient state — each handler in
// `sim.rs` re-checks the world before acting, so a timer that outlives the
// thing it targeted (a reset world, a re-armed restoration) is dropped as a
// stale no-op rather than corrupting fixture or roster state.

use crate::command::BurstKind;
use crate::types::{AvatarId, EntityKind, Vec2};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

// ---------------------------------------------------------------------------
// One-shot timers
// ---------------------------------------------------------------------------

/// A one-shot timer scheduled for a future tick.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Timer {
    /// The tick at which this timer fires.
    pub tick: u64,
    /// Monotonic tiebreaker; lower fires first within a tick.
    pub sequence: u64,
    /// What happens when it fires.
    pub kind: TimerKind,
}

/// The one-shot delayed actions the sim schedules.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum TimerKind {
    /// Restore the chat-window obstruction and the ceiling. Only honored
    /// if this timer matches the currently armed restore deadline — a
    /// re-arming toggle leaves earlier timers stale.
    RestoreObstruction,
    /// Retry a spawn that was deferred while the world was crowded.
    RetrySpawn { action: crate::command::OverlayAction },
}

// Min-heap: lowest (tick, sequence) fires first. BinaryHeap is a max-heap,
// so the ordering is reversed.
impl PartialEq for Timer {
    fn eq(&self, other: &Self) -> bool {
        self.tick == other.tick && self.sequence == other.sequence
    }
}

impl Eq for Timer {}

impl PartialOrd for Timer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timer {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .tick
            .cmp(&self.tick)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Priority queue of pending one-shot timers.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TimerQueue {
    heap: BinaryHeap<Timer>,
    next_sequence: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a timer at the given tick.
    pub fn schedule(&mut self, tick: u64, kind: TimerKind) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(Timer {
            tick,
            sequence,
            kind,
        });
    }

    /// Pop the next timer if it is due at or before `tick`.
    pub fn pop_due(&mut self, tick: u64) -> Option<Timer> {
        if self.heap.peek().is_some_and(|t| t.tick <= tick) {
            self.heap.pop()
        } else {
            None
        }
    }

    /// Drop all pending timers. Used on world reset so nothing fires into
    /// torn-down state.
    pub fn clear(&mut self) {
        self.heap.clear();
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Outward events
// ---------------------------------------------------------------------------

/// A notification emitted by the simulation during a tick.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OverlayEvent {
    pub tick: u64,
    pub kind: OverlayEventKind,
}

/// Notification payloads consumed by the external roster/store and UI.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum OverlayEventKind {
    /// A squid composite entered the world.
    CreatureSpawned { id: AvatarId },
    /// A logical entity no longer has any live bodies; the external store
    /// should delete its record. Emitted only by the roster reconciler.
    EntityRemoved { kind: EntityKind, id: u32 },
    /// The collision resolver spawned a splash at a contact point.
    SplashSpawned { position: Vec2 },
    /// An externally requested burst was materialized.
    BurstSpawned { kind: BurstKind, position: Vec2 },
    /// A spawn request was deferred because the world is crowded. Repeated
    /// deferrals are the operator's overcrowding signal.
    SpawnDeferred { retry_at_tick: u64 },
    /// The chat-window obstruction (and ceiling) were hidden.
    ObstructionHidden,
    /// The chat-window obstruction (and ceiling) were restored.
    ObstructionRestored,
    /// The gravity mode changed.
    GravityChanged { low_gravity: bool },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timers_fire_in_tick_then_sequence_order() {
        let mut queue = TimerQueue::new();
        queue.schedule(100, TimerKind::RestoreObstruction);
        queue.schedule(50, TimerKind::RestoreObstruction);
        queue.schedule(50, TimerKind::RestoreObstruction);

        let first = queue.pop_due(200).unwrap();
        assert_eq!((first.tick, first.sequence), (50, 1));
        let second = queue.pop_due(200).unwrap();
        assert_eq!((second.tick, second.sequence), (50, 2));
        let third = queue.pop_due(200).unwrap();
        assert_eq!(third.tick, 100);
        assert!(queue.pop_due(200).is_none());
    }

    #[test]
    fn pop_due_respects_tick() {
        let mut queue = TimerQueue::new();
        queue.schedule(100, TimerKind::RestoreObstruction);
        assert!(queue.pop_due(99).is_none());
        assert!(queue.pop_due(100).is_some());
    }

    #[test]
    fn clear_drops_everything() {
        let mut queue = TimerQueue::new();
        queue.schedule(1, TimerKind::RestoreObstruction);
        queue.schedule(2, TimerKind::RestoreObstruction);
        assert_eq!(queue.len(), 2);
        queue.clear();
        assert!(queue.is_empty());
        assert!(queue.pop_due(u64::MAX).is_none());
    }

    #[test]
    fn timer_queue_serialization() {
        let mut queue = TimerQueue::new();
        queue.schedule(10, TimerKind::RestoreObstruction);
        queue.schedule(20, TimerKind::RestoreObstruction);
        let json = serde_json::to_string(&queue).unwrap();
        let mut restored: TimerQueue = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.len(), 2);
        assert_eq!(restored.pop_due(100).unwrap().tick, 10);
    }
}
