// The logical entity roster and its reconciler.
//
// Logical entities (avatars, splashes, fireworks) record the *intent* to
// exist: an entry is created when a spawn request arrives and must be
// deleted once its physics composite is gone. Destruction is asynchronous —
// collision, particle decay, and capacity eviction all remove bodies
// without consulting the roster — so the reconciler runs once per tick,
// after physics, and diffs the set of live body owners against the roster.
// Any spawned entity with no remaining bodies is removed and reported.
//
// The reconciler is the single point that converts "bodies gone" into
// "entity gone". It is idempotent: reported entries are removed from the
// roster, so an unchanged world produces no duplicate notifications.

use crate::types::{AvatarId, BodyOwner, EntityKind, FireworkId, SplashId, Vec2};
use crate::world::World;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A logical squid avatar, keyed by the external roster's id.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Avatar {
    pub id: AvatarId,
    pub name: String,
    /// False while the spawn is deferred; true once the composite exists.
    pub is_spawned: bool,
    /// Requested spawn position, if the caller supplied one.
    pub position: Option<Vec2>,
    /// Requested force multiplier, if the caller supplied one.
    pub force_multiplier: Option<f32>,
}

/// A logical burst effect (splash or firework).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BurstEntry {
    pub position: Vec2,
    pub is_spawned: bool,
}

/// All logical entities currently expected to exist.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Roster {
    pub avatars: BTreeMap<AvatarId, Avatar>,
    pub splashes: BTreeMap<SplashId, BurstEntry>,
    pub fireworks: BTreeMap<FireworkId, BurstEntry>,
    /// Allocator for internally created splashes (collision landings).
    next_splash_id: u32,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next internal splash id, skipping any ids an external
    /// burst request already claimed.
    pub fn alloc_splash_id(&mut self) -> SplashId {
        while self.splashes.contains_key(&SplashId(self.next_splash_id)) {
            self.next_splash_id += 1;
        }
        let id = SplashId(self.next_splash_id);
        self.next_splash_id += 1;
        id
    }

    /// Total logical entities of all kinds.
    pub fn len(&self) -> usize {
        self.avatars.len() + self.splashes.len() + self.fireworks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.avatars.clear();
        self.splashes.clear();
        self.fireworks.clear();
        self.next_splash_id = 0;
    }
}

/// An entity the reconciler found physically absent and removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Removal {
    pub kind: EntityKind,
    pub id: u32,
}

/// Diff the world's live body owners against the roster. Every spawned
/// entity with no remaining bodies is removed from the roster and
/// reported.
pub fn reconcile(roster: &mut Roster, world: &World) -> Vec<Removal> {
    let live: FxHashSet<BodyOwner> = world.bodies().map(|b| b.owner).collect();
    let mut removals = Vec::new();

    roster.avatars.retain(|&id, avatar| {
        let keep = !avatar.is_spawned || live.contains(&BodyOwner::Avatar(id));
        if !keep {
            removals.push(Removal {
                kind: EntityKind::Avatar,
                id: id.0,
            });
        }
        keep
    });
    roster.splashes.retain(|&id, entry| {
        let keep = !entry.is_spawned || live.contains(&BodyOwner::Splash(id));
        if !keep {
            removals.push(Removal {
                kind: EntityKind::Splash,
                id: id.0,
            });
        }
        keep
    });
    roster.fireworks.retain(|&id, entry| {
        let keep = !entry.is_spawned || live.contains(&BodyOwner::Firework(id));
        if !keep {
            removals.push(Removal {
                kind: EntityKind::Firework,
                id: id.0,
            });
        }
        keep
    });

    removals
}
