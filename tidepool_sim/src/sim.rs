// The top-level simulation context and its tick pipeline.
//
// `OverlaySim` owns everything: the physics world, the logical roster, the
// timer queue, the PRNG, and the config. It is driven synchronously as
// `(state, commands) -> (new state, events)` — one `tick()` call advances
// exactly one fixed timestep and returns the notifications the overlay UI
// and the external store consume.
//
// Stage order within a tick is fixed and load-bearing:
//   1. apply this tick's commands
//   2. fire due timers (deferred spawns, obstruction restoration)
//   3. step physics, collecting floor contacts
//   4. resolve contacts: destroy grounded squids, spawn landing splashes
//   5. advance particle decay
//   6. enforce the hard body ceiling
//   7. reconcile the roster against surviving bodies
// Reconciliation runs last so that an entity destroyed by any of the
// earlier stages is reported as removed within the same tick.

use crate::capacity;
use crate::collision;
use crate::command::{BurstKind, OverlayAction, OverlayCommand};
use crate::config::OverlayConfig;
use crate::event::{OverlayEvent, OverlayEventKind, TimerKind, TimerQueue};
use crate::rng::OverlayRng;
use crate::roster::{self, Avatar, BurstEntry, Roster};
use crate::spawn::{self, LaunchSpec};
use crate::types::{BodyOwner, FireworkId, GravityMode, SplashId};
use crate::world::World;
use serde::{Deserialize, Serialize};

/// The complete simulation state. Serializable as a whole for save/load.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OverlaySim {
    /// Ticks completed since construction (or the last reset).
    pub tick: u64,
    pub config: OverlayConfig,
    pub rng: OverlayRng,
    pub world: World,
    pub roster: Roster,
    pub timers: TimerQueue,
    pub gravity_mode: GravityMode,
    /// The tick at which the armed obstruction restoration fires. A
    /// repeated toggle overwrites this; timers scheduled for any other
    /// tick are stale and dropped when they fire.
    restore_due: Option<u64>,
    /// Running count of deferred spawns, the operator's overcrowding
    /// signal.
    pub deferred_spawn_total: u64,
}

/// Output of one `tick()` call.
#[derive(Clone, Debug, Default)]
pub struct TickResult {
    pub events: Vec<OverlayEvent>,
}

impl OverlaySim {
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, OverlayConfig::default())
    }

    pub fn with_config(seed: u64, config: OverlayConfig) -> Self {
        let world = World::new(&config.arena);
        Self {
            tick: 0,
            config,
            rng: OverlayRng::new(seed),
            world,
            roster: Roster::new(),
            timers: TimerQueue::new(),
            gravity_mode: GravityMode::default(),
            restore_due: None,
            deferred_spawn_total: 0,
        }
    }

    /// Downward acceleration for the current gravity mode.
    pub fn gravity(&self) -> f32 {
        let scale = match self.gravity_mode {
            GravityMode::Normal => self.config.arena.gravity_scale_normal,
            GravityMode::Low => self.config.arena.gravity_scale_low,
        };
        self.config.arena.gravity * scale
    }

    /// Advance the simulation by one fixed timestep.
    pub fn tick(&mut self, commands: &[OverlayCommand]) -> TickResult {
        self.tick += 1;
        let mut events = Vec::new();

        // 1. Commands, in arrival order.
        for command in commands {
            self.apply_action(command.action.clone(), &mut events);
        }

        // 2. Due timers, in (tick, sequence) order.
        while let Some(timer) = self.timers.pop_due(self.tick) {
            match timer.kind {
                TimerKind::RestoreObstruction => {
                    // Only the currently armed deadline restores; a timer
                    // left over from an earlier toggle is stale.
                    if self.restore_due == Some(timer.tick) && !self.world.obstruction_visible() {
                        self.world.restore_obstruction(&self.config.arena);
                        self.restore_due = None;
                        self.emit(&mut events, OverlayEventKind::ObstructionRestored);
                    }
                }
                TimerKind::RetrySpawn { action } => {
                    self.apply_action(action, &mut events);
                }
            }
        }

        // 3. Physics. Floor overlaps come back as contacts.
        let contacts = self.world.step(self.config.timing.dt(), self.gravity());

        // 4. Grounded squids become splashes at the contact point.
        let resolved = collision::resolve(&mut self.world, &contacts);
        for grounded in &resolved.grounded {
            let splash_id = self.roster.alloc_splash_id();
            self.roster.splashes.insert(
                splash_id,
                BurstEntry {
                    position: grounded.point,
                    is_spawned: true,
                },
            );
            spawn::spawn_splash(
                &mut self.world,
                &mut self.rng,
                &self.config.splash,
                splash_id,
                grounded.point,
            );
            self.emit(
                &mut events,
                OverlayEventKind::SplashSpawned {
                    position: grounded.point,
                },
            );
        }

        // 5. Fade fireworks, expire sunken splash particles.
        self.world.advance_decay();

        // 6. Hard ceiling.
        capacity::enforce(
            &mut self.world,
            &self.config.capacity,
            self.config.squid.body_count(),
        );

        // 7. Roster diff: anything spawned but bodiless is gone.
        for removal in roster::reconcile(&mut self.roster, &self.world) {
            self.emit(
                &mut events,
                OverlayEventKind::EntityRemoved {
                    kind: removal.kind,
                    id: removal.id,
                },
            );
        }

        TickResult { events }
    }

    /// Tear everything down to a fresh arena. The config, seed state, and
    /// deferral counter survive; bodies, roster entries, and pending
    /// timers do not.
    pub fn reset(&mut self) {
        self.tick = 0;
        self.world.reset(&self.config.arena);
        self.roster.clear();
        self.timers.clear();
        self.restore_due = None;
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    // -----------------------------------------------------------------------
    // Command handling
    // -----------------------------------------------------------------------

    fn apply_action(&mut self, action: OverlayAction, events: &mut Vec<OverlayEvent>) {
        match action {
            OverlayAction::SpawnCreature { .. } | OverlayAction::SpawnBurst { .. } => {
                if self.world.body_count() > self.config.capacity.soft_spawn_threshold {
                    self.defer_spawn(action, events);
                } else {
                    self.materialize_spawn(action, events);
                }
            }
            OverlayAction::ToggleObstruction => {
                if self.world.obstruction_visible() {
                    self.world.hide_obstruction();
                    self.emit(events, OverlayEventKind::ObstructionHidden);
                }
                // Re-arm even if already hidden: the restore window restarts
                // from this toggle. The previously scheduled timer goes
                // stale.
                let due = self.tick + self.config.timing.obstruction_hide_ticks;
                self.restore_due = Some(due);
                self.timers.schedule(due, TimerKind::RestoreObstruction);
            }
            OverlayAction::SetGravityMode { low_gravity } => {
                self.gravity_mode = if low_gravity {
                    GravityMode::Low
                } else {
                    GravityMode::Normal
                };
                self.emit(events, OverlayEventKind::GravityChanged { low_gravity });
            }
        }
    }

    /// Record the intent in the roster and schedule a retry. The entity is
    /// visible to the external store immediately even though no bodies
    /// exist yet.
    fn defer_spawn(&mut self, action: OverlayAction, events: &mut Vec<OverlayEvent>) {
        match &action {
            OverlayAction::SpawnCreature {
                id,
                name,
                position,
                force_multiplier,
                ..
            } => {
                self.roster.avatars.entry(*id).or_insert_with(|| Avatar {
                    id: *id,
                    name: name.clone(),
                    is_spawned: false,
                    position: *position,
                    force_multiplier: (*force_multiplier > 0.0).then_some(*force_multiplier),
                });
            }
            OverlayAction::SpawnBurst { kind, id, position } => {
                let entry = BurstEntry {
                    position: *position,
                    is_spawned: false,
                };
                match kind {
                    BurstKind::Splash => {
                        self.roster.splashes.entry(SplashId(*id)).or_insert(entry);
                    }
                    BurstKind::Firework => {
                        self.roster.fireworks.entry(FireworkId(*id)).or_insert(entry);
                    }
                }
            }
            _ => return,
        }
        let retry_at_tick = self.tick + self.config.timing.spawn_retry_ticks;
        self.timers
            .schedule(retry_at_tick, TimerKind::RetrySpawn { action });
        self.deferred_spawn_total += 1;
        self.emit(events, OverlayEventKind::SpawnDeferred { retry_at_tick });
    }

    fn materialize_spawn(&mut self, action: OverlayAction, events: &mut Vec<OverlayEvent>) {
        match action {
            OverlayAction::SpawnCreature {
                id,
                name,
                position,
                force,
                force_multiplier,
                torque,
            } => {
                // At most one live composite per avatar id.
                if self.world.owner_alive(BodyOwner::Avatar(id)) {
                    return;
                }
                spawn::spawn_squid(
                    &mut self.world,
                    &mut self.rng,
                    &self.config.squid,
                    self.config.arena.width,
                    self.config.arena.height,
                    id,
                    LaunchSpec {
                        position,
                        force,
                        force_multiplier,
                        torque,
                    },
                );
                self.roster.avatars.insert(
                    id,
                    Avatar {
                        id,
                        name,
                        is_spawned: true,
                        position,
                        force_multiplier: (force_multiplier > 0.0).then_some(force_multiplier),
                    },
                );
                self.emit(events, OverlayEventKind::CreatureSpawned { id });
            }
            OverlayAction::SpawnBurst { kind, id, position } => {
                let entry = BurstEntry {
                    position,
                    is_spawned: true,
                };
                match kind {
                    BurstKind::Splash => {
                        let id = SplashId(id);
                        if self.world.owner_alive(BodyOwner::Splash(id)) {
                            return;
                        }
                        self.roster.splashes.insert(id, entry);
                        spawn::spawn_splash(
                            &mut self.world,
                            &mut self.rng,
                            &self.config.splash,
                            id,
                            position,
                        );
                    }
                    BurstKind::Firework => {
                        let id = FireworkId(id);
                        if self.world.owner_alive(BodyOwner::Firework(id)) {
                            return;
                        }
                        self.roster.fireworks.insert(id, entry);
                        spawn::spawn_firework(
                            &mut self.world,
                            &mut self.rng,
                            &self.config.firework,
                            id,
                            position,
                        );
                    }
                }
                self.emit(events, OverlayEventKind::BurstSpawned { kind, position });
            }
            _ => {}
        }
    }

    fn emit(&self, events: &mut Vec<OverlayEvent>, kind: OverlayEventKind) {
        events.push(OverlayEvent {
            tick: self.tick,
            kind,
        });
    }
}
