// tidepool_sim — pure Rust stream-overlay simulation library.
//
// This crate contains all simulation logic for Tidepool: the 2D physics
// world, squid composites, burst effects, capacity enforcement, and the
// command interface. It has zero rendering dependencies and can be tested,
// benchmarked, and run headless — the overlay renderer and the viewer-event
// integration live in a separate host process that drives `tick()` at 60 Hz.
//
// Module overview:
// - `sim.rs`:       Top-level OverlaySim, tick pipeline, command/timer handling.
// - `world.rs`:     Bodies, spring constraints, static fixtures, the physics step.
// - `spawn.rs`:     Squid composite assembly, splash and firework bursts.
// - `collision.rs`: Floor-contact resolution — grounded squids are destroyed.
// - `capacity.rs`:  Hard body-ceiling enforcement (particles first, then squids).
// - `roster.rs`:    Logical entity roster + per-tick reconciliation against bodies.
// - `command.rs`:   OverlayCommand / OverlayAction — all sim mutations.
// - `event.rs`:     TimerQueue (one-shot timers) + outward OverlayEvents.
// - `config.rs`:    OverlayConfig — all tunable parameters, nested per concern.
// - `rng.rs`:       xoshiro256++ PRNG with SplitMix64 seeding.
// - `types.rs`:     Vec2, entity ids, body ownership, colors, interop labels.
//
// **Critical constraint: determinism.** The simulation is a pure function:
// `(state, commands) -> (new_state, events)`. All randomness comes from the
// seeded PRNG. No `HashMap` iteration order leaks into results, no system
// time, no OS entropy. Use `BTreeMap` for ordered collections.

pub mod capacity;
pub mod collision;
pub mod command;
pub mod config;
pub mod event;
pub mod rng;
pub mod roster;
pub mod sim;
pub mod spawn;
pub mod types;
pub mod world;
