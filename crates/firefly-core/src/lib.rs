// ─────────────────────────────────────────────────────────────────────
// Firefly Sync — Simulation Core
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Driver-owned simulation state for pulse-coupled oscillators.
//!
//! A rendering/input layer owns one [`Simulation`], feeds it one time
//! reading per frame via [`Simulation::tick`], forwards spawn/clear and
//! parameter commands, and draws from [`Simulation::snapshot`].
//!
//! # Tick Invariants
//!
//! 1. **Energy stays bounded**: every oscillator satisfies
//!    `1.0 <= energy <= max_energy_level` after every command and tick.
//!    Transfers saturate rather than overflow.
//!
//! 2. **Refractory oscillators are deaf**: an incoming transfer never
//!    changes the energy of a refractory oscillator.
//!
//! 3. **Decisions use start-of-tick state**: every firing decision is
//!    taken before any oscillator fires or distributes energy, and all
//!    work runs in population order. A fixed seed and tick sequence
//!    replays identically.
//!
//! 4. **Suspension is invisible**: time spent paused (explicitly or via
//!    a detected jump) shifts every stored timestamp forward, so resuming
//!    never triggers a burst of overdue pulses.

pub mod clock;
pub mod simulation;

pub use clock::TickClock;
pub use simulation::{Simulation, TickReport};

pub use firefly_observers::{SyncGroup, TrackerUpdate};
pub use firefly_physics::Oscillator;
pub use firefly_types::{
    Area, EnergyMode, FireflyError, FireflyResult, GroupId, OscillatorId, OscillatorView,
    Parameter, PhaseState, Position, PulseEvent, SimConfig, SimSnapshot,
};
