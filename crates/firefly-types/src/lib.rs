// ─────────────────────────────────────────────────────────────────────
// Firefly Sync — Core Types
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Type definitions, configuration, and error hierarchy for the
//! Firefly Sync pulse-coupled oscillator core.

pub mod config;
pub mod error;
pub mod state;

pub use config::{Parameter, ParamBounds, ParamRange, SimConfig, TrackerConfig};
pub use error::{FireflyError, FireflyResult};
pub use state::{
    saturate, Area, EnergyMode, GroupId, OscillatorId, OscillatorView, PhaseState, Position,
    PulseEvent, SimSnapshot,
};
