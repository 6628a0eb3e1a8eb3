// ─────────────────────────────────────────────────────────────────────
// Firefly Sync — Synchrony Observers
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Synchrony observers: a time-bounded pulse log and the tracker that
//! clusters near-simultaneous pulses into transient groups.
//!
//! - PulseLog: insertion-ordered ring of recent pulse events
//! - SynchronyTracker: greedy temporal clustering + group registry

pub mod pulse_log;
pub mod synchrony;

pub use pulse_log::PulseLog;
pub use synchrony::{SyncGroup, SynchronyTracker, TrackerUpdate};
