// ─────────────────────────────────────────────────────────────────────
// Firefly Sync — Oscillator Physics
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Pulse-coupled oscillator physics: the per-ball firing state machine,
//! the distance-weighted coupling field, and seeded randomness for
//! staggered start-up.

pub mod coupling;
pub mod oscillator;
pub mod rng;

pub use coupling::{distribute, transfer_amount};
pub use oscillator::{interval_multiplier, Oscillator, Phase, BASE_ENERGY};
pub use rng::{initial_fire_offset, random_position, seeded_rng, SimRng};
