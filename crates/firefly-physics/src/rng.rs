// ─────────────────────────────────────────────────────────────────────
// Firefly Sync — Seeded Randomness
// ─────────────────────────────────────────────────────────────────────
//! Deterministic ChaCha8 stream for start-up offsets and spawn
//! positions. A fixed seed reproduces the same population exactly.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use firefly_types::{Area, Position};

pub type SimRng = ChaCha8Rng;

pub fn seeded_rng(seed: u64) -> SimRng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Uniform offset in [0, base_interval_ms) added to the first fire timer.
pub fn initial_fire_offset(rng: &mut SimRng, base_interval_ms: f64) -> f64 {
    if base_interval_ms > 0.0 {
        rng.gen_range(0.0..base_interval_ms)
    } else {
        0.0
    }
}

/// Uniform point inside `area`. Caller checks `area.is_valid()`.
pub fn random_position(rng: &mut SimRng, area: &Area) -> Position {
    Position::new(
        rng.gen_range(area.min.x..area.max.x),
        rng.gen_range(area.min.y..area.max.y),
    )
}
