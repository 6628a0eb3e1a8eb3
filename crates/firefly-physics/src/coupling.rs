// ─────────────────────────────────────────────────────────────────────
// Firefly Sync — Coupling Field
// ─────────────────────────────────────────────────────────────────────
//! Stateless energy distribution from a firing oscillator to its
//! neighbours:
//!
//!   Δ(d) = boost · (1 - d / R)   for d < R,   0 otherwise
//!
//! Every pulse scans the whole population, so a tick is O(n²) in the
//! worst case. That is fine for tens of oscillators; larger populations
//! would need a spatial index.

use firefly_types::SimConfig;

use crate::oscillator::Oscillator;

/// Linear-falloff transfer: full `boost` at distance 0, zero at `radius`.
pub fn transfer_amount(distance: f64, radius: f64, boost: f64) -> f64 {
    if radius <= 0.0 || distance.is_nan() || distance >= radius {
        return 0.0;
    }
    boost * (1.0 - distance.max(0.0) / radius)
}

/// Deliver energy from `population[source]` to every other oscillator in
/// range, in population order. Returns how many accepted the transfer.
pub fn distribute(source: usize, population: &mut [Oscillator], cfg: &SimConfig) -> usize {
    let Some(origin) = population.get(source).map(Oscillator::position) else {
        return 0;
    };
    let mut accepted = 0;
    for (idx, other) in population.iter_mut().enumerate() {
        if idx == source {
            continue;
        }
        let d = origin.distance(&other.position());
        if d >= cfg.energy_radius {
            continue;
        }
        let amount = transfer_amount(d, cfg.energy_radius, cfg.energy_boost);
        if other.receive_energy(amount, cfg.energy_mode, cfg.max_energy_level) {
            accepted += 1;
        }
    }
    accepted
}
