// ─────────────────────────────────────────────────────────────────────
// Firefly Sync — Pulse Oscillator
// ─────────────────────────────────────────────────────────────────────
//! Integrate-and-fire oscillator with energy-accelerated firing.
//!
//!   next_interval = T_base · f(E),   f: [1, E_max] → [1.0, 0.3] (linear)
//!
//! Firing resets E to 1.0, starts the pulse animation and opens the
//! refractory window. The refractory flag runs on its own timer and is
//! independent of the pulse animation.

use serde::{Deserialize, Serialize};

use firefly_types::{
    saturate, EnergyMode, GroupId, OscillatorId, OscillatorView, PhaseState, Position,
    PulseEvent, SimConfig,
};

/// Lower bound of the energy domain; also the post-fire reset value.
pub const BASE_ENERGY: f64 = 1.0;

/// Interval multiplier at maximum energy.
pub const MIN_INTERVAL_FACTOR: f64 = 0.3;

/// Slack for accumulated float error in pulse progress (10 × 0.1 < 1.0).
const PROGRESS_EPS: f64 = 1e-9;

/// Linear map of energy in [1, max] onto an interval multiplier in [1.0, 0.3].
///
/// Strictly decreasing in `energy` whenever `max_energy > 1`.
pub fn interval_multiplier(energy: f64, max_energy: f64) -> f64 {
    let span = max_energy - BASE_ENERGY;
    if span <= 0.0 {
        return 1.0;
    }
    let t = (energy - BASE_ENERGY) / span;
    let factor = 1.0 + t * (MIN_INTERVAL_FACTOR - 1.0);
    saturate("interval factor", factor, MIN_INTERVAL_FACTOR, 1.0)
}

/// Firing phase. Progress is only meaningful while pulsing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Phase {
    Idle,
    Pulsing { progress: f64 },
}

/// A single pulse-coupled oscillator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Oscillator {
    id: OscillatorId,
    position: Position,
    energy_level: f64,
    phase: Phase,
    refractory: bool,
    last_fire_ms: f64,
    group: Option<GroupId>,
}

impl Oscillator {
    /// Create an idle oscillator at baseline energy.
    ///
    /// `last_fire_ms` is normally `now + offset` so that a fresh
    /// population does not fire in lockstep.
    pub fn new(id: OscillatorId, position: Position, last_fire_ms: f64) -> Self {
        Self {
            id,
            position,
            energy_level: BASE_ENERGY,
            phase: Phase::Idle,
            refractory: false,
            last_fire_ms,
            group: None,
        }
    }

    pub fn id(&self) -> OscillatorId {
        self.id
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn energy_level(&self) -> f64 {
        self.energy_level
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_pulsing(&self) -> bool {
        matches!(self.phase, Phase::Pulsing { .. })
    }

    pub fn is_refractory(&self) -> bool {
        self.refractory
    }

    pub fn last_fire_ms(&self) -> f64 {
        self.last_fire_ms
    }

    pub fn group(&self) -> Option<GroupId> {
        self.group
    }

    pub fn set_group(&mut self, group: GroupId) {
        self.group = Some(group);
    }

    pub fn clear_group(&mut self) {
        self.group = None;
    }

    pub fn phase_state(&self) -> PhaseState {
        match self.phase {
            Phase::Pulsing { .. } => PhaseState::Pulsing,
            Phase::Idle if self.refractory => PhaseState::Refractory,
            Phase::Idle => PhaseState::Idle,
        }
    }

    pub fn pulse_progress(&self) -> f64 {
        match self.phase {
            Phase::Pulsing { progress } => progress,
            Phase::Idle => 0.0,
        }
    }

    /// Animation envelope sin(progress·π); 0 when idle.
    pub fn pulse_intensity(&self) -> f64 {
        match self.phase {
            Phase::Pulsing { progress } => (progress * std::f64::consts::PI).sin().max(0.0),
            Phase::Idle => 0.0,
        }
    }

    /// Energy mapped from [1, max] onto [0, 1].
    pub fn energy_fraction(&self, max_energy: f64) -> f64 {
        let span = max_energy - BASE_ENERGY;
        if span <= 0.0 {
            return 0.0;
        }
        saturate("energy fraction", (self.energy_level - BASE_ENERGY) / span, 0.0, 1.0)
    }

    /// Current firing interval given this oscillator's energy.
    pub fn next_interval_ms(&self, base_interval_ms: f64, max_energy: f64) -> f64 {
        base_interval_ms * interval_multiplier(self.energy_level, max_energy)
    }

    /// Clear the refractory flag once its window has elapsed.
    pub fn update_refractory(&mut self, now_ms: f64, refractory_period_ms: f64) {
        if self.refractory && now_ms - self.last_fire_ms > refractory_period_ms {
            self.refractory = false;
        }
    }

    /// True if idle and the energy-scaled interval has elapsed.
    pub fn is_due(&self, now_ms: f64, cfg: &SimConfig) -> bool {
        !self.is_pulsing()
            && now_ms - self.last_fire_ms
                > self.next_interval_ms(cfg.base_pulse_interval_ms, cfg.max_energy_level)
    }

    /// First half of a tick: refractory timer, pulse animation, and the
    /// firing decision. Returns whether this oscillator fires this tick.
    ///
    /// The decision reads only this oscillator's start-of-tick state, so
    /// calling it for the whole population before any `fire` keeps the
    /// tick order-independent.
    pub fn begin_tick(&mut self, now_ms: f64, cfg: &SimConfig) -> bool {
        self.update_refractory(now_ms, cfg.refractory_period_ms);
        if self.is_pulsing() {
            self.advance_pulse(cfg.pulse_increment);
            return false;
        }
        self.is_due(now_ms, cfg)
    }

    /// Advance the pulse animation; returns to idle at progress >= 1.
    pub fn advance_pulse(&mut self, increment: f64) {
        if let Phase::Pulsing { progress } = self.phase {
            let next = progress + increment;
            self.phase = if next >= 1.0 - PROGRESS_EPS {
                Phase::Idle
            } else {
                Phase::Pulsing { progress: next }
            };
        }
    }

    /// Enter `Pulsing`: full energy reset, refractory on, timer restarted.
    pub fn fire(&mut self, now_ms: f64) -> PulseEvent {
        self.phase = Phase::Pulsing { progress: 0.0 };
        self.last_fire_ms = now_ms;
        self.refractory = true;
        self.energy_level = BASE_ENERGY;
        PulseEvent {
            oscillator: self.id,
            timestamp_ms: now_ms,
            position: self.position,
        }
    }

    /// Apply an incoming transfer. Dropped while refractory.
    ///
    /// Returns `true` if the transfer was accepted.
    pub fn receive_energy(&mut self, amount: f64, mode: EnergyMode, max_energy: f64) -> bool {
        if self.refractory {
            return false;
        }
        let upper = max_energy.max(BASE_ENERGY);
        let next = self.energy_level + mode.sign() * amount;
        self.energy_level = saturate("energy level", next, BASE_ENERGY, upper);
        true
    }

    /// Move the fire timer forward by a suspended interval.
    pub fn shift_time(&mut self, gap_ms: f64) {
        self.last_fire_ms += gap_ms;
    }

    pub fn view(&self, max_energy: f64) -> OscillatorView {
        OscillatorView {
            id: self.id,
            position: self.position,
            energy_level: self.energy_level,
            energy_fraction: self.energy_fraction(max_energy),
            phase_state: self.phase_state(),
            refractory: self.refractory,
            pulse_progress: self.pulse_progress(),
            pulse_intensity: self.pulse_intensity(),
            group: self.group,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn osc() -> Oscillator {
        Oscillator::new(OscillatorId(1), Position::new(0.0, 0.0), 0.0)
    }

    #[test]
    fn test_multiplier_endpoints() {
        assert!((interval_multiplier(1.0, 3.0) - 1.0).abs() < 1e-9);
        assert!((interval_multiplier(3.0, 3.0) - 0.3).abs() < 1e-9);
        assert!((interval_multiplier(2.0, 3.0) - 0.65).abs() < 1e-9);
    }

    #[test]
    fn test_multiplier_degenerate_max() {
        assert_eq!(interval_multiplier(1.0, 1.0), 1.0);
    }

    #[test]
    fn test_interval_strictly_decreasing_in_energy() {
        let cfg = SimConfig::default();
        let mut prev = f64::INFINITY;
        for step in 0..=20 {
            let e = 1.0 + step as f64 * 0.1;
            let mut o = osc();
            o.energy_level = e;
            let interval = o.next_interval_ms(cfg.base_pulse_interval_ms, cfg.max_energy_level);
            assert!(interval < prev, "interval {interval} at E={e} not below {prev}");
            prev = interval;
        }
    }

    #[test]
    fn test_new_is_idle_at_baseline() {
        let o = osc();
        assert_eq!(o.energy_level(), 1.0);
        assert_eq!(o.phase_state(), PhaseState::Idle);
        assert!(!o.is_refractory());
        assert_eq!(o.group(), None);
    }

    #[test]
    fn test_fires_only_after_interval_exceeded() {
        let cfg = SimConfig::default();
        let mut o = osc();
        assert!(!o.begin_tick(1000.0, &cfg), "elapsed == interval must not fire");
        assert!(o.begin_tick(1000.5, &cfg));
    }

    #[test]
    fn test_fire_resets_state() {
        let mut o = osc();
        o.energy_level = 2.7;
        let ev = o.fire(1234.0);
        assert_eq!(ev.oscillator, OscillatorId(1));
        assert_eq!(ev.timestamp_ms, 1234.0);
        assert_eq!(o.energy_level(), 1.0);
        assert!(o.is_refractory());
        assert_eq!(o.pulse_progress(), 0.0);
        assert_eq!(o.phase_state(), PhaseState::Pulsing);
        assert_eq!(o.last_fire_ms(), 1234.0);
    }

    #[test]
    fn test_pulse_runs_ten_ticks_then_idle() {
        let cfg = SimConfig::default();
        let mut o = osc();
        o.fire(0.0);
        for i in 1..10 {
            o.begin_tick(i as f64, &cfg);
            assert!(o.is_pulsing(), "still pulsing after {i} ticks");
        }
        o.begin_tick(10.0, &cfg);
        assert!(!o.is_pulsing());
        assert_eq!(o.pulse_progress(), 0.0);
    }

    #[test]
    fn test_pulsing_oscillator_never_due() {
        let cfg = SimConfig::default();
        let mut o = osc();
        o.fire(0.0);
        assert!(!o.is_due(1_000_000.0, &cfg));
    }

    #[test]
    fn test_refractory_clears_on_own_timer() {
        let cfg = SimConfig::default();
        let mut o = osc();
        o.fire(0.0);
        o.update_refractory(200.0, cfg.refractory_period_ms);
        assert!(o.is_refractory());
        o.update_refractory(200.1, cfg.refractory_period_ms);
        assert!(!o.is_refractory());
    }

    #[test]
    fn test_phase_state_refractory_after_animation() {
        let cfg = SimConfig::default();
        let mut o = osc();
        o.fire(0.0);
        for i in 1..=10 {
            o.begin_tick(i as f64, &cfg);
        }
        assert_eq!(o.phase_state(), PhaseState::Refractory);
    }

    #[test]
    fn test_receive_energy_dropped_while_refractory() {
        let mut o = osc();
        o.fire(0.0);
        let before = o.energy_level();
        assert!(!o.receive_energy(0.3, EnergyMode::Increase, 3.0));
        assert_eq!(o.energy_level(), before);
    }

    #[test]
    fn test_receive_energy_clamped_both_modes() {
        let mut o = osc();
        for _ in 0..20 {
            o.receive_energy(0.3, EnergyMode::Increase, 3.0);
        }
        assert_eq!(o.energy_level(), 3.0);
        for _ in 0..20 {
            o.receive_energy(0.3, EnergyMode::Decrease, 3.0);
        }
        assert_eq!(o.energy_level(), 1.0);
    }

    #[test]
    fn test_pulse_intensity_envelope() {
        let mut o = osc();
        assert_eq!(o.pulse_intensity(), 0.0);
        o.fire(0.0);
        assert!(o.pulse_intensity().abs() < 1e-9);
        for _ in 0..5 {
            o.advance_pulse(0.1);
        }
        assert!((o.pulse_intensity() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_energy_fraction() {
        let mut o = osc();
        assert_eq!(o.energy_fraction(3.0), 0.0);
        o.receive_energy(1.0, EnergyMode::Increase, 3.0);
        assert!((o.energy_fraction(3.0) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_shift_time_moves_deadline() {
        let cfg = SimConfig::default();
        let mut o = osc();
        o.shift_time(5000.0);
        assert_eq!(o.last_fire_ms(), 5000.0);
        assert!(!o.is_due(5500.0, &cfg));
        assert!(o.is_due(6000.5, &cfg));
    }
}
