// ─────────────────────────────────────────────────────────────────────
// Firefly Sync — Simulation
// ─────────────────────────────────────────────────────────────────────
//! Explicit simulation state replacing a global ball list.
//!
//! One tick:
//!   1. Gap correction (explicit pause handled by `resume`)
//!   2. Every oscillator: refractory timer, pulse animation, due check
//!   3. Due oscillators fire in population order
//!   4. Each firer distributes energy in population order
//!   5. Synchrony tracker pass over the pulse log

use serde::{Deserialize, Serialize};

use firefly_observers::{SyncGroup, SynchronyTracker, TrackerUpdate};
use firefly_physics::{
    distribute, initial_fire_offset, random_position, seeded_rng, Oscillator, SimRng,
};
use firefly_types::{
    Area, EnergyMode, FireflyError, FireflyResult, OscillatorId, Parameter, Position, PulseEvent,
    SimConfig, SimSnapshot,
};

use crate::clock::TickClock;

/// Outcome of one tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    pub time_ms: f64,
    /// Pulses started this tick, in population order.
    pub fired: Vec<PulseEvent>,
    /// Transfers accepted by non-refractory neighbours.
    pub energy_transfers: usize,
    pub tracker: TrackerUpdate,
    /// Time shifted out because the tick arrived after a jump.
    pub gap_corrected_ms: f64,
}

/// Owned oscillator population plus everything a tick touches.
pub struct Simulation {
    cfg: SimConfig,
    population: Vec<Oscillator>,
    tracker: SynchronyTracker,
    rng: SimRng,
    clock: TickClock,
    next_oscillator_id: u64,
    total_pulse_count: u64,
}

impl Simulation {
    pub fn new(config: SimConfig) -> FireflyResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    /// Default parameters, seed 42.
    pub fn default_params() -> Self {
        Self::build(SimConfig::default())
    }

    fn build(config: SimConfig) -> Self {
        Self {
            tracker: SynchronyTracker::new(config.tracker.clone()),
            rng: seeded_rng(config.seed),
            cfg: config,
            population: Vec::new(),
            clock: TickClock::new(),
            next_oscillator_id: 1,
            total_pulse_count: 0,
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.cfg
    }

    // ── Commands ────────────────────────────────────────────────────

    /// Add one oscillator. Its first pulse is staggered by a seeded
    /// offset in [0, base interval).
    ///
    /// While paused the timer is anchored at the pause start, so `resume`
    /// shifting it by the full pause leaves the deadline where it would
    /// have been without the pause.
    pub fn spawn(&mut self, position: Position, now_ms: f64) -> OscillatorId {
        let id = OscillatorId(self.next_oscillator_id);
        self.next_oscillator_id += 1;
        let anchor = self.clock.paused_at_ms().unwrap_or(now_ms);
        let offset = initial_fire_offset(&mut self.rng, self.cfg.base_pulse_interval_ms);
        self.population.push(Oscillator::new(id, position, anchor + offset));
        id
    }

    /// Spawn `count` oscillators at seeded-random points inside `area`.
    pub fn populate(
        &mut self,
        count: usize,
        area: Area,
        now_ms: f64,
    ) -> FireflyResult<Vec<OscillatorId>> {
        if !area.is_valid() {
            return Err(FireflyError::Validation(format!(
                "spawn area must have positive extent, got {}x{}",
                area.width(),
                area.height()
            )));
        }
        let ids = (0..count)
            .map(|_| {
                let position = random_position(&mut self.rng, &area);
                self.spawn(position, now_ms)
            })
            .collect();
        Ok(ids)
    }

    /// Remove every oscillator, pulse event and group; zero the counters.
    pub fn clear(&mut self) {
        self.population.clear();
        self.tracker.clear();
        self.clock.reset();
        self.total_pulse_count = 0;
        log::info!("Simulation cleared");
    }

    /// Saturate `value` into the configured bounds and apply it.
    /// Returns the value actually applied.
    pub fn set_parameter(&mut self, param: Parameter, value: f64) -> f64 {
        let applied = self.cfg.set_clamped(param, value);
        log::debug!("{param} set to {applied} (requested {value})");
        applied
    }

    /// `set_parameter` addressed by name.
    pub fn set_parameter_by_name(&mut self, name: &str, value: f64) -> FireflyResult<f64> {
        let param: Parameter = name.parse()?;
        Ok(self.set_parameter(param, value))
    }

    /// Step a parameter by `delta`, saturating at its bounds.
    pub fn adjust_parameter(&mut self, param: Parameter, delta: f64) -> f64 {
        let current = self.cfg.get(param);
        self.set_parameter(param, current + delta)
    }

    pub fn energy_mode(&self) -> EnergyMode {
        self.cfg.energy_mode
    }

    pub fn set_energy_mode(&mut self, mode: EnergyMode) {
        self.cfg.energy_mode = mode;
    }

    pub fn toggle_energy_mode(&mut self) -> EnergyMode {
        self.cfg.energy_mode = self.cfg.energy_mode.toggled();
        self.cfg.energy_mode
    }

    // ── Time ────────────────────────────────────────────────────────

    pub fn pause(&mut self, now_ms: f64) {
        if self.clock.pause(now_ms) {
            log::info!("Simulation paused at {now_ms:.1}ms");
        }
    }

    /// End a pause, shifting all stored timestamps by its length.
    /// Returns the shift applied (0 if not paused).
    pub fn resume(&mut self, now_ms: f64) -> f64 {
        let Some(gap) = self.clock.resume(now_ms) else {
            return 0.0;
        };
        self.shift_time(gap);
        log::info!("Simulation resumed after {gap:.1}ms pause");
        gap
    }

    pub fn is_paused(&self) -> bool {
        self.clock.is_paused()
    }

    /// Move every fire timer, group timestamp and logged pulse forward.
    pub fn shift_time(&mut self, gap_ms: f64) {
        for osc in self.population.iter_mut() {
            osc.shift_time(gap_ms);
        }
        self.tracker.shift_time(gap_ms);
        self.clock.shift(gap_ms);
    }

    /// Advance the whole population to `now_ms`.
    pub fn tick(&mut self, now_ms: f64) -> TickReport {
        let mut report = TickReport {
            time_ms: now_ms,
            ..Default::default()
        };
        if self.clock.is_paused() {
            return report;
        }

        if let Some(gap) = self
            .clock
            .detect_gap(now_ms, self.cfg.max_tick_gap_ms, self.cfg.nominal_tick_ms)
        {
            log::warn!("Tick arrived after a {gap:.1}ms jump; shifting timers");
            self.shift_time(gap);
            report.gap_corrected_ms = gap;
        }
        self.clock.record_tick(now_ms);

        let cfg = &self.cfg;
        let firing: Vec<usize> = self
            .population
            .iter_mut()
            .enumerate()
            .filter_map(|(i, osc)| osc.begin_tick(now_ms, cfg).then_some(i))
            .collect();

        for &i in &firing {
            let event = self.population[i].fire(now_ms);
            self.tracker.record(event);
            report.fired.push(event);
        }
        self.total_pulse_count += firing.len() as u64;

        for &i in &firing {
            report.energy_transfers += distribute(i, &mut self.population, &self.cfg);
        }

        report.tracker = self.tracker.update(now_ms, &mut self.population);
        report
    }

    // ── State ───────────────────────────────────────────────────────

    pub fn snapshot(&self) -> SimSnapshot {
        SimSnapshot {
            time_ms: self.clock.last_tick_ms().unwrap_or(0.0),
            oscillators: self
                .population
                .iter()
                .map(|o| o.view(self.cfg.max_energy_level))
                .collect(),
            total_pulse_count: self.total_pulse_count,
            active_group_count: self.tracker.active_group_count(),
            params: self.cfg.clone(),
        }
    }

    pub fn oscillators(&self) -> &[Oscillator] {
        &self.population
    }

    pub fn oscillator(&self, id: OscillatorId) -> Option<&Oscillator> {
        self.population.iter().find(|o| o.id() == id)
    }

    pub fn groups(&self) -> impl Iterator<Item = &SyncGroup> {
        self.tracker.groups()
    }

    pub fn total_pulse_count(&self) -> u64 {
        self.total_pulse_count
    }

    pub fn active_group_count(&self) -> usize {
        self.tracker.active_group_count()
    }

    pub fn len(&self) -> usize {
        self.population.len()
    }

    pub fn is_empty(&self) -> bool {
        self.population.is_empty()
    }
}
