// ─────────────────────────────────────────────────────────────────────
// Firefly Sync — Simulation Configuration
// ─────────────────────────────────────────────────────────────────────

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{FireflyError, FireflyResult};
use crate::state::{saturate, EnergyMode};

/// Inclusive range a tunable parameter saturates into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamRange {
    pub min: f64,
    pub max: f64,
}

impl ParamRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, quantity: &str, value: f64) -> f64 {
        saturate(quantity, value, self.min, self.max)
    }

    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Caller-supplied clamping ranges for runtime parameter updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamBounds {
    pub base_pulse_interval_ms: ParamRange,
    pub energy_radius: ParamRange,
    pub energy_boost: ParamRange,
    pub refractory_period_ms: ParamRange,
}

impl Default for ParamBounds {
    fn default() -> Self {
        Self {
            base_pulse_interval_ms: ParamRange::new(500.0, 5000.0),
            energy_radius: ParamRange::new(50.0, 1000.0),
            energy_boost: ParamRange::new(0.1, 1.0),
            refractory_period_ms: ParamRange::new(100.0, 2000.0),
        }
    }
}

impl ParamBounds {
    pub fn range(&self, param: Parameter) -> ParamRange {
        match param {
            Parameter::BasePulseInterval => self.base_pulse_interval_ms,
            Parameter::EnergyRadius => self.energy_radius,
            Parameter::EnergyBoost => self.energy_boost,
            Parameter::RefractoryPeriod => self.refractory_period_ms,
        }
    }
}

/// Synchrony tracker windows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Off reproduces the plain coupling demo: no log, no groups.
    pub enabled: bool,

    /// Pulses closer than this (absolute difference) cluster together.
    /// Default: 100 ms.
    pub sync_window_ms: f64,

    /// Pulse events older than this are dropped from the log.
    /// Default: 1000 ms.
    pub pulse_log_window_ms: f64,

    /// Groups idle for longer than this are retired.
    /// Default: 2000 ms.
    pub group_retention_ms: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sync_window_ms: 100.0,
            pulse_log_window_ms: 1000.0,
            group_retention_ms: 2000.0,
        }
    }
}

/// Runtime-tunable parameters addressable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    BasePulseInterval,
    EnergyRadius,
    EnergyBoost,
    RefractoryPeriod,
}

impl Parameter {
    pub const ALL: [Parameter; 4] = [
        Parameter::BasePulseInterval,
        Parameter::EnergyRadius,
        Parameter::EnergyBoost,
        Parameter::RefractoryPeriod,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Parameter::BasePulseInterval => "base_pulse_interval",
            Parameter::EnergyRadius => "energy_radius",
            Parameter::EnergyBoost => "energy_boost",
            Parameter::RefractoryPeriod => "refractory_period",
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Parameter {
    type Err = FireflyError;

    /// Accepts snake_case, kebab-case and camelCase spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "basepulseinterval" | "pulseinterval" => Ok(Parameter::BasePulseInterval),
            "energyradius" => Ok(Parameter::EnergyRadius),
            "energyboost" => Ok(Parameter::EnergyBoost),
            "refractoryperiod" => Ok(Parameter::RefractoryPeriod),
            _ => Err(FireflyError::UnknownParameter(s.to_string())),
        }
    }
}

/// Full simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Interval between pulses at baseline energy.
    /// Default: 1000 ms.
    pub base_pulse_interval_ms: f64,

    /// Neighbours beyond this distance receive nothing.
    /// Default: 350.
    pub energy_radius: f64,

    /// Energy delivered to a neighbour at distance 0.
    /// Default: 0.3.
    pub energy_boost: f64,

    /// Upper bound on energy; the lower bound is fixed at 1.0.
    /// Default: 3.0.
    pub max_energy_level: f64,

    /// Post-fire window during which incoming energy is dropped.
    /// Default: 200 ms.
    pub refractory_period_ms: f64,

    /// Pulse animation progress per tick.
    /// Default: 0.1.
    pub pulse_increment: f64,

    pub energy_mode: EnergyMode,

    pub bounds: ParamBounds,

    pub tracker: TrackerConfig,

    /// Seed for initial fire offsets and `populate` positions.
    pub seed: u64,

    /// A tick arriving later than this after the previous one is treated
    /// as a suspend/resume. `None` disables detection.
    /// Default: 1000 ms.
    pub max_tick_gap_ms: Option<f64>,

    /// Frame time assumed to have elapsed across a detected gap.
    /// Default: 16 ms.
    pub nominal_tick_ms: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            base_pulse_interval_ms: 1000.0,
            energy_radius: 350.0,
            energy_boost: 0.3,
            max_energy_level: 3.0,
            refractory_period_ms: 200.0,
            pulse_increment: 0.1,
            energy_mode: EnergyMode::Increase,
            bounds: ParamBounds::default(),
            tracker: TrackerConfig::default(),
            seed: 42,
            max_tick_gap_ms: Some(1000.0),
            nominal_tick_ms: 16.0,
        }
    }
}

impl SimConfig {
    pub fn get(&self, param: Parameter) -> f64 {
        match param {
            Parameter::BasePulseInterval => self.base_pulse_interval_ms,
            Parameter::EnergyRadius => self.energy_radius,
            Parameter::EnergyBoost => self.energy_boost,
            Parameter::RefractoryPeriod => self.refractory_period_ms,
        }
    }

    /// Saturate `value` into the configured bounds and store it.
    /// Returns the applied value.
    pub fn set_clamped(&mut self, param: Parameter, value: f64) -> f64 {
        let applied = self.bounds.range(param).clamp(param.name(), value);
        match param {
            Parameter::BasePulseInterval => self.base_pulse_interval_ms = applied,
            Parameter::EnergyRadius => self.energy_radius = applied,
            Parameter::EnergyBoost => self.energy_boost = applied,
            Parameter::RefractoryPeriod => self.refractory_period_ms = applied,
        }
        applied
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> FireflyResult<()> {
        let scalars = [
            ("base_pulse_interval_ms", self.base_pulse_interval_ms),
            ("energy_radius", self.energy_radius),
            ("energy_boost", self.energy_boost),
            ("max_energy_level", self.max_energy_level),
            ("refractory_period_ms", self.refractory_period_ms),
            ("pulse_increment", self.pulse_increment),
            ("nominal_tick_ms", self.nominal_tick_ms),
            ("tracker.sync_window_ms", self.tracker.sync_window_ms),
            ("tracker.pulse_log_window_ms", self.tracker.pulse_log_window_ms),
            ("tracker.group_retention_ms", self.tracker.group_retention_ms),
        ];
        for (name, value) in scalars {
            if !value.is_finite() {
                return Err(FireflyError::Numerical(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }
        if self.max_energy_level < 1.0 {
            return Err(FireflyError::Config(format!(
                "max_energy_level must be >= 1.0, got {}",
                self.max_energy_level
            )));
        }
        if self.pulse_increment <= 0.0 || self.pulse_increment > 1.0 {
            return Err(FireflyError::Config(format!(
                "pulse_increment must be in (0, 1], got {}",
                self.pulse_increment
            )));
        }
        if self.nominal_tick_ms < 0.0 {
            return Err(FireflyError::Config(format!(
                "nominal_tick_ms must be >= 0, got {}",
                self.nominal_tick_ms
            )));
        }
        for param in Parameter::ALL {
            let range = self.bounds.range(param);
            if !range.min.is_finite() || !range.max.is_finite() || range.min > range.max {
                return Err(FireflyError::Config(format!(
                    "bounds for {param} are invalid: [{}, {}]",
                    range.min, range.max
                )));
            }
            if !range.contains(self.get(param)) {
                return Err(FireflyError::Config(format!(
                    "{param} = {} lies outside its bounds [{}, {}]",
                    self.get(param),
                    range.min,
                    range.max
                )));
            }
        }
        if self.tracker.sync_window_ms < 0.0 {
            return Err(FireflyError::Config(format!(
                "tracker.sync_window_ms must be >= 0, got {}",
                self.tracker.sync_window_ms
            )));
        }
        if self.tracker.pulse_log_window_ms <= 0.0 || self.tracker.group_retention_ms <= 0.0 {
            return Err(FireflyError::Config(
                "tracker retention windows must be > 0".to_string(),
            ));
        }
        if let Some(gap) = self.max_tick_gap_ms {
            if !gap.is_finite() || gap <= 0.0 {
                return Err(FireflyError::Config(format!(
                    "max_tick_gap_ms must be > 0, got {gap}"
                )));
            }
        }
        Ok(())
    }

    /// Load from JSON string.
    pub fn from_json(json: &str) -> FireflyResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| FireflyError::Config(format!("JSON parse error: {e}")))
    }
}
