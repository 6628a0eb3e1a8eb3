// ─────────────────────────────────────────────────────────────────────
// Firefly Sync — State Types
// ─────────────────────────────────────────────────────────────────────
//! Identifiers, geometry, pulse events, and the render-facing snapshot
//! the core exposes once per tick.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::SimConfig;

/// Saturate `quantity` into [lo, hi].
///
/// Non-finite input never reaches the simulation: NaN holds at `lo`,
/// an infinity lands on the bound it points at.
#[inline]
pub fn saturate(quantity: &str, value: f64, lo: f64, hi: f64) -> f64 {
    if value.is_finite() {
        return value.clamp(lo, hi);
    }
    let bound = if value == f64::INFINITY { hi } else { lo };
    log::warn!("{quantity} is {value}, holding at {bound}");
    bound
}

/// Stable oscillator identity. Monotonic, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OscillatorId(pub u64);

impl fmt::Display for OscillatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "osc#{}", self.0)
    }
}

/// Synchrony group identity. Monotonic, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupId(pub u64);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "group#{}", self.0)
    }
}

/// 2D point. Only the coupling field looks at it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance.
    pub fn distance(&self, other: &Position) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Axis-aligned spawn area, `min` inclusive, `max` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub min: Position,
    pub max: Position,
}

impl Area {
    pub fn new(min: Position, max: Position) -> Self {
        Self { min, max }
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// True if the area has positive, finite extent on both axes.
    pub fn is_valid(&self) -> bool {
        let (w, h) = (self.width(), self.height());
        w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0
    }
}

/// Externally visible phase of an oscillator.
///
/// `Refractory` is reported only when the pulse animation has finished
/// but the refractory timer is still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseState {
    Idle,
    Pulsing,
    Refractory,
}

/// Direction in which received energy moves the level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyMode {
    /// Neighbour pulses speed an oscillator up.
    #[default]
    Increase,
    /// Neighbour pulses slow an oscillator down.
    Decrease,
}

impl EnergyMode {
    /// Sign applied to incoming transfers.
    pub fn sign(self) -> f64 {
        match self {
            EnergyMode::Increase => 1.0,
            EnergyMode::Decrease => -1.0,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            EnergyMode::Increase => EnergyMode::Decrease,
            EnergyMode::Decrease => EnergyMode::Increase,
        }
    }
}

/// One oscillator firing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PulseEvent {
    pub oscillator: OscillatorId,
    /// Tick time at which the pulse started (ms).
    pub timestamp_ms: f64,
    pub position: Position,
}

/// Per-oscillator state exposed to a rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OscillatorView {
    pub id: OscillatorId,
    pub position: Position,
    pub energy_level: f64,
    /// Energy mapped from [1, max] onto [0, 1].
    pub energy_fraction: f64,
    pub phase_state: PhaseState,
    pub refractory: bool,
    pub pulse_progress: f64,
    /// sin(progress·π) while pulsing, 0 otherwise.
    pub pulse_intensity: f64,
    pub group: Option<GroupId>,
}

/// Everything the rendering layer needs for one frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimSnapshot {
    pub time_ms: f64,
    pub oscillators: Vec<OscillatorView>,
    pub total_pulse_count: u64,
    pub active_group_count: usize,
    pub params: SimConfig,
}

impl SimSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
