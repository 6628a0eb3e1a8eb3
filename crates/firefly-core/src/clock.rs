// ─────────────────────────────────────────────────────────────────────
// Firefly Sync — Tick Clock
// ─────────────────────────────────────────────────────────────────────
//! Bookkeeping for the driver-supplied time stream: last tick seen,
//! explicit pause/resume, and detection of discontinuous jumps.
//!
//! The clock never reads wall time itself. Every reading comes in
//! through `tick`/`pause`/`resume`.

#[derive(Debug, Clone, Default)]
pub struct TickClock {
    last_tick_ms: Option<f64>,
    paused_at_ms: Option<f64>,
}

impl TickClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_tick_ms(&self) -> Option<f64> {
        self.last_tick_ms
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at_ms.is_some()
    }

    pub fn paused_at_ms(&self) -> Option<f64> {
        self.paused_at_ms
    }

    /// Start a pause. Returns `false` if already paused.
    pub fn pause(&mut self, now_ms: f64) -> bool {
        if self.paused_at_ms.is_some() {
            return false;
        }
        self.paused_at_ms = Some(now_ms);
        true
    }

    /// End a pause and return its length. `None` if not paused.
    pub fn resume(&mut self, now_ms: f64) -> Option<f64> {
        let started = self.paused_at_ms.take()?;
        Some((now_ms - started).max(0.0))
    }

    /// Excess over one nominal frame if `now_ms` arrives more than
    /// `max_gap_ms` after the previous tick.
    pub fn detect_gap(
        &self,
        now_ms: f64,
        max_gap_ms: Option<f64>,
        nominal_tick_ms: f64,
    ) -> Option<f64> {
        let max_gap = max_gap_ms?;
        let last = self.last_tick_ms?;
        let elapsed = now_ms - last;
        if elapsed > max_gap {
            Some((elapsed - nominal_tick_ms).max(0.0))
        } else {
            None
        }
    }

    pub fn record_tick(&mut self, now_ms: f64) {
        self.last_tick_ms = Some(now_ms);
    }

    pub fn shift(&mut self, gap_ms: f64) {
        if let Some(last) = self.last_tick_ms.as_mut() {
            *last += gap_ms;
        }
    }

    pub fn reset(&mut self) {
        self.last_tick_ms = None;
        self.paused_at_ms = None;
    }
}
