// ─────────────────────────────────────────────────────────────────────
// Firefly Sync — Pulse Log
// ─────────────────────────────────────────────────────────────────────
//! Rolling log of pulse events bounded by age.
//!
//! Events arrive in tick order, so timestamps are non-decreasing from
//! front to back and pruning only ever pops from the front.

use std::collections::VecDeque;

use firefly_types::PulseEvent;

#[derive(Debug, Clone)]
pub struct PulseLog {
    events: VecDeque<PulseEvent>,
    window_ms: f64,
}

impl PulseLog {
    pub fn new(window_ms: f64) -> Self {
        Self {
            events: VecDeque::new(),
            window_ms,
        }
    }

    pub fn window_ms(&self) -> f64 {
        self.window_ms
    }

    pub fn push(&mut self, event: PulseEvent) {
        self.events.push_back(event);
    }

    /// Drop events older than the window. Returns how many were dropped.
    pub fn prune(&mut self, now_ms: f64) -> usize {
        let mut dropped = 0;
        while let Some(front) = self.events.front() {
            if now_ms - front.timestamp_ms > self.window_ms {
                self.events.pop_front();
                dropped += 1;
            } else {
                break;
            }
        }
        dropped
    }

    pub fn iter(&self) -> impl Iterator<Item = &PulseEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Move every timestamp forward by a suspended interval.
    pub fn shift_time(&mut self, gap_ms: f64) {
        for ev in self.events.iter_mut() {
            ev.timestamp_ms += gap_ms;
        }
    }
}

#[cfg(test)]
mod tests {
    use firefly_types::{OscillatorId, Position};

    use super::*;

    fn ev(id: u64, t: f64) -> PulseEvent {
        PulseEvent {
            oscillator: OscillatorId(id),
            timestamp_ms: t,
            position: Position::default(),
        }
    }

    #[test]
    fn test_prune_drops_only_stale() {
        let mut log = PulseLog::new(1000.0);
        log.push(ev(1, 0.0));
        log.push(ev(2, 500.0));
        log.push(ev(3, 1500.0));
        assert_eq!(log.prune(1000.0), 0, "age == window is kept");
        assert_eq!(log.prune(1600.0), 2);
        assert_eq!(log.len(), 1);
        assert_eq!(log.iter().next().unwrap().oscillator, OscillatorId(3));
    }

    #[test]
    fn test_prune_empty() {
        let mut log = PulseLog::new(10.0);
        assert_eq!(log.prune(1e9), 0);
        assert!(log.is_empty());
    }

    #[test]
    fn test_shift_time() {
        let mut log = PulseLog::new(1000.0);
        log.push(ev(1, 100.0));
        log.shift_time(250.0);
        assert_eq!(log.iter().next().unwrap().timestamp_ms, 350.0);
        assert_eq!(log.prune(1300.0), 0);
    }
}
