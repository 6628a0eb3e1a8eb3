// ─────────────────────────────────────────────────────────────────────
// Firefly Sync — Synchrony Tracker
// ─────────────────────────────────────────────────────────────────────
//! Clusters near-simultaneous pulses into transient synchrony groups.
//!
//! Per tick:
//!   1. Prune the pulse log (log window)
//!   2. Retire groups idle longer than the retention window and clear
//!      their members' back-references
//!   3. Greedy clustering over the log in insertion order; each event is
//!      consumed by at most one cluster per pass
//!   4. Resolve clusters spanning >= 2 oscillators: extend the first live
//!      group found among members, or open a new one
//!
//! The registry owns group lifetime. Oscillators carry the group id only
//! as a lookup key.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use firefly_physics::Oscillator;
use firefly_types::{GroupId, OscillatorId, PulseEvent, TrackerConfig};

use crate::pulse_log::PulseLog;

/// A transient cluster of oscillators that pulsed together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncGroup {
    pub id: GroupId,
    pub members: BTreeSet<OscillatorId>,
    pub created_at_ms: f64,
    pub last_activity_ms: f64,
}

impl SyncGroup {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// What one tracker pass changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackerUpdate {
    pub formed: Vec<GroupId>,
    pub extended: Vec<GroupId>,
    pub expired: Vec<GroupId>,
    pub pruned_events: usize,
}

/// Pulse-log consumer maintaining the group registry.
#[derive(Debug, Clone)]
pub struct SynchronyTracker {
    cfg: TrackerConfig,
    log: PulseLog,
    groups: BTreeMap<GroupId, SyncGroup>,
    next_group_id: u64,
}

impl SynchronyTracker {
    pub fn new(config: TrackerConfig) -> Self {
        let log = PulseLog::new(config.pulse_log_window_ms);
        Self {
            cfg: config,
            log,
            groups: BTreeMap::new(),
            next_group_id: 1,
        }
    }

    pub fn default_params() -> Self {
        Self::new(TrackerConfig::default())
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.cfg
    }

    pub fn is_enabled(&self) -> bool {
        self.cfg.enabled
    }

    pub fn log(&self) -> &PulseLog {
        &self.log
    }

    pub fn groups(&self) -> impl Iterator<Item = &SyncGroup> {
        self.groups.values()
    }

    pub fn group(&self, id: GroupId) -> Option<&SyncGroup> {
        self.groups.get(&id)
    }

    pub fn active_group_count(&self) -> usize {
        self.groups.len()
    }

    /// Append a pulse to the log. Ignored when tracking is disabled.
    pub fn record(&mut self, event: PulseEvent) {
        if self.cfg.enabled {
            self.log.push(event);
        }
    }

    /// Run one full tracker pass at `now_ms`.
    pub fn update(&mut self, now_ms: f64, population: &mut [Oscillator]) -> TrackerUpdate {
        let mut report = TrackerUpdate::default();
        if !self.cfg.enabled {
            return report;
        }
        report.pruned_events = self.log.prune(now_ms);
        report.expired = self.expire_groups(now_ms, population);

        let index = index_by_id(population);
        for members in self.clusters() {
            let (gid, created) = self.resolve(&members, now_ms, population, &index);
            if created {
                report.formed.push(gid);
            } else if !report.extended.contains(&gid) {
                report.extended.push(gid);
            }
        }
        report
    }

    /// Retire groups whose last activity is older than the retention
    /// window. Returns the ids removed.
    pub fn expire_groups(&mut self, now_ms: f64, population: &mut [Oscillator]) -> Vec<GroupId> {
        let stale: Vec<GroupId> = self
            .groups
            .values()
            .filter(|g| now_ms - g.last_activity_ms > self.cfg.group_retention_ms)
            .map(|g| g.id)
            .collect();
        for id in &stale {
            self.remove_group(*id, population);
        }
        stale
    }

    /// Remove a group and clear the back-reference on every member that
    /// still exists. Unknown ids and departed members are ignored.
    pub fn remove_group(
        &mut self,
        id: GroupId,
        population: &mut [Oscillator],
    ) -> Option<SyncGroup> {
        let group = self.groups.remove(&id)?;
        for osc in population.iter_mut() {
            if osc.group() == Some(id) {
                osc.clear_group();
            }
        }
        log::debug!("{id} retired ({} members)", group.len());
        Some(group)
    }

    /// Greedy temporal clustering over the current log.
    ///
    /// Returns the distinct oscillator ids of every cluster that spans at
    /// least two oscillators, in discovery order.
    fn clusters(&self) -> Vec<Vec<OscillatorId>> {
        let events: Vec<&PulseEvent> = self.log.iter().collect();
        let mut consumed = vec![false; events.len()];
        let mut out = Vec::new();

        for i in 0..events.len() {
            if consumed[i] {
                continue;
            }
            consumed[i] = true;
            let anchor = events[i].timestamp_ms;

            let mut cluster = vec![i];
            for (j, ev) in events.iter().enumerate() {
                if !consumed[j] && (ev.timestamp_ms - anchor).abs() <= self.cfg.sync_window_ms {
                    cluster.push(j);
                }
            }

            let mut members: Vec<OscillatorId> = Vec::with_capacity(cluster.len());
            for &k in &cluster {
                let id = events[k].oscillator;
                if !members.contains(&id) {
                    members.push(id);
                }
            }
            if members.len() < 2 {
                continue;
            }
            for &k in &cluster {
                consumed[k] = true;
            }
            out.push(members);
        }
        out
    }

    /// Attach a cluster to a group. Returns the group id and whether the
    /// group was newly created.
    fn resolve(
        &mut self,
        members: &[OscillatorId],
        now_ms: f64,
        population: &mut [Oscillator],
        index: &HashMap<OscillatorId, usize>,
    ) -> (GroupId, bool) {
        let live = |osc: &Oscillator| osc.group().filter(|g| self.groups.contains_key(g));
        let existing = members
            .iter()
            .filter_map(|id| index.get(id))
            .find_map(|&i| live(&population[i]));

        match existing {
            Some(gid) => {
                let joiners: Vec<(OscillatorId, usize)> = members
                    .iter()
                    .filter_map(|id| index.get(id).map(|&i| (*id, i)))
                    .filter(|&(_, i)| live(&population[i]).is_none())
                    .collect();
                for &(_, i) in &joiners {
                    population[i].set_group(gid);
                }
                if let Some(group) = self.groups.get_mut(&gid) {
                    group.members.extend(joiners.iter().map(|&(id, _)| id));
                    group.last_activity_ms = now_ms;
                }
                (gid, false)
            }
            None => {
                let gid = GroupId(self.next_group_id);
                self.next_group_id += 1;
                for id in members {
                    if let Some(&i) = index.get(id) {
                        population[i].set_group(gid);
                    }
                }
                self.groups.insert(
                    gid,
                    SyncGroup {
                        id: gid,
                        members: members.iter().copied().collect(),
                        created_at_ms: now_ms,
                        last_activity_ms: now_ms,
                    },
                );
                log::debug!("{gid} formed with {} members", members.len());
                (gid, true)
            }
        }
    }

    /// Move every group timestamp and logged pulse forward by a
    /// suspended interval.
    pub fn shift_time(&mut self, gap_ms: f64) {
        self.log.shift_time(gap_ms);
        for group in self.groups.values_mut() {
            group.created_at_ms += gap_ms;
            group.last_activity_ms += gap_ms;
        }
    }

    /// Drop all events and groups. Group ids keep counting up.
    pub fn clear(&mut self) {
        self.log.clear();
        self.groups.clear();
    }
}

fn index_by_id(population: &[Oscillator]) -> HashMap<OscillatorId, usize> {
    population
        .iter()
        .enumerate()
        .map(|(i, osc)| (osc.id(), i))
        .collect()
}

#[cfg(test)]
mod tests {
    use firefly_types::Position;

    use super::*;

    fn population(n: u64) -> Vec<Oscillator> {
        (1..=n)
            .map(|id| Oscillator::new(OscillatorId(id), Position::new(id as f64, 0.0), 0.0))
            .collect()
    }

    fn ev(id: u64, t: f64) -> PulseEvent {
        PulseEvent {
            oscillator: OscillatorId(id),
            timestamp_ms: t,
            position: Position::default(),
        }
    }

    fn tracker(sync_window_ms: f64) -> SynchronyTracker {
        SynchronyTracker::new(TrackerConfig {
            enabled: true,
            sync_window_ms,
            pulse_log_window_ms: 1000.0,
            group_retention_ms: 2000.0,
        })
    }

    #[test]
    fn test_groups_close_pulses_leaves_distant_one() {
        let mut pop = population(3);
        let mut t = tracker(10.0);
        t.record(ev(1, 0.0));
        t.record(ev(2, 5.0));
        t.record(ev(3, 500.0));
        let report = t.update(500.0, &mut pop);

        assert_eq!(report.formed.len(), 1);
        assert_eq!(t.active_group_count(), 1);
        let gid = report.formed[0];
        assert_eq!(pop[0].group(), Some(gid));
        assert_eq!(pop[1].group(), Some(gid));
        assert_eq!(pop[2].group(), None);
        let group = t.group(gid).unwrap();
        assert_eq!(group.len(), 2);
        assert_eq!(group.created_at_ms, 500.0);
    }

    #[test]
    fn test_same_oscillator_alone_never_groups() {
        let mut pop = population(1);
        let mut t = tracker(100.0);
        t.record(ev(1, 0.0));
        t.record(ev(1, 50.0));
        t.update(60.0, &mut pop);
        assert_eq!(t.active_group_count(), 0);
        assert_eq!(pop[0].group(), None);
    }

    #[test]
    fn test_event_consumed_by_first_cluster_only() {
        let mut pop = population(3);
        let mut t = tracker(10.0);
        t.record(ev(1, 0.0));
        t.record(ev(2, 8.0));
        t.record(ev(3, 16.0));
        t.update(16.0, &mut pop);
        assert_eq!(t.active_group_count(), 1);
        assert!(pop[0].group().is_some());
        assert_eq!(pop[0].group(), pop[1].group());
        assert_eq!(pop[2].group(), None);
    }

    #[test]
    fn test_window_is_symmetric() {
        let mut pop = population(2);
        let mut t = tracker(10.0);
        // Later pulse logged first; the match must look backwards too.
        t.record(ev(2, 3.0));
        t.record(ev(1, 0.0));
        t.update(3.0, &mut pop);
        assert_eq!(t.active_group_count(), 1);
    }

    #[test]
    fn test_cluster_extends_existing_group() {
        let mut pop = population(3);
        let mut t = tracker(10.0);
        t.record(ev(1, 0.0));
        t.record(ev(2, 1.0));
        let first = t.update(1.0, &mut pop).formed[0];

        t.record(ev(2, 400.0));
        t.record(ev(3, 402.0));
        let report = t.update(402.0, &mut pop);

        assert!(report.formed.is_empty());
        assert!(report.extended.contains(&first));
        assert_eq!(t.active_group_count(), 1);
        assert_eq!(pop[2].group(), Some(first));
        let group = t.group(first).unwrap();
        assert_eq!(group.len(), 3);
        assert_eq!(group.last_activity_ms, 402.0);
        assert_eq!(group.created_at_ms, 1.0);
    }

    #[test]
    fn test_member_of_other_group_is_not_moved() {
        let mut pop = population(4);
        let mut t = tracker(10.0);
        t.record(ev(1, 0.0));
        t.record(ev(2, 1.0));
        t.record(ev(3, 300.0));
        t.record(ev(4, 301.0));
        let formed = t.update(301.0, &mut pop).formed;
        assert_eq!(formed.len(), 2);
        let (ga, gb) = (formed[0], formed[1]);

        t.record(ev(2, 600.0));
        t.record(ev(3, 601.0));
        t.update(601.0, &mut pop);

        assert_eq!(pop[1].group(), Some(ga));
        assert_eq!(pop[2].group(), Some(gb));
        assert_eq!(t.group(ga).unwrap().len(), 2);
        assert_eq!(t.group(gb).unwrap().len(), 2);
    }

    #[test]
    fn test_group_expires_after_retention() {
        let mut pop = population(2);
        let mut t = tracker(10.0);
        t.record(ev(1, 0.0));
        t.record(ev(2, 5.0));
        let gid = t.update(5.0, &mut pop).formed[0];

        // T + W exactly: still alive (log already pruned, no bump).
        let report = t.update(2005.0, &mut pop);
        assert!(report.expired.is_empty());
        assert!(t.group(gid).is_some());

        let report = t.update(2005.5, &mut pop);
        assert_eq!(report.expired, vec![gid]);
        assert!(t.group(gid).is_none());
        assert_eq!(pop[0].group(), None);
        assert_eq!(pop[1].group(), None);
    }

    #[test]
    fn test_remove_group_with_departed_members() {
        let mut pop = population(2);
        let mut t = tracker(10.0);
        t.record(ev(1, 0.0));
        t.record(ev(2, 0.0));
        let gid = t.update(0.0, &mut pop).formed[0];

        let mut survivors: Vec<Oscillator> = Vec::new();
        let removed = t.remove_group(gid, &mut survivors).unwrap();
        assert_eq!(removed.len(), 2);
        assert!(t.remove_group(gid, &mut pop).is_none());
    }

    #[test]
    fn test_disabled_tracker_is_inert() {
        let mut pop = population(2);
        let mut t = SynchronyTracker::new(TrackerConfig {
            enabled: false,
            ..Default::default()
        });
        t.record(ev(1, 0.0));
        t.record(ev(2, 0.0));
        let report = t.update(0.0, &mut pop);
        assert_eq!(report, TrackerUpdate::default());
        assert!(t.log().is_empty());
        assert_eq!(t.active_group_count(), 0);
    }

    #[test]
    fn test_shift_time_delays_expiry() {
        let mut pop = population(2);
        let mut t = tracker(10.0);
        t.record(ev(1, 0.0));
        t.record(ev(2, 0.0));
        let gid = t.update(0.0, &mut pop).formed[0];
        t.shift_time(5000.0);
        let group = t.group(gid).unwrap();
        assert_eq!(group.last_activity_ms, 5000.0);
        assert_eq!(group.created_at_ms, 5000.0);
        t.update(6999.0, &mut pop);
        assert!(t.group(gid).is_some());
    }

    #[test]
    fn test_clear_keeps_id_counter() {
        let mut pop = population(2);
        let mut t = tracker(10.0);
        t.record(ev(1, 0.0));
        t.record(ev(2, 0.0));
        let first = t.update(0.0, &mut pop).formed[0];
        t.clear();
        assert_eq!(t.active_group_count(), 0);
        assert!(t.log().is_empty());

        let mut pop = population(2);
        t.record(ev(1, 10.0));
        t.record(ev(2, 10.0));
        let second = t.update(10.0, &mut pop).formed[0];
        assert!(second > first);
    }
}
