use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::domains::regions::PriorityTier;

/// Backoff never stretches an interval beyond this factor.
const MAX_BACKOFF_FACTOR: i32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleReason {
    /// Never collected since start-up.
    NeverRun,
    /// Due by the tier's interval.
    Cadence,
    /// Due again after failed cycles.
    Retry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueTier {
    pub tier: PriorityTier,
    pub reason: ScheduleReason,
}

#[derive(Debug, Clone, Default)]
struct TierState {
    last_run: Option<DateTime<Utc>>,
    next_due: Option<DateTime<Utc>>,
    consecutive_failures: u32,
    total_runs: u64,
    total_failures: u64,
}

/// Point-in-time view of one tier, for status endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct TierStatus {
    pub tier: PriorityTier,
    pub priority_order: i32,
    pub frequency: f64,
    pub interval_secs: i64,
    pub last_run: Option<DateTime<Utc>>,
    pub next_due: Option<DateTime<Utc>>,
    pub is_due: bool,
    pub consecutive_failures: u32,
    pub total_runs: u64,
    pub total_failures: u64,
}

/// Decides which priority tiers to collect and when.
///
/// Each tier is due one interval after its last success (12 minutes divided
/// by the tier frequency). Failures push the next run out exponentially, up
/// to eight intervals. Every due tier is returned on each tick, so lower
/// tiers are delayed by higher ones but never starved.
#[derive(Debug, Default)]
pub struct RegionScheduler {
    states: HashMap<PriorityTier, TierState>,
}

impl RegionScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interval after `failures` consecutive failures.
    pub fn backoff_interval(tier: PriorityTier, failures: u32) -> Duration {
        let factor = 2_i32.saturating_pow(failures.min(8)).min(MAX_BACKOFF_FACTOR);
        tier.collection_interval() * factor
    }

    /// Tiers due at `now`, highest priority first.
    pub fn due(&self, now: DateTime<Utc>) -> Vec<DueTier> {
        PriorityTier::all_in_order()
            .into_iter()
            .filter_map(|tier| {
                let state = self.states.get(&tier);
                match state.and_then(|s| s.next_due) {
                    None => Some(DueTier {
                        tier,
                        reason: ScheduleReason::NeverRun,
                    }),
                    Some(next_due) if next_due <= now => Some(DueTier {
                        tier,
                        reason: if state.is_some_and(|s| s.consecutive_failures > 0) {
                            ScheduleReason::Retry
                        } else {
                            ScheduleReason::Cadence
                        },
                    }),
                    Some(_) => None,
                }
            })
            .collect()
    }

    pub fn record_success(&mut self, tier: PriorityTier, now: DateTime<Utc>) {
        let state = self.states.entry(tier).or_default();
        state.last_run = Some(now);
        state.next_due = Some(now + tier.collection_interval());
        state.consecutive_failures = 0;
        state.total_runs += 1;
    }

    pub fn record_failure(&mut self, tier: PriorityTier, now: DateTime<Utc>) {
        let state = self.states.entry(tier).or_default();
        state.consecutive_failures += 1;
        state.last_run = Some(now);
        state.next_due = Some(now + Self::backoff_interval(tier, state.consecutive_failures));
        state.total_runs += 1;
        state.total_failures += 1;
    }

    pub fn snapshot(&self, now: DateTime<Utc>) -> Vec<TierStatus> {
        PriorityTier::all_in_order()
            .into_iter()
            .map(|tier| {
                let state = self.states.get(&tier).cloned().unwrap_or_default();
                TierStatus {
                    tier,
                    priority_order: tier.priority_order(),
                    frequency: tier.frequency(),
                    interval_secs: tier.collection_interval().num_seconds(),
                    last_run: state.last_run,
                    next_due: state.next_due,
                    is_due: state.next_due.map_or(true, |due| due <= now),
                    consecutive_failures: state.consecutive_failures,
                    total_runs: state.total_runs,
                    total_failures: state.total_failures,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_tier_is_due_before_first_run() {
        let scheduler = RegionScheduler::new();
        let due = scheduler.due(Utc::now());
        assert_eq!(due.len(), 7);
        assert_eq!(due[0].tier, PriorityTier::Sulaymaniyah);
        assert_eq!(due[6].tier, PriorityTier::Other);
        assert!(due.iter().all(|d| d.reason == ScheduleReason::NeverRun));
    }

    #[test]
    fn success_defers_by_interval() {
        let mut scheduler = RegionScheduler::new();
        let now = Utc::now();
        for tier in PriorityTier::all_in_order() {
            scheduler.record_success(tier, now);
        }
        assert!(scheduler.due(now).is_empty());

        // Sulaymaniyah (2 min) is due again before Erbil (2.4 min).
        let later = now + Duration::seconds(130);
        let due: Vec<_> = scheduler.due(later).into_iter().map(|d| d.tier).collect();
        assert_eq!(due, vec![PriorityTier::Sulaymaniyah]);

        // After 24 minutes everything is due, in priority order.
        let much_later = now + Duration::minutes(24);
        let due: Vec<_> = scheduler.due(much_later).into_iter().map(|d| d.tier).collect();
        assert_eq!(due, PriorityTier::all_in_order().to_vec());
    }

    #[test]
    fn failures_back_off_exponentially_with_cap() {
        let tier = PriorityTier::Basra; // 4 minutes
        assert_eq!(RegionScheduler::backoff_interval(tier, 0), Duration::minutes(4));
        assert_eq!(RegionScheduler::backoff_interval(tier, 1), Duration::minutes(8));
        assert_eq!(RegionScheduler::backoff_interval(tier, 2), Duration::minutes(16));
        assert_eq!(RegionScheduler::backoff_interval(tier, 3), Duration::minutes(32));
        assert_eq!(RegionScheduler::backoff_interval(tier, 10), Duration::minutes(32));
    }

    #[test]
    fn retry_reason_and_reset_on_success() {
        let mut scheduler = RegionScheduler::new();
        let now = Utc::now();
        scheduler.record_failure(PriorityTier::Duhok, now);

        let at = now + Duration::minutes(12);
        let due = scheduler.due(at);
        let duhok = due.iter().find(|d| d.tier == PriorityTier::Duhok).unwrap();
        assert_eq!(duhok.reason, ScheduleReason::Retry);

        scheduler.record_success(PriorityTier::Duhok, at);
        let status = scheduler
            .snapshot(at)
            .into_iter()
            .find(|s| s.tier == PriorityTier::Duhok)
            .unwrap();
        assert_eq!(status.consecutive_failures, 0);
        assert_eq!(status.total_runs, 2);
        assert_eq!(status.total_failures, 1);
        assert!(!status.is_due);
    }
}
