//! Derived display values for service runs.

use crate::run::model::{CoopRun, Run};
use crate::status::{BiddingStatus, CoopStatus};
use serde::Serialize;
use std::str::FromStr;

#[derive(Serialize, Clone, Copy, Debug, PartialEq)]
pub struct SlotProgress {
    /// Filled share of the bar, `0..=100`.
    pub percent: f64,
    pub at_minimum: bool,
    /// Where the minimum tick sits on the bar, `0..=100`.
    pub minimum_marker: f64,
}

/// `percent = min(100, 100 * current / max)`.
///
/// A run with `max == 0` shows an empty bar rather than dividing by zero.
pub fn slot_progress(current: u32, min: u32, max: u32) -> SlotProgress {
    let at_minimum = current >= min;
    if max == 0 {
        return SlotProgress {
            percent: 0.0,
            at_minimum,
            minimum_marker: 0.0,
        };
    }
    let share = |n: u32| (100.0 * f64::from(n) / f64::from(max)).min(100.0);
    SlotProgress {
        percent: share(current),
        at_minimum,
        minimum_marker: share(min),
    }
}

pub fn run_progress(run: &Run) -> SlotProgress {
    slot_progress(run.current_slots, run.min_slots, run.max_slots)
}

#[derive(Serialize, Clone, Copy, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RunStats {
    pub total: usize,
    pub collecting: usize,
    pub bidding: usize,
    pub active: usize,
    pub total_revenue: f64,
    pub total_slots: u64,
    pub coop_forming: usize,
    pub coop_threshold_met: usize,
}

/// Roll-up over both run tracks. Recomputed from scratch on every call.
pub fn compute_stats(runs: &[Run], coop_runs: &[CoopRun]) -> RunStats {
    let in_bucket = |buckets: &[BiddingStatus]| {
        runs.iter()
            .filter(|run| {
                BiddingStatus::from_str(&run.status).is_ok_and(|status| buckets.contains(&status))
            })
            .count()
    };

    let run_slots: u64 = runs.iter().map(|run| u64::from(run.current_slots)).sum();
    let coop_members: u64 = coop_runs
        .iter()
        .map(|coop| u64::from(coop.member_count()))
        .sum();

    RunStats {
        total: runs.len() + coop_runs.len(),
        collecting: in_bucket(&[BiddingStatus::Collecting]),
        bidding: in_bucket(&[BiddingStatus::Bidding, BiddingStatus::BidReview]),
        active: in_bucket(&[
            BiddingStatus::Confirmed,
            BiddingStatus::Scheduled,
            BiddingStatus::InProgress,
        ]),
        total_revenue: runs.iter().map(|run| run.total_estimated_revenue).sum(),
        total_slots: run_slots + coop_members,
        coop_forming: coop_runs
            .iter()
            .filter(|coop| coop.coop_status() == Some(CoopStatus::Forming))
            .count(),
        coop_threshold_met: coop_runs.iter().filter(|coop| coop.threshold_met).count(),
    }
}
