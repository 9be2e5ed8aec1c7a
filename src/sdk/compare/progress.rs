//! Push-style notifications for whoever renders a run.
//!
//! Callbacks fire from the orchestrator's tasks, so sinks must be
//! `Send + Sync`. Keep them cheap; they run inline with the comparison.

use std::sync::atomic::{AtomicUsize, Ordering};

use super::run::{ComparisonRun, PairResult};
use crate::sdk::routing::route::RoutePair;

pub trait ProgressSink: Send + Sync {
    /// The pair's first provider call has taken a worker-pool slot and is being
    /// sent. Pairs still queued behind the pool or a quota have not started.
    /// `total` is the run's pair count.
    fn on_pair_started(&self, pair: &RoutePair, total: usize);
    /// Every provider call for the pair has settled.
    fn on_pair_completed(&self, result: &PairResult, total: usize);
    fn on_run_completed(&self, run: &ComparisonRun);
}

/// Discards everything.
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn on_pair_started(&self, _pair: &RoutePair, _total: usize) {}
    fn on_pair_completed(&self, _result: &PairResult, _total: usize) {}
    fn on_run_completed(&self, _run: &ComparisonRun) {}
}

/// Renders progress as log lines, counting completions as they arrive.
#[derive(Default)]
pub struct LogProgress {
    completed: AtomicUsize,
}

impl ProgressSink for LogProgress {
    fn on_pair_started(&self, pair: &RoutePair, total: usize) {
        log::info!(
            "Processing route {}/{} from ({:.5}, {:.5}) to ({:.5}, {:.5})...",
            pair.id + 1,
            total,
            pair.origin.latitude,
            pair.origin.longitude,
            pair.destination.latitude,
            pair.destination.longitude
        );
    }

    fn on_pair_completed(&self, result: &PairResult, total: usize) {
        let done = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
        let failed: Vec<String> = result
            .outcomes
            .iter()
            .filter_map(|(id, outcome)| outcome.error_kind().map(|kind| format!("{id}={kind}")))
            .collect();
        let overlaps: Vec<String> = result
            .overlap_ratios
            .iter()
            .map(|(id, ratio)| format!("{id}={:.1}%", ratio * 100.0))
            .collect();
        log::info!(
            "Route {} settled ({}/{} done). Overlap: [{}] Failures: [{}]",
            result.pair.id + 1,
            done,
            total,
            overlaps.join(", "),
            failed.join(", ")
        );
    }

    fn on_run_completed(&self, run: &ComparisonRun) {
        if run.cancelled {
            log::warn!(
                "Comparison cancelled: {} of {} pairs settled",
                run.results.len(),
                run.pairs.len()
            );
        } else {
            log::info!("Route processing complete: {} pairs", run.results.len());
        }
    }
}
