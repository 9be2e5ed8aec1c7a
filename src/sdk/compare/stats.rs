//! Read-only roll-up of a finished run.

use std::collections::BTreeMap;

use serde::Serialize;

use super::run::{ComparisonRun, ProviderOutcome};
use crate::sdk::routing::error::ErrorKind;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderStats {
    pub provider_id: String,
    pub successes: usize,
    pub failures: usize,
    pub failures_by_kind: BTreeMap<ErrorKind, usize>,
    pub mean_distance_m: Option<f64>,
    pub median_distance_m: Option<f64>,
    pub mean_duration_s: Option<f64>,
    pub median_duration_s: Option<f64>,
    /// Absent for the reference and for providers never compared against it.
    pub mean_overlap: Option<f64>,
    pub strategy_fallbacks: usize,
}

/// Overlap of each alternative provider for one pair, as a percentage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairStats {
    pub pair_id: usize,
    pub overlap_pct: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunStats {
    pub reference_id: String,
    pub settled_pairs: usize,
    pub requested_pairs: usize,
    pub sampling_exhausted: usize,
    pub cancelled: bool,
    pub providers: Vec<ProviderStats>,
    pub pairs: Vec<PairStats>,
}

impl RunStats {
    pub fn provider(&self, id: &str) -> Option<&ProviderStats> {
        self.providers.iter().find(|p| p.provider_id == id)
    }
}

pub fn aggregate(run: &ComparisonRun) -> RunStats {
    let providers = run
        .provider_ids
        .iter()
        .map(|id| provider_stats(run, id))
        .collect();

    let pairs = run
        .results
        .iter()
        .map(|result| PairStats {
            pair_id: result.pair.id,
            overlap_pct: result
                .overlap_ratios
                .iter()
                .map(|(id, ratio)| (id.clone(), ratio * 100.0))
                .collect(),
        })
        .collect();

    RunStats {
        reference_id: run.reference_id.clone(),
        settled_pairs: run.results.len(),
        requested_pairs: run.requested_pairs,
        sampling_exhausted: run.sampling_exhausted,
        cancelled: run.cancelled,
        providers,
        pairs,
    }
}

fn provider_stats(run: &ComparisonRun, id: &str) -> ProviderStats {
    let mut distances = Vec::new();
    let mut durations = Vec::new();
    let mut overlaps = Vec::new();
    let mut failures_by_kind = BTreeMap::new();
    let mut strategy_fallbacks = 0;

    for result in &run.results {
        match result.outcome(id) {
            Some(ProviderOutcome::Success(route)) => {
                distances.push(route.distance_m());
                durations.push(route.duration_s());
                if route.strategy_fallback() {
                    strategy_fallbacks += 1;
                }
            }
            Some(ProviderOutcome::Failure { kind, .. }) => {
                *failures_by_kind.entry(*kind).or_insert(0) += 1;
            }
            None => {}
        }
        if let Some(ratio) = result.overlap_ratios.get(id) {
            overlaps.push(*ratio);
        }
    }

    ProviderStats {
        provider_id: id.to_string(),
        successes: distances.len(),
        failures: failures_by_kind.values().sum(),
        failures_by_kind,
        mean_distance_m: mean(&distances),
        median_distance_m: median(&mut distances),
        mean_duration_s: mean(&durations),
        median_duration_s: median(&mut durations),
        mean_overlap: mean(&overlaps),
        strategy_fallbacks,
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}
