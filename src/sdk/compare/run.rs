use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::sdk::area::Area;
use crate::sdk::routing::error::{ErrorKind, RoutingError};
use crate::sdk::routing::route::{Route, RoutePair, Strategy};

/// What one provider produced for one pair.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProviderOutcome {
    Success(Route),
    Failure { kind: ErrorKind, message: String },
}

impl ProviderOutcome {
    pub fn route(&self) -> Option<&Route> {
        match self {
            ProviderOutcome::Success(route) => Some(route),
            ProviderOutcome::Failure { .. } => None,
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            ProviderOutcome::Success(_) => None,
            ProviderOutcome::Failure { kind, .. } => Some(*kind),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ProviderOutcome::Success(_))
    }
}

impl From<Result<Route, RoutingError>> for ProviderOutcome {
    fn from(result: Result<Route, RoutingError>) -> Self {
        match result {
            Ok(route) => ProviderOutcome::Success(route),
            Err(e) => ProviderOutcome::Failure {
                kind: e.kind(),
                message: e.to_string(),
            },
        }
    }
}

/// Every provider's outcome for one pair, plus overlap against the reference.
///
/// `overlap_ratios` only holds providers that succeeded alongside a successful
/// reference; the reference itself is never listed.
#[derive(Debug, Clone, Serialize)]
pub struct PairResult {
    pub pair: RoutePair,
    pub outcomes: BTreeMap<String, ProviderOutcome>,
    pub overlap_ratios: BTreeMap<String, f64>,
}

impl PairResult {
    pub fn outcome(&self, provider_id: &str) -> Option<&ProviderOutcome> {
        self.outcomes.get(provider_id)
    }

    pub fn route(&self, provider_id: &str) -> Option<&Route> {
        self.outcome(provider_id).and_then(ProviderOutcome::route)
    }
}

/// One user-triggered comparison, from sampling to the last settled pair.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonRun {
    pub area: Area,
    pub strategy: Strategy,
    pub reference_id: String,
    /// Provider ids in configuration order.
    pub provider_ids: Vec<String>,
    pub pairs: Vec<RoutePair>,
    /// In sampling order. Shorter than `pairs` only when the run was cancelled.
    pub results: Vec<PairResult>,
    pub requested_pairs: usize,
    pub sampling_exhausted: usize,
    pub cancelled: bool,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}
