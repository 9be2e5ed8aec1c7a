//! Fans every sampled pair out to every provider and gathers the results.
//!
//! Each (pair, provider) call runs as its own task. A run-wide semaphore caps
//! how many calls are in flight, each attempt gets its own timeout, and a
//! shared [`CancelToken`] resolves whatever is still pending as `Cancelled`.
//! Results are slotted back by sampling index, never by arrival order.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use super::cancel::CancelToken;
use super::overlap;
use super::progress::{LogProgress, ProgressSink};
use super::run::{ComparisonRun, PairResult, ProviderOutcome};
use crate::sdk::area::Area;
use crate::sdk::config::ComparisonSettings;
use crate::sdk::error::ConfigError;
use crate::sdk::routing::error::{ErrorKind, RoutingError};
use crate::sdk::routing::route::{Route, RoutePair, RouteRequest, Strategy};
use crate::sdk::routing::service::RouteProvider;
use crate::sdk::sampler::{sample_pairs_seeded, SamplerSettings};

pub struct ComparisonOrchestrator {
    providers: Vec<Arc<dyn RouteProvider>>,
    reference_id: String,
    settings: ComparisonSettings,
    progress: Arc<dyn ProgressSink>,
}

/// Everything a pair task needs, shared across all of them.
struct PairContext {
    providers: Vec<Arc<dyn RouteProvider>>,
    reference_id: String,
    settings: ComparisonSettings,
    progress: Arc<dyn ProgressSink>,
    semaphore: Arc<Semaphore>,
    cancel: CancelToken,
    strategy: Strategy,
    total: usize,
}

impl ComparisonOrchestrator {
    /// Provider ids must be unique and `reference` must be one of them.
    pub fn new(
        providers: Vec<Arc<dyn RouteProvider>>,
        reference: &str,
        settings: ComparisonSettings,
    ) -> Result<Self, ConfigError> {
        if providers.is_empty() {
            return Err(ConfigError::NoProviders);
        }
        let mut seen = HashSet::new();
        for provider in &providers {
            if !seen.insert(provider.id().to_string()) {
                return Err(ConfigError::DuplicateProvider(provider.id().to_string()));
            }
        }
        if !seen.contains(reference) {
            return Err(ConfigError::UnknownReference(reference.to_string()));
        }

        Ok(Self {
            providers,
            reference_id: reference.to_string(),
            settings,
            progress: Arc::new(LogProgress::default()),
        })
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    pub fn reference_id(&self) -> &str {
        &self.reference_id
    }

    pub fn provider_ids(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.id().to_string()).collect()
    }

    pub fn settings(&self) -> &ComparisonSettings {
        &self.settings
    }

    /// Samples pairs inside `area` and compares every provider on each of them.
    pub async fn run(&self, area: &Area, strategy: Strategy, cancel: &CancelToken) -> ComparisonRun {
        let started_at = Utc::now();
        let sampler = SamplerSettings {
            count: self.settings.pair_count,
            min_separation_m: self.settings.min_separation_m,
            max_attempts: self.settings.sampling_attempts,
        };
        let sample = sample_pairs_seeded(area, &sampler, self.settings.seed);
        if !sample.is_complete() {
            log::warn!(
                "Only {} of {} pairs could be sampled",
                sample.pairs.len(),
                self.settings.pair_count
            );
        }

        let results = self.compare_pairs(&sample.pairs, strategy, cancel).await;
        let run = ComparisonRun {
            area: area.clone(),
            strategy,
            reference_id: self.reference_id.clone(),
            provider_ids: self.provider_ids(),
            pairs: sample.pairs,
            results,
            requested_pairs: self.settings.pair_count,
            sampling_exhausted: sample.exhausted.len(),
            cancelled: cancel.is_cancelled(),
            started_at,
            completed_at: Utc::now(),
        };
        self.progress.on_run_completed(&run);
        run
    }

    /// Compares already sampled pairs. The returned results keep the order of
    /// `pairs`; pairs left unsettled by cancellation are omitted.
    pub async fn compare_pairs(
        &self,
        pairs: &[RoutePair],
        strategy: Strategy,
        cancel: &CancelToken,
    ) -> Vec<PairResult> {
        log::info!(
            "Comparing {} pairs across [{}] (reference: {}, strategy: {})",
            pairs.len(),
            self.provider_ids().join(", "),
            self.reference_id,
            strategy
        );

        let context = Arc::new(PairContext {
            providers: self.providers.clone(),
            reference_id: self.reference_id.clone(),
            settings: self.settings.clone(),
            progress: Arc::clone(&self.progress),
            semaphore: Arc::new(Semaphore::new(self.settings.max_concurrency.max(1))),
            cancel: cancel.clone(),
            strategy,
            total: pairs.len(),
        });

        let mut tasks = JoinSet::new();
        for (index, pair) in pairs.iter().enumerate() {
            let context = Arc::clone(&context);
            let pair = *pair;
            tasks.spawn(async move { (index, compare_pair(context, pair).await) });
        }

        let mut slots: Vec<Option<PairResult>> = vec![None; pairs.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => slots[index] = result,
                Err(e) => log::error!("Pair task failed: {}", e),
            }
        }
        slots.into_iter().flatten().collect()
    }
}

/// Settles every provider for one pair. `None` if any call was cancelled.
async fn compare_pair(context: Arc<PairContext>, pair: RoutePair) -> Option<PairResult> {
    let started = Arc::new(AtomicBool::new(false));
    let request = RouteRequest {
        pair,
        strategy: context.strategy,
    };

    let calls: Vec<_> = context
        .providers
        .iter()
        .map(|provider| {
            let id = provider.id().to_string();
            let call = call_provider(
                Arc::clone(&context),
                Arc::clone(provider),
                request,
                Arc::clone(&started),
            );
            (id, tokio::spawn(call))
        })
        .collect();

    let mut outcomes = BTreeMap::new();
    for (id, handle) in calls {
        let outcome = match handle.await {
            Ok(result) => ProviderOutcome::from(result),
            Err(e) => ProviderOutcome::Failure {
                kind: ErrorKind::ProviderUnavailable,
                message: format!("{id}: provider task failed: {e}"),
            },
        };
        outcomes.insert(id, outcome);
    }

    if outcomes
        .values()
        .any(|o| o.error_kind() == Some(ErrorKind::Cancelled))
    {
        log::debug!("Pair {} dropped: cancelled before settling", pair.id);
        return None;
    }

    let overlap_ratios = overlap_against_reference(&context, &outcomes);
    let result = PairResult {
        pair,
        outcomes,
        overlap_ratios,
    };
    context.progress.on_pair_completed(&result, context.total);
    Some(result)
}

fn overlap_against_reference(
    context: &PairContext,
    outcomes: &BTreeMap<String, ProviderOutcome>,
) -> BTreeMap<String, f64> {
    let Some(reference) = outcomes.get(&context.reference_id).and_then(ProviderOutcome::route) else {
        return BTreeMap::new();
    };
    outcomes
        .iter()
        .filter(|(id, _)| **id != context.reference_id)
        .filter_map(|(id, outcome)| {
            let route = outcome.route()?;
            let ratio = overlap::compute_overlap(reference, route, &context.settings.overlap);
            Some((id.clone(), ratio))
        })
        .collect()
}

/// One provider call with retries. Each attempt first waits for the provider's
/// quota, then takes a pool permit for the timed request. Cancellation wins
/// over everything else.
async fn call_provider(
    context: Arc<PairContext>,
    provider: Arc<dyn RouteProvider>,
    request: RouteRequest,
    started: Arc<AtomicBool>,
) -> Result<Route, RoutingError> {
    let settings = &context.settings;
    let cancel = &context.cancel;
    let max_attempts = settings.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        // quota admission is neither timed nor holds a pool permit
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RoutingError::Cancelled),
            _ = provider.ready() => {}
        }

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RoutingError::Cancelled),
            result = attempt_call(&context, provider.as_ref(), &request, &started) => result,
        };

        match result {
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                log::warn!(
                    "{} failed for pair {} (attempt {}/{}): {}. Retrying in {:?}",
                    provider.id(),
                    request.pair.id,
                    attempt,
                    max_attempts,
                    e,
                    settings.retry_backoff
                );
                attempt += 1;
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(RoutingError::Cancelled),
                    _ = tokio::time::sleep(settings.retry_backoff) => {}
                }
            }
            Err(e) => {
                log::warn!("{} failed for pair {}: {}", provider.id(), request.pair.id, e);
                return Err(e);
            }
            Ok(route) => return Ok(route),
        }
    }
}

/// Holds a worker-pool permit for the duration of a single timed attempt.
/// The first permit taken for a pair marks the pair as started.
async fn attempt_call(
    context: &PairContext,
    provider: &dyn RouteProvider,
    request: &RouteRequest,
    started: &AtomicBool,
) -> Result<Route, RoutingError> {
    let _permit = context
        .semaphore
        .acquire()
        .await
        .map_err(|_| RoutingError::Cancelled)?;
    if !started.swap(true, Ordering::SeqCst) {
        context.progress.on_pair_started(&request.pair, context.total);
    }

    let settings = &context.settings;
    match tokio::time::timeout(settings.call_timeout, provider.fetch_route(request)).await {
        Ok(result) => result,
        Err(_) => Err(RoutingError::Timeout(settings.call_timeout)),
    }
}
