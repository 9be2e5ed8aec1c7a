#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use route_compare::sdk::compare::{ComparisonRun, PairResult, ProgressSink};
use route_compare::sdk::config::ComparisonSettings;
use route_compare::sdk::routing::{Route, RouteProvider, RouteRequest, RoutePair, RoutingError, Strategy};
use route_compare::sdk::util::rate_limit::Limiter;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

#[derive(Clone, Copy)]
pub enum Script {
    /// Two-point route from origin to destination.
    StraightLine,
    Unavailable,
    NoRoute,
}

type DelayFn = Box<dyn Fn(usize) -> Duration + Send + Sync>;

/// Fake provider answering from a fixed script, with optional per-pair latency.
pub struct ScriptedProvider {
    id: String,
    script: Script,
    delay: DelayFn,
    flaky_calls: usize,
    limiter: Option<Limiter>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(id: &str, script: Script) -> Self {
        Self {
            id: id.to_string(),
            script,
            delay: Box::new(|_| Duration::ZERO),
            flaky_calls: 0,
            limiter: None,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: impl Fn(usize) -> Duration + Send + Sync + 'static) -> Self {
        self.delay = Box::new(delay);
        self
    }

    /// The first `n` calls fail as unavailable before the script applies.
    pub fn flaky(mut self, n: usize) -> Self {
        self.flaky_calls = n;
        self
    }

    /// Admits one call per `period`, with no burst.
    pub fn with_quota_period(mut self, period: Duration) -> Self {
        let quota = Quota::with_period(period).unwrap();
        self.limiter = Some(Arc::new(RateLimiter::direct(quota)));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl RouteProvider for ScriptedProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn supports(&self, _strategy: Strategy) -> bool {
        true
    }

    async fn ready(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }

    async fn fetch_route(&self, request: &RouteRequest) -> Result<Route, RoutingError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        tokio::time::sleep((self.delay)(request.pair.id)).await;

        if call < self.flaky_calls {
            return Err(RoutingError::Unavailable(format!("{} flaked", self.id)));
        }
        match self.script {
            Script::StraightLine => Route::straight_line(self.id.clone(), &request.pair, 60.0),
            Script::Unavailable => Err(RoutingError::Unavailable(format!("{} is down", self.id))),
            Script::NoRoute => Err(RoutingError::NoRoute(format!("{} found nothing", self.id))),
        }
    }
}

pub fn providers(list: Vec<Arc<ScriptedProvider>>) -> Vec<Arc<dyn RouteProvider>> {
    list.into_iter()
        .map(|p| p as Arc<dyn RouteProvider>)
        .collect()
}

/// Seeded settings with a short retry backoff so failing providers settle fast.
pub fn settings() -> ComparisonSettings {
    ComparisonSettings {
        seed: Some(2024),
        retry_backoff: Duration::from_millis(5),
        max_concurrency: 16,
        ..Default::default()
    }
}

/// Records the order of progress notifications.
#[derive(Default)]
pub struct RecordingProgress {
    pub started: Mutex<Vec<usize>>,
    pub completed: Mutex<Vec<usize>>,
    /// How many pairs had started when each completion arrived.
    pub started_at_completion: Mutex<Vec<usize>>,
    pub runs: AtomicUsize,
}

impl ProgressSink for RecordingProgress {
    fn on_pair_started(&self, pair: &RoutePair, _total: usize) {
        self.started.lock().unwrap().push(pair.id);
    }

    fn on_pair_completed(&self, result: &PairResult, _total: usize) {
        let started = self.started.lock().unwrap().len();
        self.started_at_completion.lock().unwrap().push(started);
        self.completed.lock().unwrap().push(result.pair.id);
    }

    fn on_run_completed(&self, _run: &ComparisonRun) {
        self.runs.fetch_add(1, Ordering::SeqCst);
    }
}

/// Local HTTP server answering every request with one canned response.
pub struct MockServer {
    pub url: String,
    /// Request lines received, e.g. `GET /route/v1/... HTTP/1.1`.
    pub requests: Arc<Mutex<Vec<String>>>,
}

impl MockServer {
    pub async fn start(status: u16, body: &'static str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let seen = Arc::clone(&seen);
                tokio::spawn(async move {
                    let mut head = Vec::new();
                    let mut chunk = [0u8; 1024];
                    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                        match socket.read(&mut chunk).await {
                            Ok(0) | Err(_) => break,
                            Ok(n) => head.extend_from_slice(&chunk[..n]),
                        }
                    }
                    let text = String::from_utf8_lossy(&head);
                    let request_line = text.lines().next().unwrap_or_default().to_string();
                    seen.lock().unwrap().push(request_line);

                    let response = format!(
                        "HTTP/1.1 {status} Mock\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        Self { url, requests }
    }

    pub fn hits(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> String {
        self.requests.lock().unwrap().last().cloned().unwrap_or_default()
    }
}
