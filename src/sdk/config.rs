use std::env;
use std::time::Duration;

use super::compare::overlap::OverlapSettings;

pub const GOOGLE_DIRECTIONS_URL: &str = "https://maps.googleapis.com/maps/api/directions/json";
pub const HERE_ROUTING_URL: &str = "https://router.hereapi.com/v8/routes";
pub const OSRM_BASE_URL: &str = "http://router.project-osrm.org";
pub const GRAPHHOPPER_URL: &str = "https://graphhopper.com/api/1/route";

/// Where and how to reach one provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderEndpoint {
    pub api_key: Option<String>,
    pub base_url: String,
    pub requests_per_minute: u32,
    pub request_timeout: Duration,
}

impl ProviderEndpoint {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.into(),
            requests_per_minute: 60,
            request_timeout: Duration::from_secs(15),
        }
    }
}

/// Credentials and endpoints for every provider the run may use.
/// `None` means the provider is not configured and takes no part in the run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProvidersConfig {
    pub google: Option<ProviderEndpoint>,
    pub here: Option<ProviderEndpoint>,
    pub osrm: Option<ProviderEndpoint>,
    pub graphhopper: Option<ProviderEndpoint>,
}

impl ProvidersConfig {
    /// Reads keys and URL overrides from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) but over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let keyed = |key_var: &str, url_var: &str, default_url: &str| {
            lookup(key_var)
                .filter(|key| !key.trim().is_empty())
                .map(|key| {
                    ProviderEndpoint::new(
                        lookup(url_var).unwrap_or_else(|| default_url.to_string()),
                        Some(key),
                    )
                })
        };

        let mut graphhopper = keyed("GRAPHHOPPER_API_KEY", "GRAPHHOPPER_URL", GRAPHHOPPER_URL);
        if let Some(endpoint) = graphhopper.as_mut() {
            // free tier
            endpoint.requests_per_minute = 10;
        }

        Self {
            google: keyed("GOOGLE_ROADS_API_KEY", "GOOGLE_DIRECTIONS_URL", GOOGLE_DIRECTIONS_URL),
            here: keyed("HERE_MAP_DATA_API_KEY", "HERE_ROUTING_URL", HERE_ROUTING_URL),
            osrm: Some(ProviderEndpoint::new(
                lookup("OSRM_BASE_URL").unwrap_or_else(|| OSRM_BASE_URL.to_string()),
                None,
            )),
            graphhopper,
        }
    }
}

/// Tuning for one comparison run.
#[derive(Debug, Clone)]
pub struct ComparisonSettings {
    pub pair_count: usize,
    pub min_separation_m: f64,
    /// Candidate draws allowed per pair before the slot is given up.
    pub sampling_attempts: usize,
    pub call_timeout: Duration,
    /// Upper bound on provider calls in flight across the whole run.
    pub max_concurrency: usize,
    /// Total attempts per provider call, first try included.
    pub max_attempts: usize,
    pub retry_backoff: Duration,
    pub overlap: OverlapSettings,
    pub seed: Option<u64>,
}

impl Default for ComparisonSettings {
    fn default() -> Self {
        Self {
            pair_count: 5,
            min_separation_m: 500.0,
            sampling_attempts: 100,
            call_timeout: Duration::from_secs(15),
            max_concurrency: 6,
            max_attempts: 2,
            retry_backoff: Duration::from_millis(500),
            overlap: OverlapSettings::default(),
            seed: None,
        }
    }
}
