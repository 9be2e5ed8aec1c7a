use async_trait::async_trait;
use reqwest::Client;

use super::types::GoogleDirections;
use super::{classify_status, http_client, parse_body, required_key, send};
use crate::sdk::config::ProviderEndpoint;
use crate::sdk::error::ConfigError;
use crate::sdk::routing::error::RoutingError;
use crate::sdk::routing::normalize;
use crate::sdk::routing::route::{Route, RouteRequest, Strategy};
use crate::sdk::routing::service::RouteProvider;
use crate::sdk::util::rate_limit::{self, Limiter};

pub const ID: &str = "google";

/// Google Directions API, the reference-grade turn-by-turn provider.
pub struct GoogleProvider {
    client: Client,
    api_key: String,
    base_url: String,
    limiter: Limiter,
}

impl GoogleProvider {
    pub fn new(endpoint: &ProviderEndpoint) -> Result<Self, ConfigError> {
        Ok(Self {
            client: http_client(endpoint)?,
            api_key: required_key(endpoint, "GOOGLE_ROADS_API_KEY")?,
            base_url: endpoint.base_url.clone(),
            limiter: rate_limit::per_minute(endpoint.requests_per_minute),
        })
    }

    /// Driving directions have no "shortest" mode, so the strategy is not sent.
    fn query(&self, request: &RouteRequest) -> Vec<(&'static str, String)> {
        let pair = &request.pair;
        vec![
            (
                "origin",
                format!("{},{}", pair.origin.latitude, pair.origin.longitude),
            ),
            (
                "destination",
                format!("{},{}", pair.destination.latitude, pair.destination.longitude),
            ),
            ("mode", "driving".to_string()),
            ("key", self.api_key.clone()),
        ]
    }
}

#[async_trait]
impl RouteProvider for GoogleProvider {
    fn id(&self) -> &str {
        ID
    }

    fn supports(&self, strategy: Strategy) -> bool {
        strategy == Strategy::Fastest
    }

    async fn ready(&self) {
        self.limiter.until_ready().await;
    }

    async fn fetch_route(&self, request: &RouteRequest) -> Result<Route, RoutingError> {
        log::debug!(
            "[PROVIDER] google directions for pair {}: {:?} -> {:?}",
            request.pair.id,
            request.pair.origin,
            request.pair.destination
        );

        let (status, text) =
            send(self.client.get(&self.base_url).query(&self.query(request))).await?;
        if !status.is_success() {
            return Err(classify_status(ID, status, &text));
        }

        let body: GoogleDirections = parse_body(ID, &text)?;
        let route = normalize::google(ID, request.pair.id, body)?;
        Ok(route.with_strategy_fallback(!self.supports(request.strategy)))
    }
}
