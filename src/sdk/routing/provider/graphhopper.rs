use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use super::types::GraphHopperResponse;
use super::{classify_status, http_client, parse_body, required_key, send};
use crate::sdk::config::ProviderEndpoint;
use crate::sdk::error::ConfigError;
use crate::sdk::routing::error::RoutingError;
use crate::sdk::routing::normalize;
use crate::sdk::routing::route::{Route, RouteRequest, Strategy};
use crate::sdk::routing::service::RouteProvider;
use crate::sdk::util::rate_limit::{self, Limiter};

pub const ID: &str = "graphhopper";

/// GraphHopper Directions API.
pub struct GraphHopperProvider {
    client: Client,
    api_key: String,
    base_url: String,
    limiter: Limiter,
}

impl GraphHopperProvider {
    pub fn new(endpoint: &ProviderEndpoint) -> Result<Self, ConfigError> {
        Ok(Self {
            client: http_client(endpoint)?,
            api_key: required_key(endpoint, "GRAPHHOPPER_API_KEY")?,
            base_url: endpoint.base_url.clone(),
            limiter: rate_limit::per_minute(endpoint.requests_per_minute),
        })
    }

    fn query(&self, request: &RouteRequest) -> Vec<(&'static str, String)> {
        let pair = &request.pair;
        vec![
            (
                "point",
                format!("{},{}", pair.origin.latitude, pair.origin.longitude),
            ),
            (
                "point",
                format!("{},{}", pair.destination.latitude, pair.destination.longitude),
            ),
            ("profile", "car".to_string()),
            ("optimization", request.strategy.to_string()),
            ("calc_points", "true".to_string()),
            ("points_encoded", "false".to_string()),
            ("instructions", "true".to_string()),
            ("type", "json".to_string()),
            ("key", self.api_key.clone()),
        ]
    }
}

#[async_trait]
impl RouteProvider for GraphHopperProvider {
    fn id(&self) -> &str {
        ID
    }

    fn supports(&self, _strategy: Strategy) -> bool {
        true
    }

    async fn ready(&self) {
        self.limiter.until_ready().await;
    }

    async fn fetch_route(&self, request: &RouteRequest) -> Result<Route, RoutingError> {
        log::debug!(
            "[PROVIDER] graphhopper route for pair {} ({})",
            request.pair.id,
            request.strategy
        );

        let (status, text) =
            send(self.client.get(&self.base_url).query(&self.query(request))).await?;

        // unroutable points come back as 400 with {"message": ...}
        if !status.is_success() && status != StatusCode::BAD_REQUEST {
            return Err(classify_status(ID, status, &text));
        }

        let body: GraphHopperResponse = parse_body(ID, &text)?;
        normalize::graphhopper(ID, request.pair.id, body)
    }
}
