use async_trait::async_trait;
use reqwest::Client;

use super::types::HereResponse;
use super::{classify_status, http_client, parse_body, required_key, send};
use crate::sdk::config::ProviderEndpoint;
use crate::sdk::error::ConfigError;
use crate::sdk::routing::error::RoutingError;
use crate::sdk::routing::normalize;
use crate::sdk::routing::route::{Route, RouteRequest, Strategy};
use crate::sdk::routing::service::RouteProvider;
use crate::sdk::util::rate_limit::{self, Limiter};

pub const ID: &str = "here";

/// HERE Routing API v8.
pub struct HereProvider {
    client: Client,
    api_key: String,
    base_url: String,
    limiter: Limiter,
}

impl HereProvider {
    pub fn new(endpoint: &ProviderEndpoint) -> Result<Self, ConfigError> {
        Ok(Self {
            client: http_client(endpoint)?,
            api_key: required_key(endpoint, "HERE_MAP_DATA_API_KEY")?,
            base_url: endpoint.base_url.clone(),
            limiter: rate_limit::per_minute(endpoint.requests_per_minute),
        })
    }

    fn query(&self, request: &RouteRequest) -> Vec<(&'static str, String)> {
        let pair = &request.pair;
        let routing_mode = match request.strategy {
            Strategy::Shortest => "short",
            Strategy::Fastest => "fast",
        };
        vec![
            ("transportMode", "car".to_string()),
            (
                "origin",
                format!("{},{}", pair.origin.latitude, pair.origin.longitude),
            ),
            (
                "destination",
                format!("{},{}", pair.destination.latitude, pair.destination.longitude),
            ),
            ("return", "polyline,summary,actions,instructions".to_string()),
            ("routingMode", routing_mode.to_string()),
            ("apiKey", self.api_key.clone()),
        ]
    }
}

#[async_trait]
impl RouteProvider for HereProvider {
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
            "[PROVIDER] here routes for pair {} ({})",
            request.pair.id,
            request.strategy
        );

        let (status, text) =
            send(self.client.get(&self.base_url).query(&self.query(request))).await?;
        if !status.is_success() {
            return Err(classify_status(ID, status, &text));
        }

        let body: HereResponse = parse_body(ID, &text)?;
        normalize::here(ID, request.pair.id, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdk::area::Coordinate;
    use crate::sdk::routing::route::RoutePair;

    #[test]
    fn strategy_maps_to_routing_mode() {
        let endpoint = ProviderEndpoint::new("http://localhost/here", Some("k".into()));
        let provider = HereProvider::new(&endpoint).unwrap();
        let pair = RoutePair {
            id: 1,
            origin: Coordinate::new(48.8, 9.1),
            destination: Coordinate::new(48.9, 9.2),
        };
        let shortest = provider.query(&RouteRequest {
            pair,
            strategy: Strategy::Shortest,
        });
        assert!(shortest.contains(&("routingMode", "short".to_string())));
        let fastest = provider.query(&RouteRequest {
            pair,
            strategy: Strategy::Fastest,
        });
        assert!(fastest.contains(&("routingMode", "fast".to_string())));
        assert!(fastest.contains(&("origin", "48.8,9.1".to_string())));
    }
}
