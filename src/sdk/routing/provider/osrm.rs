use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use super::types::OsrmResponse;
use super::{classify_status, http_client, parse_body, send};
use crate::sdk::config::ProviderEndpoint;
use crate::sdk::error::ConfigError;
use crate::sdk::routing::error::RoutingError;
use crate::sdk::routing::normalize;
use crate::sdk::routing::route::{Route, RouteRequest, Strategy};
use crate::sdk::routing::service::RouteProvider;
use crate::sdk::util::rate_limit::{self, Limiter};

pub const ID: &str = "osrm";

/// An OSRM server, by default the public demo instance. No key required.
pub struct OsrmProvider {
    client: Client,
    base_url: String,
    limiter: Limiter,
}

impl OsrmProvider {
    pub fn new(endpoint: &ProviderEndpoint) -> Result<Self, ConfigError> {
        Ok(Self {
            client: http_client(endpoint)?,
            base_url: endpoint.base_url.trim_end_matches('/').to_string(),
            limiter: rate_limit::per_minute(endpoint.requests_per_minute),
        })
    }

    /// OSRM takes `lon,lat` pairs in the path.
    fn url(&self, request: &RouteRequest) -> String {
        let pair = &request.pair;
        format!(
            "{}/route/v1/driving/{},{};{},{}",
            self.base_url,
            pair.origin.longitude,
            pair.origin.latitude,
            pair.destination.longitude,
            pair.destination.latitude
        )
    }
}

#[async_trait]
impl RouteProvider for OsrmProvider {
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
        let url = self.url(request);
        log::debug!("[PROVIDER] osrm route: {}", url);

        let query = [
            ("overview", "full"),
            ("geometries", "polyline"),
            ("steps", "true"),
        ];
        let (status, text) = send(self.client.get(&url).query(&query)).await?;

        // OSRM reports NoRoute/NoSegment as 400 with a normal JSON body
        if !status.is_success() && status != StatusCode::BAD_REQUEST {
            return Err(classify_status(ID, status, &text));
        }

        let body: OsrmResponse = parse_body(ID, &text)?;
        let route = normalize::osrm(ID, request.pair.id, body)?;
        Ok(route.with_strategy_fallback(!self.supports(request.strategy)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdk::area::Coordinate;
    use crate::sdk::routing::route::RoutePair;

    #[test]
    fn url_uses_lon_lat_order() {
        let endpoint = ProviderEndpoint::new("http://localhost:5000/", None);
        let provider = OsrmProvider::new(&endpoint).unwrap();
        let request = RouteRequest {
            pair: RoutePair {
                id: 0,
                origin: Coordinate::new(48.8, 9.1),
                destination: Coordinate::new(48.85, 9.15),
            },
            strategy: Strategy::Shortest,
        };
        assert_eq!(
            provider.url(&request),
            "http://localhost:5000/route/v1/driving/9.1,48.8;9.15,48.85"
        );
        assert!(!provider.supports(Strategy::Shortest));
    }
}
