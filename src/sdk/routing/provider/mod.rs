pub mod google;
pub mod graphhopper;
pub mod here;
pub mod osrm;
pub mod types;

pub use google::GoogleProvider;
pub use graphhopper::GraphHopperProvider;
pub use here::HereProvider;
pub use osrm::OsrmProvider;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;

use super::error::RoutingError;
use super::service::RouteProvider;
use crate::sdk::config::{ProviderEndpoint, ProvidersConfig};
use crate::sdk::error::ConfigError;

/// Builds every configured provider, in a fixed order: google, here, osrm, graphhopper.
pub fn build_providers(config: &ProvidersConfig) -> Result<Vec<Arc<dyn RouteProvider>>, ConfigError> {
    let mut providers: Vec<Arc<dyn RouteProvider>> = Vec::new();
    if let Some(endpoint) = &config.google {
        providers.push(Arc::new(GoogleProvider::new(endpoint)?));
    }
    if let Some(endpoint) = &config.here {
        providers.push(Arc::new(HereProvider::new(endpoint)?));
    }
    if let Some(endpoint) = &config.osrm {
        providers.push(Arc::new(OsrmProvider::new(endpoint)?));
    }
    if let Some(endpoint) = &config.graphhopper {
        providers.push(Arc::new(GraphHopperProvider::new(endpoint)?));
    }

    if providers.is_empty() {
        return Err(ConfigError::NoProviders);
    }
    Ok(providers)
}

pub(crate) fn http_client(endpoint: &ProviderEndpoint) -> Result<Client, reqwest::Error> {
    Client::builder().timeout(endpoint.request_timeout).build()
}

pub(crate) fn required_key(
    endpoint: &ProviderEndpoint,
    name: &'static str,
) -> Result<String, ConfigError> {
    endpoint
        .api_key
        .clone()
        .ok_or(ConfigError::MissingCredential(name))
}

/// Sends the request and returns status plus body text.
pub(crate) async fn send(request: RequestBuilder) -> Result<(StatusCode, String), RoutingError> {
    let response = request.send().await?;
    let status = response.status();
    let text = response.text().await?;
    Ok((status, text))
}

/// Maps a non-success HTTP status onto the error taxonomy.
pub(crate) fn classify_status(provider: &str, status: StatusCode, body: &str) -> RoutingError {
    let snippet: String = body.chars().take(200).collect();
    if status == StatusCode::TOO_MANY_REQUESTS {
        RoutingError::RateLimited(format!("{provider}: HTTP {status} {snippet}"))
    } else {
        RoutingError::Unavailable(format!("{provider}: HTTP {status} {snippet}"))
    }
}

/// Parses a response body, logging it when it does not match the expected shape.
pub(crate) fn parse_body<T: DeserializeOwned>(
    provider: &str,
    text: &str,
) -> Result<T, RoutingError> {
    if text.trim().is_empty() {
        return Err(RoutingError::Malformed(format!("{provider}: empty response body")));
    }
    serde_json::from_str(text).map_err(|e| {
        log::error!(
            "Failed to parse {} response.\nError: {}. Body: {}",
            provider,
            e,
            text
        );
        RoutingError::from(e)
    })
}
