use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Classification attached to every failed outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    SamplingExhausted,
    ProviderUnavailable,
    RateLimited,
    NoRouteFound,
    MalformedResponse,
    Cancelled,
    Timeout,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::SamplingExhausted => "sampling_exhausted",
            ErrorKind::ProviderUnavailable => "provider_unavailable",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::NoRouteFound => "no_route_found",
            ErrorKind::MalformedResponse => "malformed_response",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Timeout => "timeout",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum RoutingError {
    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("No route found: {0}")]
    NoRoute(String),

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Cancelled")]
    Cancelled,

    #[error("Underlying request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Failed to parse JSON response: {0}")]
    Parse(#[from] serde_json::Error),
}

impl RoutingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RoutingError::Unavailable(_) => ErrorKind::ProviderUnavailable,
            RoutingError::RateLimited(_) => ErrorKind::RateLimited,
            RoutingError::NoRoute(_) => ErrorKind::NoRouteFound,
            RoutingError::Malformed(_) | RoutingError::Parse(_) => ErrorKind::MalformedResponse,
            RoutingError::Timeout(_) => ErrorKind::Timeout,
            RoutingError::Cancelled => ErrorKind::Cancelled,
            RoutingError::Request(e) if e.is_timeout() => ErrorKind::Timeout,
            RoutingError::Request(e) if e.is_decode() => ErrorKind::MalformedResponse,
            RoutingError::Request(_) => ErrorKind::ProviderUnavailable,
        }
    }

    /// Failures worth another attempt within the retry budget.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::ProviderUnavailable | ErrorKind::RateLimited | ErrorKind::Timeout
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_errors_are_malformed() {
        let err: RoutingError = serde_json::from_str::<serde_json::Value>("{oops")
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
        assert!(!err.is_retryable());
    }

    #[test]
    fn retryable_kinds() {
        assert!(RoutingError::Unavailable("502".into()).is_retryable());
        assert!(RoutingError::RateLimited("429".into()).is_retryable());
        assert!(RoutingError::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(!RoutingError::NoRoute("none".into()).is_retryable());
        assert!(!RoutingError::Cancelled.is_retryable());
    }

    #[test]
    fn kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::NoRouteFound).unwrap();
        assert_eq!(json, "\"no_route_found\"");
        assert_eq!(ErrorKind::RateLimited.to_string(), "rate_limited");
    }
}
