use thiserror::Error;

/// Errors that stop a comparison before any provider is called.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Coordinate out of range: lat={latitude}, lon={longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error("Invalid area: {0}")]
    InvalidArea(String),

    #[error("Unknown area preset: {0}")]
    UnknownPreset(String),

    #[error("No routing providers configured")]
    NoProviders,

    #[error("Provider '{0}' is configured more than once")]
    DuplicateProvider(String),

    #[error("Reference provider '{0}' is not among the configured providers")]
    UnknownReference(String),

    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
