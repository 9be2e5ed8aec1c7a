pub mod sdk;

pub use sdk::area::{Area, Coordinate};
pub use sdk::compare::{
    aggregate, CancelToken, ComparisonOrchestrator, ComparisonRun, PairResult, ProgressSink,
    ProviderOutcome, RunStats,
};
pub use sdk::config::{ComparisonSettings, ProvidersConfig};
pub use sdk::error::ConfigError;
pub use sdk::routing::{ErrorKind, Route, RouteProvider, RoutingError, Strategy};
