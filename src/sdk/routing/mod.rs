pub mod error;
pub mod normalize;
pub mod polyline;
pub mod provider;
pub mod route;
pub mod service;

pub use error::{ErrorKind, RoutingError};
pub use provider::{build_providers, GoogleProvider, GraphHopperProvider, HereProvider, OsrmProvider};
pub use route::{Maneuver, Route, RoutePair, RouteRequest, Strategy};
pub use service::RouteProvider;
