use async_trait::async_trait;

use super::error::RoutingError;
use super::route::{Route, RouteRequest, Strategy};

/// A routing service queried for one route per origin/destination pair.
///
/// Implementations own their request/response shapes; callers only ever see
/// a normalised [`Route`] or a classified [`RoutingError`].
#[async_trait]
pub trait RouteProvider: Send + Sync {
    /// Stable identifier used as the key in comparison results.
    fn id(&self) -> &str;

    /// Whether the provider can honour `strategy`. Unsupported strategies fall
    /// back to the provider default and the returned route is flagged.
    fn supports(&self, strategy: Strategy) -> bool;

    /// Resolves once the provider's request quota admits another call.
    ///
    /// Callers await this before [`fetch_route`](Self::fetch_route), outside
    /// any timeout, so queueing behind the quota never counts against a call.
    async fn ready(&self) {}

    /// Fetches and normalises a route. Does not wait on the request quota.
    async fn fetch_route(&self, request: &RouteRequest) -> Result<Route, RoutingError>;
}
