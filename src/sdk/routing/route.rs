use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::RoutingError;
use crate::sdk::area::{path_length, Coordinate};

/// Routing optimisation objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Shortest,
    Fastest,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Shortest => f.write_str("shortest"),
            Strategy::Fastest => f.write_str("fastest"),
        }
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shortest" => Ok(Strategy::Shortest),
            "fastest" => Ok(Strategy::Fastest),
            other => Err(format!(
                "unknown strategy '{other}', expected 'shortest' or 'fastest'"
            )),
        }
    }
}

/// One origin/destination sample, compared across all providers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoutePair {
    pub id: usize,
    pub origin: Coordinate,
    pub destination: Coordinate,
}

/// What a provider is asked for.
#[derive(Debug, Clone, Copy)]
pub struct RouteRequest {
    pub pair: RoutePair,
    pub strategy: Strategy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Maneuver {
    pub instruction: String,
    pub coordinate: Coordinate,
    pub distance_to_next_m: f64,
}

/// A provider's route in the common representation.
///
/// Built once by the normaliser and never mutated afterwards, so fields are
/// only reachable through accessors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    provider_id: String,
    pair_id: usize,
    geometry: Vec<Coordinate>,
    distance_m: f64,
    duration_s: f64,
    maneuvers: Vec<Maneuver>,
    /// The requested strategy was not supported and the provider default was used.
    strategy_fallback: bool,
}

impl Route {
    pub fn new(
        provider_id: impl Into<String>,
        pair_id: usize,
        geometry: Vec<Coordinate>,
        distance_m: f64,
        duration_s: f64,
        maneuvers: Vec<Maneuver>,
    ) -> Result<Self, RoutingError> {
        if geometry.len() < 2 {
            return Err(RoutingError::Malformed(format!(
                "route geometry has {} point(s), need at least 2",
                geometry.len()
            )));
        }
        if let Some(bad) = geometry.iter().find(|c| !c.is_valid()) {
            return Err(RoutingError::Malformed(format!(
                "geometry contains invalid coordinate {:?}",
                bad
            )));
        }
        if !(distance_m.is_finite() && distance_m >= 0.0) {
            return Err(RoutingError::Malformed(format!("bad distance {distance_m}")));
        }
        if !(duration_s.is_finite() && duration_s >= 0.0) {
            return Err(RoutingError::Malformed(format!("bad duration {duration_s}")));
        }

        Ok(Self {
            provider_id: provider_id.into(),
            pair_id,
            geometry,
            distance_m,
            duration_s,
            maneuvers,
            strategy_fallback: false,
        })
    }

    /// Straight two-point route with great-circle distance and no maneuvers.
    pub fn straight_line(
        provider_id: impl Into<String>,
        pair: &RoutePair,
        duration_s: f64,
    ) -> Result<Self, RoutingError> {
        let geometry = vec![pair.origin, pair.destination];
        let distance = path_length(&geometry);
        Self::new(provider_id, pair.id, geometry, distance, duration_s, Vec::new())
    }

    pub fn with_strategy_fallback(mut self, fallback: bool) -> Self {
        self.strategy_fallback = fallback;
        self
    }

    pub fn provider_id(&self) -> &str {
        &self.provider_id
    }

    pub fn pair_id(&self) -> usize {
        self.pair_id
    }

    pub fn geometry(&self) -> &[Coordinate] {
        &self.geometry
    }

    pub fn distance_m(&self) -> f64 {
        self.distance_m
    }

    pub fn duration_s(&self) -> f64 {
        self.duration_s
    }

    pub fn maneuvers(&self) -> &[Maneuver] {
        &self.maneuvers
    }

    pub fn strategy_fallback(&self) -> bool {
        self.strategy_fallback
    }

    /// Instruction texts with repeats removed, first occurrence kept.
    pub fn unique_instructions(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.maneuvers
            .iter()
            .map(|m| m.instruction.as_str())
            .filter(|i| !i.is_empty() && seen.insert(*i))
            .collect()
    }
}
