//! Per-provider conversion of raw responses into [`Route`].
//!
//! Every function here is pure: it takes the deserialised body and either
//! returns a route in meters/seconds with origin-to-destination geometry and
//! a flat maneuver list, or classifies why it cannot.

use super::error::RoutingError;
use super::polyline::{decode_flexible, decode_polyline};
use super::provider::types::{
    GoogleDirections, GraphHopperResponse, HereResponse, OsrmManeuver, OsrmResponse,
};
use super::route::{Maneuver, Route};
use crate::sdk::area::Coordinate;

pub fn google(provider_id: &str, pair_id: usize, body: GoogleDirections) -> Result<Route, RoutingError> {
    let detail = || body.error_message.clone().unwrap_or_else(|| body.status.clone());
    match body.status.as_str() {
        "OK" => {}
        "ZERO_RESULTS" | "NOT_FOUND" => return Err(RoutingError::NoRoute(detail())),
        "OVER_QUERY_LIMIT" | "OVER_DAILY_LIMIT" => return Err(RoutingError::RateLimited(detail())),
        _ => return Err(RoutingError::Unavailable(detail())),
    }

    let route = body
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| RoutingError::NoRoute("status OK but no routes".to_string()))?;

    let geometry = decode_polyline(&route.overview_polyline.points, 5)?;

    let mut distance = 0.0;
    let mut duration = 0.0;
    let mut maneuvers = Vec::new();
    for leg in route.legs {
        distance += leg.distance.value;
        duration += leg.duration.value;
        maneuvers.extend(leg.steps.into_iter().map(|step| Maneuver {
            instruction: strip_html(&step.html_instructions),
            coordinate: Coordinate::new(step.start_location.lat, step.start_location.lng),
            distance_to_next_m: step.distance.value,
        }));
    }

    Route::new(provider_id, pair_id, geometry, distance, duration, maneuvers)
}

pub fn here(provider_id: &str, pair_id: usize, body: HereResponse) -> Result<Route, RoutingError> {
    let Some(route) = body.routes.into_iter().next() else {
        let reason = body
            .notices
            .iter()
            .map(|n| if n.title.is_empty() { n.code.as_str() } else { n.title.as_str() })
            .collect::<Vec<_>>()
            .join("; ");
        return Err(RoutingError::NoRoute(if reason.is_empty() {
            "no routes in response".to_string()
        } else {
            reason
        }));
    };

    let mut geometry: Vec<Coordinate> = Vec::new();
    let mut distance = 0.0;
    let mut duration = 0.0;
    let mut maneuvers = Vec::new();

    for section in route.sections {
        let points = decode_flexible(&section.polyline)?;
        distance += section.summary.length;
        duration += section.summary.duration;

        for action in section.actions {
            let coordinate = points
                .get(action.offset)
                .or_else(|| points.last())
                .copied()
                .ok_or_else(|| RoutingError::Malformed("section has an empty polyline".to_string()))?;
            maneuvers.push(Maneuver {
                instruction: action.instruction.unwrap_or(action.action),
                coordinate,
                distance_to_next_m: action.length,
            });
        }

        // consecutive sections share their junction point
        let skip = usize::from(geometry.last().is_some() && geometry.last() == points.first());
        geometry.extend(points.into_iter().skip(skip));
    }

    Route::new(provider_id, pair_id, geometry, distance, duration, maneuvers)
}

pub fn osrm(provider_id: &str, pair_id: usize, body: OsrmResponse) -> Result<Route, RoutingError> {
    let detail = || body.message.clone().unwrap_or_else(|| body.code.clone());
    match body.code.as_str() {
        "Ok" => {}
        "NoRoute" | "NoSegment" => return Err(RoutingError::NoRoute(detail())),
        "TooBig" | "InvalidQuery" | "InvalidValue" | "InvalidOptions" => {
            return Err(RoutingError::Malformed(detail()))
        }
        _ => return Err(RoutingError::Unavailable(detail())),
    }

    let route = body
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| RoutingError::NoRoute("code Ok but no routes".to_string()))?;

    let geometry = decode_polyline(&route.geometry, 5)?;
    let maneuvers = route
        .legs
        .into_iter()
        .flat_map(|leg| leg.steps)
        .map(|step| Maneuver {
            instruction: osrm_instruction(&step.maneuver, &step.name),
            coordinate: Coordinate::new(step.maneuver.location[1], step.maneuver.location[0]),
            distance_to_next_m: step.distance,
        })
        .collect();

    Route::new(provider_id, pair_id, geometry, route.distance, route.duration, maneuvers)
}

pub fn graphhopper(
    provider_id: &str,
    pair_id: usize,
    body: GraphHopperResponse,
) -> Result<Route, RoutingError> {
    let path = body.paths.into_iter().next().ok_or_else(|| {
        RoutingError::NoRoute(body.message.unwrap_or_else(|| "no paths in response".to_string()))
    })?;

    let geometry = path
        .points
        .coordinates
        .iter()
        .map(|c| match c.as_slice() {
            [lon, lat, ..] => Ok(Coordinate::new(*lat, *lon)),
            _ => Err(RoutingError::Malformed(format!("bad coordinate {c:?}"))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let maneuvers = path
        .instructions
        .into_iter()
        .filter_map(|instruction| {
            let coordinate = geometry
                .get(instruction.interval[0])
                .or_else(|| geometry.last())
                .copied()?;
            let text = if instruction.text.is_empty() {
                instruction.street_name
            } else {
                instruction.text
            };
            Some(Maneuver {
                instruction: text,
                coordinate,
                distance_to_next_m: instruction.distance,
            })
        })
        .collect();

    Route::new(provider_id, pair_id, geometry, path.distance, path.time / 1000.0, maneuvers)
}

/// Builds a readable sentence from an OSRM step, e.g. "Turn left onto Main Street".
fn osrm_instruction(maneuver: &OsrmManeuver, street: &str) -> String {
    if maneuver.kind == "depart" {
        return if street.is_empty() {
            "Depart".to_string()
        } else {
            format!("Head on {street}")
        };
    }
    if maneuver.kind == "arrive" {
        return "Arrive at destination".to_string();
    }

    let mut words: Vec<String> = maneuver
        .kind
        .split('_')
        .filter(|w| !w.is_empty())
        .map(capitalize)
        .collect();
    if let Some(modifier) = maneuver.modifier.as_deref() {
        words.push(modifier.to_string());
    }
    if !street.is_empty() {
        words.push(format!("onto {street}"));
    }
    words.join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Drops HTML tags and collapses whitespace.
fn strip_html(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => {
                in_tag = true;
                text.push(' ');
            }
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    text.replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
