//! Hands a finished run to whatever renders it, as plain files in one directory:
//! a GeoJSON `FeatureCollection` of routes per provider, one of sampled
//! origin/destination points, `stats.json` and the full `run.json`.

use serde_json::{json, Value};
use std::{
    fs,
    io::Result as IoResult,
    path::{Path, PathBuf},
};

use super::area::Coordinate;
use super::compare::run::ComparisonRun;
use super::compare::stats::RunStats;

/// Writes every export file into `dir`, creating it if needed, and returns the paths written.
pub fn write_run<P: AsRef<Path>>(
    run: &ComparisonRun,
    stats: &RunStats,
    dir: P,
) -> IoResult<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let mut written = Vec::new();
    for provider_id in &run.provider_ids {
        let path = dir.join(format!("{provider_id}_routes.geojson"));
        write_json(&path, &routes_geojson(run, provider_id))?;
        written.push(path);
    }

    let path = dir.join("od_points.geojson");
    write_json(&path, &od_points_geojson(run))?;
    written.push(path);

    let path = dir.join("stats.json");
    write_json(&path, &serde_json::to_value(stats)?)?;
    written.push(path);

    let path = dir.join("run.json");
    write_json(&path, &serde_json::to_value(run)?)?;
    written.push(path);

    log::info!("Wrote {} export files to {}", written.len(), dir.display());
    Ok(written)
}

fn write_json(path: &Path, value: &Value) -> IoResult<()> {
    let data = serde_json::to_string_pretty(value)?;
    fs::write(path, data)
}

fn position(coord: &Coordinate) -> Value {
    json!([coord.longitude, coord.latitude])
}

/// Successful routes of one provider as LineString features.
pub fn routes_geojson(run: &ComparisonRun, provider_id: &str) -> Value {
    let features: Vec<Value> = run
        .results
        .iter()
        .filter_map(|result| {
            let route = result.route(provider_id)?;
            Some(json!({
                "type": "Feature",
                "geometry": {
                    "type": "LineString",
                    "coordinates": route.geometry().iter().map(position).collect::<Vec<_>>(),
                },
                "properties": {
                    "provider": provider_id,
                    "route_id": result.pair.id,
                    "distance": route.distance_m(),
                    "duration": route.duration_s(),
                    "instructions": route.unique_instructions(),
                    "strategy_fallback": route.strategy_fallback(),
                    "overlap": result.overlap_ratios.get(provider_id),
                },
            }))
        })
        .collect();

    json!({ "type": "FeatureCollection", "features": features })
}

/// Origin and destination of every sampled pair, settled or not.
pub fn od_points_geojson(run: &ComparisonRun) -> Value {
    let point = |coord: &Coordinate, route_id: usize, role: &str| {
        json!({
            "type": "Feature",
            "geometry": { "type": "Point", "coordinates": position(coord) },
            "properties": { "route_id": route_id, "role": role },
        })
    };
    let features: Vec<Value> = run
        .pairs
        .iter()
        .flat_map(|pair| {
            [
                point(&pair.origin, pair.id, "origin"),
                point(&pair.destination, pair.id, "destination"),
            ]
        })
        .collect();

    json!({ "type": "FeatureCollection", "features": features })
}
