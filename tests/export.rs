use std::fs;
use std::sync::Arc;

use route_compare::sdk::area::Area;
use route_compare::sdk::compare::{aggregate, CancelToken, ComparisonOrchestrator, NoopProgress};
use route_compare::sdk::export::write_run;
use route_compare::sdk::routing::Strategy;
use serde_json::Value;

mod common;
use common::{providers, settings, Script, ScriptedProvider};

fn read(path: &std::path::Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[tokio::test]
async fn writes_geojson_and_stats() {
    let a = Arc::new(ScriptedProvider::new("a", Script::StraightLine));
    let b = Arc::new(ScriptedProvider::new("b", Script::Unavailable));
    let orchestrator = ComparisonOrchestrator::new(providers(vec![a, b]), "a", settings())
        .unwrap()
        .with_progress(Arc::new(NoopProgress));
    let run = orchestrator
        .run(&Area::preset("unit-box").unwrap(), Strategy::Fastest, &CancelToken::new())
        .await;
    let stats = aggregate(&run);

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("data");
    let written = write_run(&run, &stats, &out).unwrap();
    assert_eq!(written.len(), 5);

    let routes = read(&out.join("a_routes.geojson"));
    assert_eq!(routes["type"], "FeatureCollection");
    let features = routes["features"].as_array().unwrap();
    assert_eq!(features.len(), 5);
    let first = &features[0];
    assert_eq!(first["geometry"]["type"], "LineString");
    assert_eq!(first["properties"]["route_id"], 0);
    // GeoJSON positions are [lon, lat]
    let origin = run.pairs[0].origin;
    assert_eq!(first["geometry"]["coordinates"][0][0], origin.longitude);
    assert_eq!(first["geometry"]["coordinates"][0][1], origin.latitude);

    let failed = read(&out.join("b_routes.geojson"));
    assert!(failed["features"].as_array().unwrap().is_empty());

    let points = read(&out.join("od_points.geojson"));
    assert_eq!(points["features"].as_array().unwrap().len(), 10);
    assert_eq!(points["features"][1]["properties"]["role"], "destination");

    let stats_json = read(&out.join("stats.json"));
    assert_eq!(stats_json["reference_id"], "a");
    assert_eq!(stats_json["providers"][1]["failures_by_kind"]["provider_unavailable"], 5);

    let run_json = read(&out.join("run.json"));
    assert_eq!(run_json["results"].as_array().unwrap().len(), 5);
    assert_eq!(run_json["results"][0]["outcomes"]["b"]["status"], "failure");
    assert_eq!(run_json["results"][0]["outcomes"]["b"]["kind"], "provider_unavailable");
    assert_eq!(run_json["strategy"], "fastest");
}
