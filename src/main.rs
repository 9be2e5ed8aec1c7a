use anyhow::Context;
use clap::Parser;
use route_compare::sdk::{
    area::{preset_names, Area},
    compare::{aggregate, overlap::OverlapSettings, overlap::Projection, CancelToken, ComparisonOrchestrator},
    config::{ComparisonSettings, ProvidersConfig},
    export,
    routing::{build_providers, provider::google, Strategy},
    util::log::init_logging,
};
use std::{path::PathBuf, time::Duration};

const DEFAULT_PRESET: &str = "stuttgart-weilimdorf";

/// Samples random trips inside an area and compares how routing providers route them
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Sampling area as a bounding box
    #[arg(
        long,
        num_args = 4,
        value_names = ["MIN_LON", "MIN_LAT", "MAX_LON", "MAX_LAT"],
        allow_negative_numbers = true,
        conflicts_with = "preset"
    )]
    bbox: Option<Vec<f64>>,

    /// Named sampling area [default: stuttgart-weilimdorf]
    #[arg(long)]
    preset: Option<String>,

    /// Routing objective: shortest or fastest
    #[arg(long, default_value_t = Strategy::Fastest)]
    strategy: Strategy,

    /// Number of origin/destination pairs to sample
    #[arg(short = 'n', long, default_value_t = 5)]
    count: usize,

    /// Seed for reproducible sampling
    #[arg(long)]
    seed: Option<u64>,

    /// Provider the others are measured against [default: google, or the first configured]
    #[arg(long)]
    reference: Option<String>,

    /// Corridor buffer around the reference route, in meters
    #[arg(long, default_value_t = 30.0)]
    corridor_width: f64,

    /// Planar projection for overlap: utm or equirectangular
    #[arg(long, default_value = "utm")]
    projection: Projection,

    /// Maximum provider calls in flight
    #[arg(long, default_value_t = 6)]
    concurrency: usize,

    /// Per-call timeout in seconds
    #[arg(long, default_value_t = 15)]
    timeout_secs: u64,

    /// Minimum straight-line distance between origin and destination, in meters
    #[arg(long, default_value_t = 500.0)]
    min_separation: f64,

    /// Directory for GeoJSON and JSON output
    #[arg(short, long, default_value = "data")]
    out: PathBuf,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let area = match &cli.bbox {
        Some(b) => Area::from_bbox(b[0], b[1], b[2], b[3]).context("invalid --bbox")?,
        None => {
            let name = cli.preset.as_deref().unwrap_or(DEFAULT_PRESET);
            Area::preset(name).with_context(|| {
                format!(
                    "available presets: {}",
                    preset_names().collect::<Vec<_>>().join(", ")
                )
            })?
        }
    };

    let providers =
        build_providers(&ProvidersConfig::from_env()).context("failed to configure providers")?;
    let reference = match cli.reference {
        Some(reference) => reference,
        None if providers.iter().any(|p| p.id() == google::ID) => google::ID.to_string(),
        None => {
            let first = providers[0].id().to_string();
            log::warn!("Google is not configured; using '{}' as the reference", first);
            first
        }
    };

    let settings = ComparisonSettings {
        pair_count: cli.count,
        min_separation_m: cli.min_separation,
        call_timeout: Duration::from_secs(cli.timeout_secs),
        max_concurrency: cli.concurrency,
        overlap: OverlapSettings {
            corridor_width_m: cli.corridor_width,
            projection: cli.projection,
        },
        seed: cli.seed,
        ..Default::default()
    };
    let orchestrator = ComparisonOrchestrator::new(providers, &reference, settings)?;

    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::warn!("Interrupted, cancelling in-flight requests");
                cancel.cancel();
            }
        });
    }

    let run = orchestrator.run(&area, cli.strategy, &cancel).await;
    let stats = aggregate(&run);
    for provider in &stats.providers {
        log::info!(
            "{}: {} ok, {} failed, mean distance {}, mean overlap {}",
            provider.provider_id,
            provider.successes,
            provider.failures,
            provider
                .mean_distance_m
                .map_or("-".to_string(), |d| format!("{:.0} m", d)),
            provider
                .mean_overlap
                .map_or("-".to_string(), |o| format!("{:.1}%", o * 100.0)),
        );
    }

    export::write_run(&run, &stats, &cli.out)
        .with_context(|| format!("failed to write results to {}", cli.out.display()))?;
    Ok(())
}
