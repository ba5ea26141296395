//! Headless demo that streams terrain and vegetation around a moving viewpoint.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p verdant-demo` to fly the default path.
//! Run with `cargo run -p verdant-demo -- --frames 2000 --workers 4` for a longer
//! flight on worker threads.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use glam::DVec3;
use verdant_assets::{CachingAssetProvider, CatalogAssetProvider};
use verdant_config::{CliArgs, Config};
use verdant_instancing::RendererCapabilities;
use verdant_streaming::{StreamingEngine, StreamingStats};
use verdant_terrain::TerrainGenerator;

const DEFAULT_FRAMES: u32 = 600;
/// Optional mesh manifest next to `config.ron`.
const MANIFEST_FILE: &str = "assets.ron";
/// Viewpoint height above the terrain surface.
const EYE_HEIGHT: f64 = 12.0;

/// Viewpoint flight: a long sweep along +x with a slow weave in z.
struct Flight {
    speed: f64,
    weave: f64,
    period: f64,
}

impl Flight {
    fn new(chunk_size: f64) -> Self {
        Self {
            speed: chunk_size / 16.0,
            weave: chunk_size * 3.0,
            period: 240.0,
        }
    }

    fn ground_position(&self, frame: u32) -> (f64, f64) {
        let t = f64::from(frame);
        let x = t * self.speed;
        let z = self.weave * (t / self.period * std::f64::consts::TAU).sin();
        (x, z)
    }
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Resolve config directory
    let config_dir = args.config.clone().unwrap_or_else(|| {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("verdant")
    });

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    verdant_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    let assets = match load_assets(&config_dir, &config) {
        Ok(assets) => assets,
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let mut engine = match StreamingEngine::new(&config, RendererCapabilities::default(), assets)
    {
        Ok(engine) => engine,
        Err(e) => {
            tracing::error!(error = %e, "failed to start streaming");
            return ExitCode::FAILURE;
        }
    };

    let frames = args.frames.unwrap_or(DEFAULT_FRAMES);
    let flight = Flight::new(config.world.chunk_size);
    let interval = config.debug.stats_interval;
    let started = Instant::now();

    for frame in 0..frames {
        let (x, z) = flight.ground_position(frame);
        let viewpoint = DVec3::new(x, engine.height_at(x, z) + EYE_HEIGHT, z);
        let report = engine.tick(viewpoint);

        if report.lifecycle.moved {
            tracing::debug!(
                frame,
                center = %report.lifecycle.center,
                biome = engine.biome_name_at(x, z),
                "viewpoint entered new chunk"
            );
        }
        if interval > 0 && (frame + 1) % interval == 0 {
            log_stats(frame + 1, &engine.stats());
        }
    }

    let (x, z) = flight.ground_position(frames);
    let settle = DVec3::new(x, engine.height_at(x, z) + EYE_HEIGHT, z);
    match engine.run_until_quiescent(settle, 10_000) {
        Some(ticks) => tracing::info!(ticks, "streaming settled"),
        None => tracing::warn!("streaming did not settle before exit"),
    }

    let stats = engine.stats();
    log_stats(frames, &stats);
    let usage: Vec<_> = engine
        .sink()
        .usage()
        .into_iter()
        .filter(|u| u.live > 0)
        .map(|u| serde_json::json!({ "asset": u.name, "live": u.live, "capacity": u.capacity }))
        .collect();
    let summary = serde_json::json!({
        "seed": config.world.seed,
        "frames": frames,
        "elapsed_ms": started.elapsed().as_millis() as u64,
        "sink": format!("{:?}", engine.sink_mode()),
        "backend": format!("{:?}", engine.backend_kind()),
        "stats": stats_json(&stats),
        "pools": usage,
    });
    match serde_json::to_string_pretty(&summary) {
        Ok(text) => println!("{text}"),
        Err(e) => tracing::warn!("failed to encode summary: {e}"),
    }

    ExitCode::SUCCESS
}

/// Meshes come from `assets.ron` when present, otherwise from placeholder
/// meshes for every asset id the world can place.
fn load_assets(
    config_dir: &Path,
    config: &Config,
) -> Result<CachingAssetProvider<CatalogAssetProvider>, String> {
    let manifest = config_dir.join(MANIFEST_FILE);
    let catalog = if manifest.exists() {
        let catalog = CatalogAssetProvider::load_manifest(&manifest)
            .map_err(|e| format!("failed to load {}: {e}", manifest.display()))?;
        tracing::info!(path = %manifest.display(), meshes = catalog.len(), "loaded asset manifest");
        catalog
    } else {
        let terrain = TerrainGenerator::from_config(config)
            .map_err(|e| format!("invalid biome configuration: {e}"))?;
        let ids = terrain.asset_ids();
        tracing::info!(meshes = ids.len(), "using placeholder meshes");
        CatalogAssetProvider::with_placeholders(ids.iter().map(String::as_str))
    };
    Ok(CachingAssetProvider::new(catalog))
}

fn log_stats(frame: u32, stats: &StreamingStats) {
    tracing::info!(
        frame,
        queued = stats.queued,
        loading = stats.loading,
        ready = stats.ready,
        finalized = stats.finalized_total,
        evicted = stats.evicted_total,
        instances = stats.live_instances,
        "streaming stats"
    );
}

fn stats_json(stats: &StreamingStats) -> serde_json::Value {
    serde_json::json!({
        "ticks": stats.ticks,
        "queued": stats.queued,
        "loading": stats.loading,
        "ready": stats.ready,
        "finalized": stats.finalized_total,
        "cancelled": stats.cancelled_total,
        "evicted": stats.evicted_total,
        "asset_failures": stats.asset_failures,
        "pool_overflows": stats.pool_overflows,
        "deferred": stats.deferred_total,
        "live_instances": stats.live_instances,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flight_starts_at_origin_and_advances() {
        let flight = Flight::new(64.0);
        assert_eq!(flight.ground_position(0), (0.0, 0.0));
        let (x, _) = flight.ground_position(160);
        assert_eq!(x, 640.0, "ten chunks after 160 frames");
    }

    #[test]
    fn test_flight_weave_is_bounded() {
        let flight = Flight::new(64.0);
        for frame in 0..1000 {
            let (_, z) = flight.ground_position(frame);
            assert!(z.abs() <= 192.0 + 1e-9, "z = {z} at frame {frame}");
        }
    }

    #[test]
    fn test_placeholder_assets_without_manifest() {
        let dir = std::env::temp_dir().join("verdant-demo-no-manifest");
        let config = Config::default();
        let assets = load_assets(&dir, &config).unwrap();
        assert!(!assets.inner().is_empty());
    }
}
