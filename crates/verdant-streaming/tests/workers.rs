//! Streaming with generation on worker threads.

use glam::DVec3;
use verdant_assets::CatalogAssetProvider;
use verdant_config::Config;
use verdant_instancing::RendererCapabilities;
use verdant_lod::ChunkCoord;
use verdant_streaming::{BackendKind, ChunkState, StreamingEngine};
use verdant_terrain::TerrainGenerator;

const MAX_TICKS: usize = 2_000;

fn config(workers: usize) -> Config {
    let mut config = Config::default();
    config.streaming.view_radius = 1;
    config.streaming.unload_radius = 2;
    config.streaming.worker_threads = workers;
    config
}

fn engine(config: &Config) -> StreamingEngine {
    let terrain = TerrainGenerator::from_config(config).unwrap();
    let ids = terrain.asset_ids();
    let assets = CatalogAssetProvider::with_placeholders(ids.iter().map(String::as_str));
    StreamingEngine::new(config, RendererCapabilities::default(), assets).unwrap()
}

fn at(config: &Config, x: i32, z: i32) -> DVec3 {
    let size = config.world.chunk_size;
    DVec3::new((x as f64 + 0.5) * size, 12.0, (z as f64 + 0.5) * size)
}

#[test]
fn test_workers_converge_like_inline() {
    let threaded_config = config(2);
    let mut threaded = engine(&threaded_config);
    assert!(matches!(threaded.backend_kind(), BackendKind::Workers(_)));

    let inline_config = config(0);
    let mut inline = engine(&inline_config);
    assert_eq!(inline.backend_kind(), BackendKind::Inline);

    threaded
        .run_until_quiescent(at(&threaded_config, 2, -1), MAX_TICKS)
        .expect("worker streaming must settle");
    inline
        .run_until_quiescent(at(&inline_config, 2, -1), MAX_TICKS)
        .unwrap();

    assert_eq!(threaded.ready_chunks(), inline.ready_chunks());
    for coord in inline.ready_chunks() {
        assert_eq!(
            threaded.chunk(coord).unwrap().placements,
            inline.chunk(coord).unwrap().placements,
            "placements differ at {coord}"
        );
    }
    assert_eq!(threaded.sink().total_live(), inline.sink().total_live());
}

#[test]
fn test_loading_chunks_finish_before_eviction() {
    let config = config(2);
    let mut engine = engine(&config);

    // One tick dispatches work; then jump far away before it finishes.
    engine.tick(at(&config, 0, 0));
    let loading: Vec<ChunkCoord> = [(0, 0), (1, 0), (-1, 0), (0, 1), (0, -1)]
        .into_iter()
        .map(ChunkCoord::from)
        .filter(|c| engine.chunk_state(*c) == ChunkState::Loading)
        .collect();
    assert!(!loading.is_empty());

    let report = engine.tick(at(&config, 20, 20));
    assert!(report.lifecycle.cancelled > 0, "queued chunks are cancelled");
    for coord in &loading {
        assert_ne!(
            engine.chunk_state(*coord),
            ChunkState::Unloaded,
            "{coord} was mid-generation and must not be cancelled"
        );
    }

    engine
        .run_until_quiescent(at(&config, 20, 20), MAX_TICKS)
        .unwrap();
    for coord in &loading {
        assert_eq!(engine.chunk_state(*coord), ChunkState::Unloaded);
    }
    assert_eq!(engine.ready_chunks().len(), 9);
}

#[test]
fn test_reset_with_work_in_flight() {
    let config = config(2);
    let mut engine = engine(&config);

    engine.tick(at(&config, 0, 0));
    engine.reset();
    assert!(engine.ready_chunks().is_empty());

    engine
        .run_until_quiescent(at(&config, 0, 0), MAX_TICKS)
        .unwrap();
    assert_eq!(engine.ready_chunks().len(), 9);

    let live_in_records: usize = engine
        .ready_chunks()
        .into_iter()
        .map(|c| engine.chunk(c).unwrap().handles.len())
        .sum();
    assert_eq!(
        engine.sink().total_live(),
        live_in_records,
        "plans from before the reset must not place instances"
    );
}
