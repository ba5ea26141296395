//! Startup capability detection: pick the pooled or discrete sink once.

use verdant_config::InstancingConfig;

use crate::{DiscreteSink, InstanceSink, PoolLayout, PooledSink};

/// What the renderer can do, as reported by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RendererCapabilities {
    /// Instanced draws from a transform buffer are available.
    pub supports_instancing: bool,
    /// Largest instance buffer the renderer accepts, in bytes.
    pub max_instance_buffer_bytes: u64,
}

impl RendererCapabilities {
    /// A renderer without instancing support.
    pub fn cpu_only() -> Self {
        Self {
            supports_instancing: false,
            max_instance_buffer_bytes: 0,
        }
    }
}

impl Default for RendererCapabilities {
    fn default() -> Self {
        Self {
            supports_instancing: true,
            max_instance_buffer_bytes: 128 * 1024 * 1024,
        }
    }
}

/// Which sink implementation is active.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SinkMode {
    /// Per-asset transform pools, drawn in batches.
    Pooled,
    /// One scene node per placement.
    Discrete,
}

/// Decide the sink mode. Pooled needs instancing support, every pool buffer
/// within the renderer's limit, and no forced fallback.
pub fn choose_mode(
    capabilities: &RendererCapabilities,
    config: &InstancingConfig,
    layout: &PoolLayout,
) -> SinkMode {
    if config.force_cpu_fallback {
        tracing::info!("CPU fallback forced by config");
        return SinkMode::Discrete;
    }
    if !capabilities.supports_instancing {
        tracing::info!("renderer lacks instancing, using CPU fallback");
        return SinkMode::Discrete;
    }
    let needed = layout.max_buffer_bytes();
    if needed > capabilities.max_instance_buffer_bytes {
        tracing::warn!(
            needed,
            limit = capabilities.max_instance_buffer_bytes,
            "largest instance pool exceeds renderer buffer limit, using CPU fallback"
        );
        return SinkMode::Discrete;
    }
    SinkMode::Pooled
}

/// Build the sink chosen by [`choose_mode`].
pub fn create_sink(
    capabilities: &RendererCapabilities,
    config: &InstancingConfig,
    layout: PoolLayout,
) -> Box<dyn InstanceSink + Send> {
    let mode = choose_mode(capabilities, config, &layout);
    tracing::info!(?mode, asset_types = layout.len(), "instance sink selected");
    match mode {
        SinkMode::Pooled => Box::new(PooledSink::new(layout)),
        SinkMode::Discrete => Box::new(DiscreteSink::new(layout)),
    }
}
