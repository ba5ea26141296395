//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;
use crate::validate::chunks_in_view;

/// Verdant command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "verdant", about = "Procedural terrain and vegetation streaming")]
pub struct CliArgs {
    /// World seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// View radius in chunks.
    #[arg(long)]
    pub view_radius: Option<u32>,

    /// Unload radius in chunks.
    #[arg(long)]
    pub unload_radius: Option<u32>,

    /// Maximum resident chunks.
    #[arg(long)]
    pub max_resident: Option<usize>,

    /// Maximum simultaneous chunk generations.
    #[arg(long)]
    pub max_concurrent: Option<usize>,

    /// Generation worker threads (0 = inline).
    #[arg(long)]
    pub workers: Option<usize>,

    /// Force discrete per-object placement instead of pooled instancing.
    #[arg(long)]
    pub cpu_fallback: Option<bool>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of frames to simulate.
    #[arg(long)]
    pub frames: Option<u32>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    ///
    /// Raising the view radius alone drags the unload radius and the
    /// residency cap along so the config stays valid.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(seed) = args.seed {
            self.world.seed = seed;
        }
        if let Some(radius) = args.view_radius {
            self.streaming.view_radius = radius;
            if args.unload_radius.is_none() && self.streaming.unload_radius < radius {
                self.streaming.unload_radius = radius + 1;
            }
        }
        if let Some(radius) = args.unload_radius {
            self.streaming.unload_radius = radius;
        }
        if let Some(max) = args.max_resident {
            self.streaming.max_resident_chunks = max;
        } else if args.view_radius.is_some() {
            let wanted = chunks_in_view(self.streaming.view_radius);
            self.streaming.max_resident_chunks = self.streaming.max_resident_chunks.max(wanted);
        }
        if let Some(max) = args.max_concurrent {
            self.streaming.max_concurrent = max;
        }
        if let Some(workers) = args.workers {
            self.streaming.worker_threads = workers;
        }
        if let Some(fallback) = args.cpu_fallback {
            self.instancing.force_cpu_fallback = fallback;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            seed: Some(5),
            workers: Some(2),
            cpu_fallback: Some(true),
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.world.seed, 5);
        assert_eq!(config.streaming.worker_threads, 2);
        assert!(config.instancing.force_cpu_fallback);
        // Non-overridden fields retain defaults
        assert_eq!(config.streaming.view_radius, 2);
        assert_eq!(config.world.chunk_size, 64.0);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_view_radius_override_keeps_unload_radius_valid() {
        let mut config = Config::default();
        let args = CliArgs {
            view_radius: Some(6),
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.streaming.view_radius, 6);
        assert_eq!(config.streaming.unload_radius, 7);
        assert_eq!(config.streaming.max_resident_chunks, 169, "13 x 13 chunks in view");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_explicit_max_resident_not_raised() {
        let mut config = Config::default();
        let args = CliArgs {
            view_radius: Some(6),
            max_resident: Some(100),
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.streaming.max_resident_chunks, 100);
        assert!(config.validate().is_err(), "an explicit cap below the view is an error");
    }

    #[test]
    fn test_small_view_radius_keeps_larger_cap() {
        let mut config = Config::default();
        let args = CliArgs {
            view_radius: Some(1),
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.streaming.max_resident_chunks, 64);
    }

    #[test]
    fn test_parse_from_args() {
        let args = CliArgs::parse_from(["verdant", "--seed", "11", "--view-radius", "1"]);
        assert_eq!(args.seed, Some(11));
        assert_eq!(args.view_radius, Some(1));
        assert!(args.frames.is_none());
    }
}
