pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use app::pipelines::{StatsPipeline, TilePipeline};
pub use app::{report_failure, run_stats_job, run_tile_job};
pub use config::{cli::LocalStorage, toml_config::GalleryToml, StatsConfig, TileConfig};
pub use core::engine::JobEngine;
pub use utils::error::{GalleryError, Result};
