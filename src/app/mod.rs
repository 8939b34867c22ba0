pub mod pipelines;

use crate::config::cli::LocalStorage;
use crate::core::engine::JobEngine;
use crate::core::{StatsJobConfig, TileJobConfig};
use crate::utils::error::{GalleryError, Result};
use pipelines::{StatsPipeline, TilePipeline};

/// Stitch tiles from the local filesystem.
pub async fn run_tile_job<C: TileJobConfig>(config: C, monitor: bool) -> Result<Vec<String>> {
    let source = LocalStorage::new(config.base_dir());
    let storage = LocalStorage::new(config.output_dir());
    let pipeline = TilePipeline::new(source, storage, config)?;
    JobEngine::new_with_monitoring(pipeline, monitor).run().await
}

/// Render query stats charts from a log on the local filesystem.
pub async fn run_stats_job<C: StatsJobConfig>(config: C, monitor: bool) -> Result<Vec<String>> {
    let source = LocalStorage::new("");
    let storage = LocalStorage::new(config.output_path());
    let pipeline = StatsPipeline::new(source, storage, config);
    JobEngine::new_with_monitoring(pipeline, monitor).run().await
}

/// Log a failed job and return the exit code for its severity.
pub fn report_failure(job: &str, e: &GalleryError) -> i32 {
    tracing::error!(
        "❌ {} failed: {} (Category: {:?}, Severity: {:?})",
        job,
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    e.severity().exit_code()
}
