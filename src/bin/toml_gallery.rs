use anyhow::Context;
use clap::Parser;
use gallery_tools::config::toml_config::GalleryToml;
use gallery_tools::utils::{logger, validation::Validate};
use gallery_tools::{report_failure, run_stats_job, run_tile_job};

#[derive(Parser)]
#[command(name = "toml-gallery")]
#[command(about = "Run tile and stats jobs from a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "gallery.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Show what would be processed without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = GalleryToml::from_file(&args.config)
        .with_context(|| format!("Failed to load config file '{}'", args.config))?;

    // 依配置選擇日誌格式
    if config.json_logs() {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("📁 Loaded configuration from: {}", args.config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let monitor = args.monitor.unwrap_or_else(|| config.monitoring_enabled());

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        if let Some(tile) = &config.tile {
            tracing::info!("  tile: {:?}", tile);
        }
        if let Some(stats) = &config.stats {
            tracing::info!("  stats: {:?}", stats);
        }
        return Ok(());
    }

    let mut exit_code = 0;

    if let Some(tile) = config.tile.clone() {
        match run_tile_job(tile, monitor).await {
            Ok(outputs) => outputs.iter().for_each(|o| println!("✅ {}", o)),
            Err(e) => exit_code = exit_code.max(report_failure("tile", &e)),
        }
    }

    if let Some(stats) = config.stats.clone() {
        match run_stats_job(stats, monitor).await {
            Ok(outputs) => outputs.iter().for_each(|o| println!("✅ {}", o)),
            Err(e) => exit_code = exit_code.max(report_failure("stats", &e)),
        }
    }

    if exit_code > 0 {
        std::process::exit(exit_code);
    }

    Ok(())
}
