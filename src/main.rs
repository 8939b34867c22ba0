use clap::{Parser, Subcommand};
use gallery_tools::utils::{logger, validation::Validate};
use gallery_tools::{report_failure, run_stats_job, run_tile_job, StatsConfig, TileConfig};

#[derive(Parser)]
#[command(name = "gallery-tools")]
#[command(about = "Tile stitching and query stats charts for the gallery demo")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Stitch a pyramid level into one preview image
    CreateTile(TileConfig),
    /// Render prefetch and half-blocks charts from a query log
    AnalyseStats(StatsConfig),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let (job, verbose, monitor) = match &cli.command {
        Command::CreateTile(c) => ("create-tile", c.verbose, c.monitor),
        Command::AnalyseStats(c) => ("analyse-stats", c.verbose, c.monitor),
    };

    // 初始化日誌
    logger::init_cli_logger(verbose);
    tracing::info!("Starting gallery-tools {}", job);

    let validation = match &cli.command {
        Command::CreateTile(c) => c.validate(),
        Command::AnalyseStats(c) => c.validate(),
    };
    if let Err(e) = validation {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let result = match cli.command {
        Command::CreateTile(config) => run_tile_job(config, monitor).await,
        Command::AnalyseStats(config) => run_stats_job(config, monitor).await,
    };

    match result {
        Ok(outputs) => {
            tracing::info!("✅ {} completed successfully!", job);
            for output in outputs {
                println!("📁 {}", output);
            }
        }
        Err(e) => {
            let exit_code = report_failure(job, &e);
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
