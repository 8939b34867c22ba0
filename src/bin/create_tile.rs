// Create a preview image for gallery navigation from a tile pyramid.
// Usage: create_tile ~/dir/to/progressive_map/ --factor 32 --dim 500

use clap::Parser;
use gallery_tools::utils::{logger, validation::Validate};
use gallery_tools::{report_failure, run_tile_job, TileConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = TileConfig::parse();

    logger::init_cli_logger(config.verbose);
    tracing::info!("base_dir {}", config.base_dir);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let monitor = config.monitor;
    match run_tile_job(config, monitor).await {
        Ok(outputs) => {
            for output in outputs {
                println!("✅ Saved {}", output);
            }
        }
        Err(e) => {
            let exit_code = report_failure("create_tile", &e);
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
