use clap::Parser;
use gallery_tools::utils::{logger, validation::Validate};
use gallery_tools::{report_failure, run_stats_job, StatsConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = StatsConfig::parse();

    logger::init_cli_logger(config.verbose);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let monitor = config.monitor;
    match run_stats_job(config, monitor).await {
        Ok(outputs) => {
            for output in outputs {
                println!("✅ Saved {}", output);
            }
        }
        Err(e) => {
            let exit_code = report_failure("analyse_query_stats", &e);
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
