use anyhow::Result;
use tracing::{error, info};

use blockwatch::config::Config;
use blockwatch::init::{build_tracker, setup_logging};
use blockwatch::tracker::RunOutcome;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load Config
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());
    let config_exists = std::path::Path::new(&config_path).exists();
    let config = if config_exists {
        Config::load(&config_path).await?
    } else {
        Config::default()
    };

    // 2. Setup Logging
    setup_logging(&config.logging);
    info!("Starting blockwatch run...");

    if !config_exists {
        info!("Config file {} not found, using defaults.", config_path);
    }

    // 3. Run once; scheduling is left to the caller
    let tracker = build_tracker(&config)?;
    match tracker.run().await {
        Ok(RunOutcome::Unchanged { marker }) => {
            info!("Blocklist unchanged since {}", marker);
            Ok(())
        }
        Ok(RunOutcome::Updated { new_entries, .. }) => {
            info!(
                "Process completed successfully: {} new records written to {}",
                new_entries,
                config.state.report_path.display()
            );
            Ok(())
        }
        Err(e) => {
            error!("Run failed, previous state left in place: {}", e);
            Err(e.into())
        }
    }
}
