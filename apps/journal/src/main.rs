//! Headless journal runner.
//!
//! Opens the journal, waits for the travel log to load and prints a summary.
//!
//! ```bash
//! skypass                      # platform config + data dirs
//! skypass ./skypass.toml       # explicit config file
//! SKYPASS_DB_PATH=:memory: skypass
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use skypass_app::config::{AppConfig, DEFAULT_LOG_FILTER};
use skypass_app::state::TravelLogUiState;
use skypass_app::{init_tracing, App};

const SETTLE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Summary {
    entries: usize,
    categories_in_use: Vec<String>,
    tags: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let log_filter = init_tracing(DEFAULT_LOG_FILTER);

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = AppConfig::load(config_path)?;
    log_filter.set_filter(config.log_filter());
    info!("Starting Skypass journal");

    let app = App::start(config).await?;
    let log = app.travel_log();

    let view = match tokio::time::timeout(SETTLE_TIMEOUT, log.settled()).await {
        Ok(view) => view,
        Err(_) => {
            warn!("Travel log did not load in time");
            log.view()
        }
    };

    if let TravelLogUiState::Error(message) = &view.state {
        warn!(%message, "Travel log failed to load");
    }

    let summary = Summary {
        entries: view.total,
        categories_in_use: log.live_categories().first().await?,
        tags: log.live_tags().first().await?.len(),
    };
    info!(
        entries = summary.entries,
        tags = summary.tags,
        "Journal loaded"
    );
    println!("{}", serde_json::to_string_pretty(&summary)?);

    drop(log);
    app.shutdown().await;
    Ok(())
}
