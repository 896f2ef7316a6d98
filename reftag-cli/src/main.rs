//! reftag - attribute a page load to a traffic source
//!
//! Writes data-layer pushes to stdout as JSON lines; logs go to stderr.

use anyhow::Result;
use clap::Parser;
use reftag_cli::{apply_configured_level, logging_subscriber, run, Args};
use reftag_common::TrackOutcome;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logging first; config resolution reports through it
    let (subscriber, level) = logging_subscriber(std::io::stderr);
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting reftag v{}", env!("CARGO_PKG_VERSION"));

    let config = match args.resolve_config() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load config: {}", e);
            return Err(e.into());
        }
    };
    apply_configured_level(&level, &config);
    info!("Data layer key: {}", config.data_layer_key);

    match run(&args, config, std::io::stdout()).await? {
        TrackOutcome::Emitted(entry) => info!("Emitted {}", entry.value),
        TrackOutcome::Skipped => info!("Nothing to attribute"),
        TrackOutcome::Failed(message) => error!("Tracking failed: {}", message),
    }

    Ok(())
}
