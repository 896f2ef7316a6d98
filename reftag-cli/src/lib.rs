//! reftag-cli library - page-load harness for the tagging core
//!
//! Plays the part of the host page: builds the visit environment from
//! command-line flags, runs the tracker once, and streams data-layer pushes
//! as JSON lines.

use clap::Parser;
use reftag_common::config::{ConfigResolver, TaggingConfig};
use reftag_common::emitter::ChannelEmitter;
use reftag_common::environment::StaticEnvironment;
use reftag_common::tracker::Tracker;
use reftag_common::{DataLayerEntry, TrackOutcome};
use std::io::Write;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::warn;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{reload, EnvFilter, Registry};

/// Swaps the active log filter after the config is loaded
pub type LevelHandle = reload::Handle<EnvFilter, Registry>;

/// Subscriber filtered by `RUST_LOG` (default `info`)
///
/// Installed before the config is resolved so that resolution warnings are
/// not lost; [`apply_configured_level`] narrows it afterwards.
pub fn logging_subscriber<W>(
    writer: W,
) -> (impl tracing::Subscriber + Send + Sync + 'static, LevelHandle)
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (filter, handle) = reload::Layer::new(filter);
    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(writer));
    (subscriber, handle)
}

/// Switch to `logging.level` from the config; RUST_LOG wins when set
pub fn apply_configured_level(handle: &LevelHandle, config: &TaggingConfig) {
    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        return;
    }
    match EnvFilter::try_new(&config.logging.level) {
        Ok(filter) => {
            if let Err(e) = handle.reload(filter) {
                warn!("Failed to apply log level: {}", e);
            }
        }
        Err(e) => warn!("Invalid log level '{}': {}", config.logging.level, e),
    }
}

/// Attribute one page load to a traffic source
#[derive(Debug, Clone, Parser)]
#[command(name = "reftag", version)]
pub struct Args {
    /// Config file (overrides REFTAG_CONFIG and the user config dir)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Referring URL; omit for a visit without referrer
    #[arg(long, env = "REFTAG_REFERRER")]
    pub referrer: Option<String>,

    /// Query string of the landing page, with or without leading '?'
    #[arg(long, env = "REFTAG_QUERY", default_value = "")]
    pub query: String,

    /// Raw session event counter; omit on the first page view
    #[arg(long, env = "REFTAG_EVENT_COUNT")]
    pub event_count: Option<String>,

    /// Identifier already recorded in the data layer for this session
    #[arg(long, env = "REFTAG_RECORDED_ID")]
    pub recorded_id: Option<String>,
}

impl Args {
    pub fn resolve_config(&self) -> reftag_common::Result<TaggingConfig> {
        ConfigResolver::new(self.config.clone()).resolve()
    }

    /// Page and session state as the host would expose it
    pub fn environment(&self, config: &TaggingConfig) -> StaticEnvironment {
        let mut env = StaticEnvironment::new(self.referrer.as_deref(), &self.query);
        if let Some(count) = &self.event_count {
            env = env.with_session_item(&config.session_counter_key, count);
        }
        if let Some(id) = &self.recorded_id {
            env = env.with_recorded_value(&config.data_layer_key, id);
        }
        env
    }
}

/// Write each received push as one JSON line until all senders are gone
pub async fn drain_to_writer<W: Write>(
    mut rx: mpsc::UnboundedReceiver<DataLayerEntry>,
    mut out: W,
) -> anyhow::Result<usize> {
    let mut written = 0;
    while let Some(entry) = rx.recv().await {
        serde_json::to_writer(&mut out, &entry)?;
        writeln!(out)?;
        written += 1;
    }
    out.flush()?;
    Ok(written)
}

/// Run one tracking attempt and stream its pushes to `out`
pub async fn run<W: Write + Send + 'static>(
    args: &Args,
    config: TaggingConfig,
    out: W,
) -> anyhow::Result<TrackOutcome> {
    let env = args.environment(&config);
    let tracker = Tracker::new(config);

    let (emitter, rx) = ChannelEmitter::new();
    let writer = tokio::spawn(drain_to_writer(rx, out));

    let outcome = tracker.run(&env, &emitter);
    drop(emitter);

    writer.await??;
    Ok(outcome)
}
