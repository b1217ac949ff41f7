//! Initialization helpers for the application startup.

use crate::config::{Config, LoggingConfig};
use crate::source::HttpSource;
use crate::store::FileStore;
use crate::tracker::Tracker;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

/// Sets up the tracing subscriber with the configured filters.
pub fn setup_logging(config: &LoggingConfig) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let mut filter = config.level.clone();

        // Keep HTTP client internals quiet unless explicitly enabled
        for noisy in ["hyper", "hyper_util", "reqwest", "rustls"] {
            if !filter.contains(noisy) {
                filter.push_str(&format!(",{}=warn", noisy));
            }
        }

        tracing_subscriber::EnvFilter::new(filter)
    });

    let builder = tracing_subscriber::fmt().with_env_filter(env_filter);
    if config.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Wires the HTTP source and the file-backed store into a tracker.
pub fn build_tracker(config: &Config) -> Result<Tracker> {
    let source = HttpSource::new(&config.source).context("Failed to build HTTP client")?;
    let store = FileStore::new(&config.state);
    info!(
        "Tracking {} (state: {}, {}, report: {})",
        config.source.url,
        config.state.marker_path.display(),
        config.state.snapshot_path.display(),
        config.state.report_path.display()
    );
    Ok(Tracker::new(config, Arc::new(source), Arc::new(store)))
}
