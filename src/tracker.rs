//! One incremental run: probe, fetch, diff, report, persist.

use crate::config::Config;
use crate::diff::{diff, BootstrapPolicy};
use crate::error::TrackerError;
use crate::report::RunReport;
use crate::source::{FreshnessMarker, RemoteSource};
use crate::store::SnapshotStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The remote marker matched the stored one; nothing was fetched or written.
    Unchanged { marker: FreshnessMarker },
    /// The list was fetched and the report and state were rewritten.
    Updated {
        new_entries: usize,
        bootstrap: bool,
        marker: Option<FreshnessMarker>,
    },
}

pub struct Tracker {
    source: Arc<dyn RemoteSource>,
    store: Arc<dyn SnapshotStore>,
    title: String,
    comment_prefix: String,
    bootstrap: BootstrapPolicy,
}

impl Tracker {
    pub fn new(
        config: &Config,
        source: Arc<dyn RemoteSource>,
        store: Arc<dyn SnapshotStore>,
    ) -> Self {
        Self {
            source,
            store,
            title: config.source.name.clone(),
            comment_prefix: config.diff.comment_prefix.clone(),
            bootstrap: config.diff.bootstrap,
        }
    }

    pub async fn run(&self) -> Result<RunOutcome, TrackerError> {
        self.run_at(Utc::now()).await
    }

    /// Runs once, stamping the report with `now`.
    ///
    /// Nothing is written until the fetch has succeeded and the new report is
    /// rendered. Then the report, the marker and finally the snapshot are
    /// replaced, so an interrupted run never advances the baseline past
    /// entries that no report has shown.
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<RunOutcome, TrackerError> {
        let stored_marker = self.store.load_marker().await.unwrap_or_else(|e| {
            warn!("Stored marker unreadable, treating as absent: {}", e);
            None
        });
        let previous = self.store.load_snapshot().await.unwrap_or_else(|e| {
            warn!("Stored snapshot unreadable, treating as first run: {}", e);
            None
        });

        let probed = match self.source.check_freshness().await {
            Ok(marker) => {
                info!("Current Last-Modified: {}", marker);
                Some(marker)
            }
            Err(e) => {
                warn!("Freshness check unavailable, fetching anyway: {}", e);
                None
            }
        };

        if let (Some(stored), Some(current), Some(_)) = (&stored_marker, &probed, &previous) {
            if stored.matches(current) {
                info!("No changes detected (Last-Modified unchanged)");
                return Ok(RunOutcome::Unchanged {
                    marker: current.clone(),
                });
            }
        }

        let fetched = self.source.fetch().await?;
        let marker = probed.or(fetched.marker);

        let result = diff(
            previous.as_ref(),
            &fetched.snapshot,
            &self.comment_prefix,
            self.bootstrap,
        );
        if result.is_bootstrap() {
            info!(
                "No previous snapshot, bootstrap policy {:?} reports {} entries",
                self.bootstrap,
                result.len()
            );
        } else {
            info!("Found {} new records", result.len());
        }

        let report = RunReport::new(
            &self.title,
            self.source.url(),
            now,
            marker.clone(),
            &result,
        )
        .render();

        self.store.save_report(&report).await?;
        match &marker {
            Some(marker) => self.store.save_marker(marker).await?,
            None => {
                warn!("No Last-Modified available; next run will fetch unconditionally");
                self.store.clear_marker().await?
            }
        }
        // Baseline goes last: until it is replaced, later diffs still see
        // every entry of this run as new.
        self.store.save_snapshot(&fetched.snapshot).await?;

        info!("Saved {} new records", result.len());
        Ok(RunOutcome::Updated {
            new_entries: result.len(),
            bootstrap: result.is_bootstrap(),
            marker,
        })
    }
}
