use crate::diff::DiffResult;
use crate::source::FreshnessMarker;
use chrono::{DateTime, Utc};
use std::fmt::Write;

const UNKNOWN: &str = "Unknown";

/// Human-readable record of one run that fetched the list.
///
/// The rendered layout is consumed downstream and must stay stable: a block
/// of `# key: value` header lines, one blank line, then the new entries in
/// ascending order, one per line.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub title: String,
    pub source_url: String,
    pub generated_at: DateTime<Utc>,
    pub marker: Option<FreshnessMarker>,
    pub entries: Vec<String>,
}

impl RunReport {
    pub fn new(
        title: &str,
        source_url: &str,
        generated_at: DateTime<Utc>,
        marker: Option<FreshnessMarker>,
        diff: &DiffResult,
    ) -> Self {
        Self {
            title: title.to_string(),
            source_url: source_url.to_string(),
            generated_at,
            marker,
            entries: diff.sorted().into_iter().map(str::to_string).collect(),
        }
    }

    pub fn render(&self) -> String {
        let marker = self
            .marker
            .as_ref()
            .map_or(UNKNOWN.to_string(), |m| m.to_string());
        let epoch = self
            .marker
            .as_ref()
            .and_then(FreshnessMarker::epoch)
            .map_or(UNKNOWN.to_string(), |e| e.to_string());

        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = writeln!(out, "# New records added to {}", self.title);
        let _ = writeln!(out, "# Source: {}", self.source_url);
        let _ = writeln!(
            out,
            "# Last updated: {}",
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        let _ = writeln!(out, "# Blocklist Last-Modified: {}", marker);
        let _ = writeln!(out, "# Blocklist Last-Modified (epoch): {}", epoch);
        let _ = writeln!(out, "# Total new records: {}", self.entries.len());
        out.push('\n');

        for entry in &self.entries {
            out.push_str(entry);
            out.push('\n');
        }
        out
    }
}
