//! Turning raw blocklist text into entry sets and subtracting them.

use rustc_hash::FxHashSet;
use serde::Deserialize;

/// What a run reports when there is no previous snapshot to compare against.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BootstrapPolicy {
    /// Record the current content as the baseline and report nothing.
    #[default]
    Baseline,
    /// Report every current entry as new.
    AllNew,
}

/// Full body of the remote list as captured by one fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    body: String,
}

impl Snapshot {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn entries(&self, comment_prefix: &str) -> FxHashSet<Box<str>> {
        parse_entries(&self.body, comment_prefix)
    }
}

fn parse_line<'a>(line: &'a str, comment_prefix: &str) -> Option<&'a str> {
    let line = line.trim();
    // Skip comments and empty lines
    if line.is_empty() || line.starts_with(comment_prefix) {
        return None;
    }
    Some(line)
}

/// Collects the distinct entries of a blocklist body.
///
/// Entries are compared as exact trimmed strings; no case folding or URL
/// canonicalization is applied.
pub fn parse_entries(text: &str, comment_prefix: &str) -> FxHashSet<Box<str>> {
    text.lines()
        .filter_map(|line| parse_line(line, comment_prefix))
        .map(Box::<str>::from)
        .collect()
}

/// Entries present in the current snapshot but not in the previous one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffResult {
    entries: FxHashSet<Box<str>>,
    bootstrap: bool,
}

impl DiffResult {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.entries.contains(entry)
    }

    /// True when there was no previous snapshot.
    pub fn is_bootstrap(&self) -> bool {
        self.bootstrap
    }

    pub fn sorted(&self) -> Vec<&str> {
        let mut entries: Vec<&str> = self.entries.iter().map(|e| e.as_ref()).collect();
        entries.sort_unstable();
        entries
    }
}

pub fn diff(
    previous: Option<&Snapshot>,
    current: &Snapshot,
    comment_prefix: &str,
    policy: BootstrapPolicy,
) -> DiffResult {
    let mut entries = current.entries(comment_prefix);

    match previous {
        Some(previous) => {
            let old = previous.entries(comment_prefix);
            entries.retain(|entry| !old.contains(entry));
            DiffResult {
                entries,
                bootstrap: false,
            }
        }
        None => {
            if policy == BootstrapPolicy::Baseline {
                entries.clear();
            }
            DiffResult {
                entries,
                bootstrap: true,
            }
        }
    }
}
