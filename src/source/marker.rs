use chrono::{DateTime, Utc};
use std::fmt;

const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Last-Modified value as the server sent it, plus its instant when it parses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreshnessMarker {
    raw: String,
    epoch: Option<i64>,
}

impl FreshnessMarker {
    /// Returns `None` for blank input. Unparseable dates are kept as opaque text.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        Some(Self {
            raw: raw.to_string(),
            epoch: parse_http_date(raw),
        })
    }

    pub fn from_epoch(epoch: i64) -> Option<Self> {
        let dt = DateTime::<Utc>::from_timestamp(epoch, 0)?;
        Some(Self {
            raw: dt.format(HTTP_DATE_FORMAT).to_string(),
            epoch: Some(epoch),
        })
    }

    /// Reads a persisted marker. Older state files hold a bare epoch.
    pub fn from_stored(text: &str) -> Option<Self> {
        let text = text.trim();
        match text.parse::<i64>() {
            Ok(epoch) => Self::from_epoch(epoch),
            Err(_) => Self::parse(text),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn epoch(&self) -> Option<i64> {
        self.epoch
    }

    /// Same instant when both sides parsed, same text otherwise.
    pub fn matches(&self, other: &FreshnessMarker) -> bool {
        match (self.epoch, other.epoch) {
            (Some(a), Some(b)) => a == b,
            _ => self.raw == other.raw,
        }
    }
}

/// Parses an HTTP-date, ignoring a weekday that disagrees with the date.
fn parse_http_date(raw: &str) -> Option<i64> {
    DateTime::parse_from_rfc2822(raw)
        .or_else(|e| match raw.split_once(',') {
            Some((_, rest)) => DateTime::parse_from_rfc2822(rest.trim_start()),
            None => Err(e),
        })
        .ok()
        .map(|dt| dt.timestamp())
}

impl fmt::Display for FreshnessMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
