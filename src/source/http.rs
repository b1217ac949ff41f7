use super::{FetchedContent, FreshnessMarker, RemoteSource};
use crate::config::SourceConfig;
use crate::diff::Snapshot;
use crate::error::{FetchError, ProbeError};
use futures::StreamExt;
use reqwest::header::{HeaderMap, LAST_MODIFIED};
use reqwest::Client;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio_util::io::StreamReader;
use tracing::{debug, info};

/// Blocklist served over HTTP(S).
pub struct HttpSource {
    client: Client,
    url: String,
    probe_timeout: Duration,
    fetch_timeout: Duration,
    max_body_bytes: u64,
}

impl HttpSource {
    pub fn new(config: &SourceConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .connect_timeout(config.probe_timeout())
            .build()?;

        Ok(Self {
            client,
            url: config.url.clone(),
            probe_timeout: config.probe_timeout(),
            fetch_timeout: config.fetch_timeout(),
            max_body_bytes: config.max_body_bytes,
        })
    }

    fn marker_from(headers: &HeaderMap) -> Option<FreshnessMarker> {
        headers
            .get(LAST_MODIFIED)
            .and_then(|value| value.to_str().ok())
            .and_then(FreshnessMarker::parse)
    }
}

#[async_trait::async_trait]
impl RemoteSource for HttpSource {
    fn url(&self) -> &str {
        &self.url
    }

    async fn check_freshness(&self) -> Result<FreshnessMarker, ProbeError> {
        debug!("Checking Last-Modified header from {}", self.url);
        let resp = self
            .client
            .head(&self.url)
            .timeout(self.probe_timeout)
            .send()
            .await
            .map_err(|e| ProbeError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ProbeError::Status(status.as_u16()));
        }

        Self::marker_from(resp.headers()).ok_or(ProbeError::MissingMarker)
    }

    async fn fetch(&self) -> Result<FetchedContent, FetchError> {
        info!("Downloading blocklist from {}", self.url);
        let resp = self
            .client
            .get(&self.url)
            .timeout(self.fetch_timeout)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let limit = self.max_body_bytes;
        if resp.content_length().is_some_and(|len| len > limit) {
            return Err(FetchError::TooLarge { limit });
        }

        let marker = Self::marker_from(resp.headers());

        // Read one byte past the limit so an oversized body is detected, not truncated.
        let stream = resp
            .bytes_stream()
            .map(|result| result.map_err(std::io::Error::other));
        let mut reader = StreamReader::new(stream).take(limit.saturating_add(1));
        let mut body = Vec::new();
        reader
            .read_to_end(&mut body)
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        if body.len() as u64 > limit {
            return Err(FetchError::TooLarge { limit });
        }

        let body = String::from_utf8(body).map_err(|e| FetchError::InvalidBody(e.to_string()))?;
        info!("Downloaded {} bytes", body.len());

        Ok(FetchedContent {
            snapshot: Snapshot::new(body),
            marker,
        })
    }
}
