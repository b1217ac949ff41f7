use super::FreshnessMarker;
use crate::diff::Snapshot;
use crate::error::{FetchError, ProbeError};

/// Result of a full download of the remote list.
#[derive(Debug, Clone)]
pub struct FetchedContent {
    pub snapshot: Snapshot,
    /// Last-Modified of the GET response itself, if the server sent one.
    pub marker: Option<FreshnessMarker>,
}

/// The remote list being watched.
#[async_trait::async_trait]
pub trait RemoteSource: Send + Sync {
    fn url(&self) -> &str;

    /// Cheap metadata-only check. Failure here only costs a full fetch.
    async fn check_freshness(&self) -> Result<FreshnessMarker, ProbeError>;

    async fn fetch(&self) -> Result<FetchedContent, FetchError>;
}
