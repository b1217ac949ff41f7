use crate::diff::Snapshot;
use crate::error::StoreError;
use crate::source::FreshnessMarker;

/// Durable state carried from one run to the next.
///
/// Loads return `Ok(None)` when nothing has been stored yet. Each save
/// replaces the previous value as a whole.
#[async_trait::async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn load_marker(&self) -> Result<Option<FreshnessMarker>, StoreError>;

    async fn load_snapshot(&self) -> Result<Option<Snapshot>, StoreError>;

    async fn save_marker(&self, marker: &FreshnessMarker) -> Result<(), StoreError>;

    /// Forgets the stored marker so the next run fetches unconditionally.
    async fn clear_marker(&self) -> Result<(), StoreError>;

    async fn save_snapshot(&self, snapshot: &Snapshot) -> Result<(), StoreError>;

    /// Replaces the rendered run report.
    async fn save_report(&self, report: &str) -> Result<(), StoreError>;
}
