use crate::diff::Snapshot;
use crate::error::StoreError;
use crate::source::FreshnessMarker;
use crate::store::types::SnapshotStore;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StoredState {
    pub marker: Option<FreshnessMarker>,
    pub snapshot: Option<Snapshot>,
    pub report: Option<String>,
}

/// In-process store, mainly for exercising the tracker without a disk.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<StoredState>>,
    // Number of writes allowed before every further write fails.
    write_budget: Arc<RwLock<Option<usize>>>,
    unreadable: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: StoredState) -> Self {
        Self {
            state: Arc::new(RwLock::new(state)),
            write_budget: Arc::default(),
            unreadable: Arc::default(),
        }
    }

    pub fn state(&self) -> StoredState {
        self.state.read().unwrap().clone()
    }

    /// Lets `writes` more writes succeed, then fails the rest.
    pub fn fail_writes_after(&self, writes: usize) {
        *self.write_budget.write().unwrap() = Some(writes);
    }

    pub fn allow_writes(&self) {
        *self.write_budget.write().unwrap() = None;
    }

    /// Makes every load fail as if the stored state were corrupt.
    pub fn set_unreadable(&self, unreadable: bool) {
        self.unreadable.store(unreadable, Ordering::SeqCst);
    }

    fn read<T>(&self, name: &str, get: impl FnOnce(&StoredState) -> T) -> Result<T, StoreError> {
        if self.unreadable.load(Ordering::SeqCst) {
            return Err(StoreError::Read {
                path: PathBuf::from(name),
                source: io::Error::new(io::ErrorKind::InvalidData, "corrupt state"),
            });
        }
        Ok(get(&self.state.read().unwrap()))
    }

    fn write(&self, name: &str, apply: impl FnOnce(&mut StoredState)) -> Result<(), StoreError> {
        let mut budget = self.write_budget.write().unwrap();
        match budget.as_mut() {
            Some(0) => {
                return Err(StoreError::Write {
                    path: PathBuf::from(name),
                    source: io::Error::other("write rejected by memory store"),
                })
            }
            Some(remaining) => *remaining -= 1,
            None => {}
        }
        apply(&mut *self.state.write().unwrap());
        Ok(())
    }
}

#[async_trait::async_trait]
impl SnapshotStore for MemoryStore {
    async fn load_marker(&self) -> Result<Option<FreshnessMarker>, StoreError> {
        self.read("marker", |s| s.marker.clone())
    }

    async fn load_snapshot(&self) -> Result<Option<Snapshot>, StoreError> {
        self.read("snapshot", |s| s.snapshot.clone())
    }

    async fn save_marker(&self, marker: &FreshnessMarker) -> Result<(), StoreError> {
        self.write("marker", |s| s.marker = Some(marker.clone()))
    }

    async fn clear_marker(&self) -> Result<(), StoreError> {
        self.write("marker", |s| s.marker = None)
    }

    async fn save_snapshot(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        self.write("snapshot", |s| s.snapshot = Some(snapshot.clone()))
    }

    async fn save_report(&self, report: &str) -> Result<(), StoreError> {
        self.write("report", |s| s.report = Some(report.to_string()))
    }
}
