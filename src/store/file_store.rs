use crate::config::StateConfig;
use crate::diff::Snapshot;
use crate::error::StoreError;
use crate::source::FreshnessMarker;
use crate::store::types::SnapshotStore;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Keeps marker, snapshot and report as plain files.
pub struct FileStore {
    marker_path: PathBuf,
    snapshot_path: PathBuf,
    report_path: PathBuf,
}

impl FileStore {
    pub fn new(config: &StateConfig) -> Self {
        Self {
            marker_path: config.marker_path.clone(),
            snapshot_path: config.snapshot_path.clone(),
            report_path: config.report_path.clone(),
        }
    }

    async fn read_optional(path: &Path) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

#[async_trait::async_trait]
impl SnapshotStore for FileStore {
    async fn load_marker(&self) -> Result<Option<FreshnessMarker>, StoreError> {
        let Some(text) = Self::read_optional(&self.marker_path).await? else {
            return Ok(None);
        };
        let marker = FreshnessMarker::from_stored(&text);
        if marker.is_none() {
            warn!(
                "Ignoring unusable marker in {}: {:?}",
                self.marker_path.display(),
                text.trim()
            );
        }
        Ok(marker)
    }

    async fn load_snapshot(&self) -> Result<Option<Snapshot>, StoreError> {
        Ok(Self::read_optional(&self.snapshot_path)
            .await?
            .map(Snapshot::new))
    }

    async fn save_marker(&self, marker: &FreshnessMarker) -> Result<(), StoreError> {
        write_atomic(&self.marker_path, marker.as_str().as_bytes()).await
    }

    async fn clear_marker(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.marker_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Write {
                path: self.marker_path.clone(),
                source,
            }),
        }
    }

    async fn save_snapshot(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        write_atomic(&self.snapshot_path, snapshot.body().as_bytes()).await
    }

    async fn save_report(&self, report: &str) -> Result<(), StoreError> {
        write_atomic(&self.report_path, report.as_bytes()).await
    }
}

fn next_temp_suffix() -> u64 {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    COUNTER.fetch_add(1, Ordering::Relaxed)
}

fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "state".to_string());
    path.with_file_name(format!(
        ".{}.{}.{:x}.tmp",
        file_name,
        std::process::id(),
        next_temp_suffix()
    ))
}

/// Writes a sibling temp file and renames it over `path`, so readers see the
/// old contents or the new ones, never a torn file.
async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), StoreError> {
    let to_store_error = |source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.map_err(to_store_error)?;
    }

    let tmp = temp_path_for(path);
    let result: std::io::Result<()> = async {
        let mut file = fs::File::create(&tmp).await?;
        file.write_all(contents).await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(&tmp, path).await
    }
    .await;

    if let Err(e) = result {
        let _ = fs::remove_file(&tmp).await;
        return Err(to_store_error(e));
    }

    debug!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}
