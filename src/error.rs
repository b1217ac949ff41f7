use std::path::PathBuf;

/// Freshness probe failures. Never fatal: the run falls back to a full fetch.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("probe request failed: {0}")]
    Transport(String),

    #[error("probe returned HTTP {0}")]
    Status(u16),

    #[error("response carried no Last-Modified header")]
    MissingMarker,
}

/// Content retrieval failures. Fatal to the run.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("fetch request failed: {0}")]
    Transport(String),

    #[error("fetch returned HTTP {0}")]
    Status(u16),

    #[error("body exceeds the {limit} byte limit")]
    TooLarge { limit: u64 },

    #[error("body is not valid text: {0}")]
    InvalidBody(String),
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that abort a run. Anything else degrades to a safe default.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
