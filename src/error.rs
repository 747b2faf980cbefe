use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StubError {
    #[error("Extension \"{0}\" does not exist")]
    ExtensionNotFound(String),

    #[error("failed to load snapshot {}: {source}", path.display())]
    Snapshot {
        path: PathBuf,
        #[source]
        source: SnapshotError,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A namespace, class or extension name that cannot be used as a path segment
    #[error("refusing to write stubs for unsafe name {0:?}")]
    UnsafePath(String),
}

/// Why a snapshot document could not be loaded
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
