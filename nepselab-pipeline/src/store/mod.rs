//! File-system stores.
//!
//! - [`StoreLayout`] maps dates to raw, cleaned, featured and historical paths
//! - [`JsonlStore`] is a typed newline-delimited JSON file
//! - [`StoreLock`] is the single-writer guard held for a whole run

pub mod jsonl;
pub mod layout;
pub mod lock;

use std::path::PathBuf;

use thiserror::Error;

pub use jsonl::JsonlStore;
pub use layout::StoreLayout;
pub use lock::StoreLock;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed record at {path}:{line}: {source}")]
    Malformed {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("store is locked by another run ({0})")]
    Locked(PathBuf),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
