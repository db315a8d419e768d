//! Submission Store — the append-only collection every plagiarism query reads.
//!
//! The collection is the single source of truth: there is no secondary index,
//! so reads and writes always move the whole sequence.
//!
//! `AppState` holds an `Arc<dyn SubmissionStore>`; `JsonFileStore` is the
//! default backend.

pub mod json_file;

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::submission::Submission;

pub use json_file::JsonFileStore;

#[derive(Debug, Error)]
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

    #[error("malformed submission store {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode submissions: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("store task aborted: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Repository interface over the submission collection.
///
/// Implementations must make `append` an atomic read-modify-write with
/// respect to other callers of the same store.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Adds `submission` after every existing record and persists the collection.
    /// A store that has never been written is treated as empty.
    async fn append(&self, submission: Submission) -> Result<(), StoreError>;

    /// Returns every stored submission in append order (empty if none exist).
    async fn load_all(&self) -> Result<Vec<Submission>, StoreError>;
}
