use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Single ranked search result: a document path and its aggregate
/// frequency across all query terms
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub path: PathBuf,
    pub frequency: u64,
}

impl SearchHit {
    pub fn new(path: PathBuf, frequency: u64) -> Self {
        Self { path, frequency }
    }
}

/// Outcome of a search call: wall-clock duration plus ranked hits,
/// already truncated to the configured result limit
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub elapsed: Duration,
    pub hits: Vec<SearchHit>,
}

/// A file the indexing pass could not process. The traversal and the
/// per-file read both report through this shape so one bad entry never
/// aborts the batch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexFailure {
    pub path: PathBuf,
    pub error: String,
}

impl IndexFailure {
    pub fn new(path: PathBuf, error: impl Into<String>) -> Self {
        Self {
            path,
            error: error.into(),
        }
    }
}

/// Outcome of an indexing pass over a folder
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IndexOutcome {
    pub elapsed: Duration,
    pub total_bytes_read: u64,
    pub files_indexed: usize,
    pub failures: Vec<IndexFailure>,
}

impl IndexOutcome {
    /// True when every discovered file was read and indexed
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
