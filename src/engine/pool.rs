use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam::channel::{self, RecvTimeoutError};
use tracing::{debug, warn};

use crate::config::{EngineConfig, DEFAULT_INDEX_TIMEOUT_SECS};
use crate::error::{FerrexError, Result};
use crate::models::IndexFailure;
use crate::store::IndexStore;
use crate::tokenizer::Tokenizer;

/// Result of indexing one file.
#[derive(Debug)]
pub(crate) enum TaskOutcome {
    Indexed { bytes_read: u64 },
    Failed { path: PathBuf, error: String },
}

/// Totals gathered from one pool run.
#[derive(Debug, Default)]
pub(crate) struct PoolOutcome {
    pub total_bytes_read: u64,
    pub files_indexed: usize,
    pub failures: Vec<IndexFailure>,
}

/// Index one file end to end.
///
/// The document is registered before the file is read, so a read
/// failure still leaves a document entry behind while contributing no
/// bytes and no postings. Contents are decoded lossily, keeping binary
/// files from failing the task.
pub(crate) fn index_one_file(
    store: &IndexStore,
    tokenizer: &Tokenizer,
    path: PathBuf,
) -> TaskOutcome {
    let doc_id = store.put_document(path.clone());

    let bytes = match fs::read(&path) {
        Ok(bytes) => bytes,
        Err(err) => {
            return TaskOutcome::Failed {
                path,
                error: err.to_string(),
            }
        }
    };

    let contents = String::from_utf8_lossy(&bytes);
    let frequencies = tokenizer.compute_term_frequencies(&contents);
    store.update_index(doc_id, frequencies);

    TaskOutcome::Indexed {
        bytes_read: bytes.len() as u64,
    }
}

/// Run the fixed worker pool over `files` and gather per-file outcomes.
///
/// Workers pull paths from a shared channel and push a `TaskOutcome`
/// per file, each thread carrying its own tokenizer. The caller waits
/// for exactly one outcome per submitted file, bounded by the
/// configured timeout. On timeout the receiver is dropped, which makes
/// the workers' next send fail and retires them without joining.
pub(crate) fn index_in_parallel(
    store: &Arc<IndexStore>,
    config: &EngineConfig,
    files: Vec<PathBuf>,
) -> Result<PoolOutcome> {
    let submitted = files.len();
    if submitted == 0 {
        return Ok(PoolOutcome::default());
    }

    let (task_tx, task_rx) = channel::unbounded::<PathBuf>();
    let (outcome_tx, outcome_rx) = channel::unbounded::<TaskOutcome>();

    let mut workers = Vec::with_capacity(config.worker_threads);
    for _ in 0..config.worker_threads {
        let task_rx = task_rx.clone();
        let outcome_tx = outcome_tx.clone();
        let store = Arc::clone(store);
        let tokenizer_config = config.tokenizer_config.clone();

        workers.push(thread::spawn(move || {
            // Dedicated tokenizer per worker thread
            let tokenizer = Tokenizer::new(&tokenizer_config);
            while let Ok(path) = task_rx.recv() {
                let outcome = index_one_file(&store, &tokenizer, path);
                if outcome_tx.send(outcome).is_err() {
                    break;
                }
            }
        }));
    }
    drop(task_rx);
    drop(outcome_tx);

    for path in files {
        // Workers hold the receiver until the task channel disconnects,
        // so sends only fail if every worker already exited.
        if task_tx.send(path).is_err() {
            break;
        }
    }
    drop(task_tx);

    // A timeout too large to land on a representable deadline saturates
    // to the default bound
    let deadline = Instant::now()
        .checked_add(config.index_timeout())
        .unwrap_or(Instant::now() + Duration::from_secs(DEFAULT_INDEX_TIMEOUT_SECS));
    let mut outcome = PoolOutcome::default();
    let mut completed = 0usize;

    while completed < submitted {
        match outcome_rx.recv_deadline(deadline) {
            Ok(TaskOutcome::Indexed { bytes_read }) => {
                outcome.total_bytes_read += bytes_read;
                outcome.files_indexed += 1;
                completed += 1;
            }
            Ok(TaskOutcome::Failed { path, error }) => {
                warn!(path = %path.display(), error = %error, "failed to index file");
                outcome.failures.push(IndexFailure::new(path, error));
                completed += 1;
            }
            Err(RecvTimeoutError::Timeout) => {
                return Err(FerrexError::IndexTimeout {
                    timeout_secs: config.index_timeout_secs,
                    submitted,
                    completed,
                });
            }
            Err(RecvTimeoutError::Disconnected) => {
                return Err(FerrexError::Internal(format!(
                    "indexing workers exited after {} of {} files",
                    completed, submitted
                )));
            }
        }
    }

    for worker in workers {
        if worker.join().is_err() {
            return Err(FerrexError::Internal(
                "indexing worker panicked".to_string(),
            ));
        }
    }

    debug!(
        files = outcome.files_indexed,
        failures = outcome.failures.len(),
        bytes = outcome.total_bytes_read,
        "worker pool drained"
    );

    Ok(outcome)
}
