use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::engine::{pool, walker};
use crate::error::{FerrexError, Result};
use crate::models::{DocumentId, IndexOutcome, SearchHit, SearchOutcome};
use crate::store::IndexStore;

/// Drives indexing and search over a shared [`IndexStore`].
///
/// `index_files` walks a folder, fans the files out over a fixed pool
/// of worker threads and reports totals once every file has been
/// processed. `search_files` scores documents by the sum of their
/// per-term frequencies and returns the best `max_results` hits.
pub struct ProcessingEngine {
    store: Arc<IndexStore>,
    config: EngineConfig,
}

impl ProcessingEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_store(Arc::new(IndexStore::new()), config)
    }

    /// Build an engine over an existing store, typically to share the
    /// store between callers.
    pub fn with_store(store: Arc<IndexStore>, config: EngineConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &Arc<IndexStore> {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Index every file under `root`.
    ///
    /// Files are discovered first, then processed in parallel. Both
    /// traversal errors and per-file read errors land in the outcome's
    /// failure list instead of aborting the batch. The elapsed time
    /// spans discovery through pool teardown.
    pub fn index_files(&self, root: impl AsRef<Path>) -> Result<IndexOutcome> {
        let root = root.as_ref();
        let started = Instant::now();

        let (files, mut failures) = walker::collect_files(root);
        debug!(
            root = %root.display(),
            files = files.len(),
            walk_failures = failures.len(),
            "collected files for indexing"
        );

        let pooled = pool::index_in_parallel(&self.store, &self.config, files)?;
        failures.extend(pooled.failures);

        let elapsed = started.elapsed();
        info!(
            files = pooled.files_indexed,
            bytes = pooled.total_bytes_read,
            failures = failures.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "indexing run complete"
        );

        Ok(IndexOutcome {
            elapsed,
            total_bytes_read: pooled.total_bytes_read,
            files_indexed: pooled.files_indexed,
            failures,
        })
    }

    /// Search for documents matching any of `terms`.
    ///
    /// Scores are the per-document sum of posting frequencies across
    /// all query terms. Results come back ordered by descending score,
    /// ties broken by ascending document id, truncated to the
    /// configured `max_results`.
    pub fn search_files<S: AsRef<str>>(&self, terms: &[S]) -> Result<SearchOutcome> {
        if terms.is_empty() {
            return Err(FerrexError::EmptyQuery);
        }

        let started = Instant::now();

        let mut scores: HashMap<DocumentId, u64> = HashMap::new();
        for term in terms {
            let needle = if self.config.tokenizer_config.lowercase {
                term.as_ref().to_ascii_lowercase()
            } else {
                term.as_ref().to_string()
            };
            for posting in self.store.lookup_index(&needle) {
                *scores.entry(posting.doc_id).or_insert(0) += posting.frequency;
            }
        }

        let ranked = collect_top_hits(scores, self.config.max_results);
        let hits: Vec<SearchHit> = ranked
            .into_iter()
            .filter_map(|entry| {
                self.store
                    .get_document(entry.doc_id)
                    .map(|path| SearchHit::new(path, entry.frequency))
            })
            .collect();

        debug!(terms = terms.len(), hits = hits.len(), "search complete");

        Ok(SearchOutcome {
            elapsed: started.elapsed(),
            hits,
        })
    }
}

/// Keep the `top_k` best scores without sorting the full score map.
fn collect_top_hits(scores: HashMap<DocumentId, u64>, top_k: usize) -> Vec<ScoreEntry> {
    if top_k == 0 || scores.is_empty() {
        return Vec::new();
    }

    let mut heap: BinaryHeap<Reverse<ScoreEntry>> = BinaryHeap::new();
    for (doc_id, frequency) in scores {
        let entry = ScoreEntry { frequency, doc_id };
        if heap.len() < top_k {
            heap.push(Reverse(entry));
        } else if let Some(min) = heap.peek() {
            if entry > min.0 {
                heap.pop();
                heap.push(Reverse(entry));
            }
        }
    }

    let mut results = Vec::with_capacity(heap.len());
    while let Some(Reverse(entry)) = heap.pop() {
        results.push(entry);
    }
    results.sort_by(|a, b| b.cmp(a));
    results
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct ScoreEntry {
    frequency: u64,
    doc_id: DocumentId,
}

// Higher frequency wins; on equal frequency the lower document id wins.
impl Ord for ScoreEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.frequency
            .cmp(&other.frequency)
            .then_with(|| other.doc_id.cmp(&self.doc_id))
    }
}

impl PartialOrd for ScoreEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
