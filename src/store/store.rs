use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::models::{DocumentId, Posting, TermFrequencies};

/// Concurrent in-memory index state shared by all indexing workers and
/// search callers.
///
/// Two structures are kept, each synchronized on its own:
///
/// * the document map, `DocumentId -> PathBuf`, registering every file
///   handed to the indexer
/// * the inverted index, `term -> Vec<Posting>`, appended to as files
///   are tokenized
///
/// Identifiers are dense and start at 1. `put_document` reserves the id
/// with an atomic increment and inserts the path before returning, so
/// any id observable by a caller already resolves through
/// `get_document`. The two maps are not updated under a common lock. A
/// reader may therefore see a document before its postings arrive,
/// which searches tolerate by scoring only what the index holds.
pub struct IndexStore {
    documents: DashMap<DocumentId, PathBuf>,
    inverted_index: RwLock<HashMap<String, Vec<Posting>>>,
    doc_counter: AtomicU64,
}

impl IndexStore {
    pub fn new() -> Self {
        Self {
            documents: DashMap::new(),
            inverted_index: RwLock::new(HashMap::new()),
            doc_counter: AtomicU64::new(0),
        }
    }

    /// Register a file and return its freshly assigned identifier.
    ///
    /// Every call assigns a new id, including calls that repeat a path
    /// already registered. Re-indexing a folder therefore accumulates a
    /// second generation of documents and postings beside the first.
    pub fn put_document(&self, path: PathBuf) -> DocumentId {
        let doc_id = self.doc_counter.fetch_add(1, Ordering::Relaxed) + 1;
        self.documents.insert(doc_id, path);
        doc_id
    }

    /// Resolve an identifier back to the registered path.
    pub fn get_document(&self, doc_id: DocumentId) -> Option<PathBuf> {
        self.documents.get(&doc_id).map(|entry| entry.value().clone())
    }

    /// Merge one document's term frequencies into the inverted index.
    ///
    /// All postings for the document are appended under a single write
    /// lock acquisition, so a concurrent `lookup_index` sees either none
    /// or all of them.
    pub fn update_index(&self, doc_id: DocumentId, frequencies: TermFrequencies) {
        if frequencies.is_empty() {
            return;
        }
        let mut index = self.inverted_index.write();
        for (term, frequency) in frequencies {
            index
                .entry(term)
                .or_default()
                .push(Posting::new(doc_id, frequency));
        }
    }

    /// Snapshot the postings recorded for `term`.
    ///
    /// The returned vector is an owned copy. Later index writes never
    /// reach through it, and an unknown term yields an empty vector.
    pub fn lookup_index(&self, term: &str) -> Vec<Posting> {
        self.inverted_index
            .read()
            .get(term)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of registered documents.
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Number of distinct terms in the inverted index.
    pub fn term_count(&self) -> usize {
        self.inverted_index.read().len()
    }

    /// Total number of postings across all terms.
    pub fn posting_count(&self) -> usize {
        self.inverted_index
            .read()
            .values()
            .map(|postings| postings.len())
            .sum()
    }

    /// True when the document registered under `doc_id` is `path`.
    pub fn is_document(&self, doc_id: DocumentId, path: &Path) -> bool {
        self.documents
            .get(&doc_id)
            .map(|entry| entry.value() == path)
            .unwrap_or(false)
    }
}

impl Default for IndexStore {
    fn default() -> Self {
        Self::new()
    }
}
