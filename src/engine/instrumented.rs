//! Instrumented engine wrapper for testing
//!
//! This module provides a wrapper around ProcessingEngine that
//! captures all operations for invariant verification.

use crate::engine::ProcessingEngine;
use crate::error::Result;
use crate::models::{DocumentId, IndexOutcome, Posting, SearchOutcome, TermFrequencies};
use crate::testing::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Wrapper around ProcessingEngine that captures events for testing
pub struct InstrumentedEngine {
    inner: Arc<ProcessingEngine>,
    event_log: EventLog,
}

impl InstrumentedEngine {
    /// Create a new instrumented wrapper around an engine
    pub fn new(inner: Arc<ProcessingEngine>) -> Self {
        Self {
            inner,
            event_log: EventLog::new(),
        }
    }

    /// Create with a pre-existing event log (for continuation testing)
    pub fn with_event_log(inner: Arc<ProcessingEngine>, event_log: EventLog) -> Self {
        Self { inner, event_log }
    }

    /// Get the event log for inspection
    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    /// Register a document with event capture
    pub fn put_document(&self, path: PathBuf) -> (OperationId, DocumentId) {
        let op_id = self.event_log.record_invoke(OperationType::PutDocument {
            path: path.display().to_string(),
        });

        let doc_id = self.inner.store().put_document(path);

        self.event_log
            .record_return(op_id, OperationResult::PutSuccess { doc_id });

        (op_id, doc_id)
    }

    /// Resolve a document id with event capture
    pub fn get_document(&self, doc_id: DocumentId) -> (OperationId, Option<PathBuf>) {
        let op_id = self
            .event_log
            .record_invoke(OperationType::GetDocument { doc_id });

        let path = self.inner.store().get_document(doc_id);

        self.event_log.record_return(
            op_id,
            OperationResult::GetSuccess {
                doc_id,
                path: path.as_ref().map(|p| p.display().to_string()),
            },
        );

        (op_id, path)
    }

    /// Apply an index update with event capture
    pub fn update_index(&self, doc_id: DocumentId, frequencies: TermFrequencies) -> OperationId {
        let mut terms: Vec<String> = frequencies.keys().cloned().collect();
        terms.sort();

        let op_id = self
            .event_log
            .record_invoke(OperationType::UpdateIndex { doc_id, terms });

        self.inner.store().update_index(doc_id, frequencies);

        self.event_log
            .record_return(op_id, OperationResult::UpdateSuccess { doc_id });

        op_id
    }

    /// Read a term's postings with event capture
    pub fn lookup_index(&self, term: &str) -> (OperationId, Vec<Posting>) {
        let op_id = self.event_log.record_invoke(OperationType::LookupIndex {
            term: term.to_string(),
        });

        let postings = self.inner.store().lookup_index(term);

        self.event_log.record_return(
            op_id,
            OperationResult::LookupSuccess {
                postings: postings.iter().map(|p| (p.doc_id, p.frequency)).collect(),
            },
        );

        (op_id, postings)
    }

    /// Index a folder with event capture
    pub fn index_files(&self, root: impl AsRef<Path>) -> Result<(OperationId, IndexOutcome)> {
        let root = root.as_ref();
        let op_id = self.event_log.record_invoke(OperationType::IndexFolder {
            root: root.display().to_string(),
        });

        match self.inner.index_files(root) {
            Ok(outcome) => {
                self.event_log.record_return(
                    op_id,
                    OperationResult::IndexSuccess {
                        files_indexed: outcome.files_indexed,
                        bytes_read: outcome.total_bytes_read,
                        failures: outcome.failures.len(),
                    },
                );
                Ok((op_id, outcome))
            }
            Err(e) => {
                self.event_log.record_return(
                    op_id,
                    OperationResult::Error {
                        message: e.to_string(),
                    },
                );
                Err(e)
            }
        }
    }

    /// Search with event capture
    pub fn search_files<S: AsRef<str>>(
        &self,
        terms: &[S],
    ) -> Result<(OperationId, SearchOutcome)> {
        let op_id = self.event_log.record_invoke(OperationType::Search {
            terms: terms.iter().map(|t| t.as_ref().to_string()).collect(),
        });

        match self.inner.search_files(terms) {
            Ok(outcome) => {
                self.event_log.record_return(
                    op_id,
                    OperationResult::SearchSuccess {
                        hits: outcome
                            .hits
                            .iter()
                            .map(|hit| (hit.path.display().to_string(), hit.frequency))
                            .collect(),
                    },
                );
                Ok((op_id, outcome))
            }
            Err(e) => {
                self.event_log.record_return(
                    op_id,
                    OperationResult::Error {
                        message: e.to_string(),
                    },
                );
                Err(e)
            }
        }
    }

    /// Check invariants against captured events
    pub fn check_invariants(&self, invariants: &[Box<dyn Invariant>]) -> Vec<Violation> {
        check_all_invariants(&self.event_log, invariants)
    }

    /// Check default invariants
    pub fn check_default_invariants(&self) -> Vec<Violation> {
        self.check_invariants(&default_invariants())
    }

    /// Access the inner engine
    pub fn inner(&self) -> &Arc<ProcessingEngine> {
        &self.inner
    }
}
