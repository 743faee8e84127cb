//! Invariant checking framework for correctness verification
//!
//! This module provides the trait and concrete implementations for
//! checking system invariants against event histories.

use super::events::{OperationResult, OperationType};
use super::history::EventLog;
use crate::config::DEFAULT_MAX_RESULTS;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;

/// A violation of an invariant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    pub invariant: String,
    pub description: String,
    pub violating_events: Vec<usize>, // Indices into event log
    pub context: HashMap<String, String>,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "INVARIANT VIOLATION: {}", self.invariant)?;
        writeln!(f, "  Description: {}", self.description)?;
        writeln!(f, "  Violating events: {:?}", self.violating_events)?;
        if !self.context.is_empty() {
            writeln!(f, "  Context:")?;
            for (key, value) in &self.context {
                writeln!(f, "    {}: {}", key, value)?;
            }
        }
        Ok(())
    }
}

/// Trait for invariant checkers
pub trait Invariant: Send + Sync {
    /// Name of the invariant
    fn name(&self) -> &str;

    /// Check the invariant against an event log
    fn check(&self, log: &EventLog) -> Result<(), Violation>;

    /// Human-readable description
    fn description(&self) -> &str {
        "No description provided"
    }
}

/// Check all invariants and return violations
pub fn check_all_invariants(log: &EventLog, invariants: &[Box<dyn Invariant>]) -> Vec<Violation> {
    let mut violations = Vec::new();

    for invariant in invariants {
        if let Err(violation) = invariant.check(log) {
            violations.push(violation);
        }
    }

    violations
}

/// Invariant: Document IDs are never allocated twice
///
/// Every successful document registration must come back with an id
/// no earlier registration received.
pub struct UniqueDocumentIds;

impl Invariant for UniqueDocumentIds {
    fn name(&self) -> &str {
        "UniqueDocumentIds"
    }

    fn description(&self) -> &str {
        "Each document registration receives a fresh id"
    }

    fn check(&self, log: &EventLog) -> Result<(), Violation> {
        let events = log.completed_events();

        let mut seen: HashMap<u64, usize> = HashMap::new();

        for (idx, event) in events.iter().enumerate() {
            if let (
                OperationType::PutDocument { .. },
                Some(OperationResult::PutSuccess { doc_id }),
            ) = (&event.op_type, &event.result)
            {
                if let Some(&first_idx) = seen.get(doc_id) {
                    let mut context = HashMap::new();
                    context.insert("doc_id".to_string(), doc_id.to_string());
                    context.insert("first_event_idx".to_string(), first_idx.to_string());

                    return Err(Violation {
                        invariant: self.name().to_string(),
                        description: format!("Document id {} was allocated twice", doc_id),
                        violating_events: vec![first_idx, idx],
                        context,
                    });
                }
                seen.insert(*doc_id, idx);
            }
        }

        Ok(())
    }
}

/// Invariant: Registered documents resolve
///
/// Once a registration returned an id, a later lookup of that id must
/// find a path. Documents are never removed, so a miss is a bug.
pub struct IndexedDocumentRetrievable;

impl Invariant for IndexedDocumentRetrievable {
    fn name(&self) -> &str {
        "IndexedDocumentRetrievable"
    }

    fn description(&self) -> &str {
        "Every registered document id resolves to a path"
    }

    fn check(&self, log: &EventLog) -> Result<(), Violation> {
        let events = log.completed_events();

        let mut registered: HashSet<u64> = HashSet::new();

        for (idx, event) in events.iter().enumerate() {
            match (&event.op_type, &event.result) {
                (
                    OperationType::PutDocument { .. },
                    Some(OperationResult::PutSuccess { doc_id }),
                ) => {
                    registered.insert(*doc_id);
                }
                (
                    OperationType::GetDocument { doc_id },
                    Some(OperationResult::GetSuccess { path: None, .. }),
                ) => {
                    if registered.contains(doc_id) {
                        let mut context = HashMap::new();
                        context.insert("doc_id".to_string(), doc_id.to_string());
                        context.insert("event_index".to_string(), idx.to_string());

                        return Err(Violation {
                            invariant: self.name().to_string(),
                            description: format!(
                                "Document {} was registered but did not resolve",
                                doc_id
                            ),
                            violating_events: vec![idx],
                            context,
                        });
                    }
                }
                _ => {}
            }
        }

        Ok(())
    }
}

/// Invariant: A document id always resolves to the same path
///
/// The binding established at registration time never changes, and two
/// lookups of the same id never disagree.
pub struct StableDocumentPaths;

impl Invariant for StableDocumentPaths {
    fn name(&self) -> &str {
        "StableDocumentPaths"
    }

    fn description(&self) -> &str {
        "A document id resolves to the same path for its whole lifetime"
    }

    fn check(&self, log: &EventLog) -> Result<(), Violation> {
        let events = log.completed_events();

        // doc_id -> (path, event index that established the binding)
        let mut bindings: HashMap<u64, (String, usize)> = HashMap::new();

        for (idx, event) in events.iter().enumerate() {
            let observed = match (&event.op_type, &event.result) {
                (
                    OperationType::PutDocument { path },
                    Some(OperationResult::PutSuccess { doc_id }),
                ) => Some((*doc_id, path.clone())),
                (
                    OperationType::GetDocument { .. },
                    Some(OperationResult::GetSuccess {
                        doc_id,
                        path: Some(path),
                    }),
                ) => Some((*doc_id, path.clone())),
                _ => None,
            };

            if let Some((doc_id, path)) = observed {
                match bindings.get(&doc_id) {
                    Some((known, first_idx)) if known != &path => {
                        let mut context = HashMap::new();
                        context.insert("doc_id".to_string(), doc_id.to_string());
                        context.insert("expected_path".to_string(), known.clone());
                        context.insert("observed_path".to_string(), path);

                        return Err(Violation {
                            invariant: self.name().to_string(),
                            description: format!(
                                "Document {} changed paths between observations",
                                doc_id
                            ),
                            violating_events: vec![*first_idx, idx],
                            context,
                        });
                    }
                    Some(_) => {}
                    None => {
                        bindings.insert(doc_id, (path, idx));
                    }
                }
            }
        }

        Ok(())
    }
}

/// Invariant: Postings only accumulate
///
/// The index is append-only. For any term, a later lookup must contain
/// every posting an earlier lookup reported.
pub struct PostingsAppendOnly;

impl Invariant for PostingsAppendOnly {
    fn name(&self) -> &str {
        "PostingsAppendOnly"
    }

    fn description(&self) -> &str {
        "A term's postings never shrink between lookups"
    }

    fn check(&self, log: &EventLog) -> Result<(), Violation> {
        let events = log.completed_events();

        // term -> (posting multiset, event index of last lookup)
        let mut last_seen: HashMap<String, (HashMap<(u64, u64), usize>, usize)> = HashMap::new();

        for (idx, event) in events.iter().enumerate() {
            if let (
                OperationType::LookupIndex { term },
                Some(OperationResult::LookupSuccess { postings }),
            ) = (&event.op_type, &event.result)
            {
                let mut counts: HashMap<(u64, u64), usize> = HashMap::new();
                for posting in postings {
                    *counts.entry(*posting).or_insert(0) += 1;
                }

                if let Some((previous, prev_idx)) = last_seen.get(term) {
                    for (posting, &count) in previous {
                        if counts.get(posting).copied().unwrap_or(0) < count {
                            let mut context = HashMap::new();
                            context.insert("term".to_string(), term.clone());
                            context.insert(
                                "missing_posting".to_string(),
                                format!("{:?}", posting),
                            );

                            return Err(Violation {
                                invariant: self.name().to_string(),
                                description: format!(
                                    "Postings for term '{}' shrank between lookups",
                                    term
                                ),
                                violating_events: vec![*prev_idx, idx],
                                context,
                            });
                        }
                    }
                }

                last_seen.insert(term.clone(), (counts, idx));
            }
        }

        Ok(())
    }
}

/// Invariant: Search results respect the result limit and ranking
///
/// A search never returns more hits than the limit, and hits come back
/// in non-increasing frequency order.
pub struct SearchResultsBounded {
    pub limit: usize,
}

impl Invariant for SearchResultsBounded {
    fn name(&self) -> &str {
        "SearchResultsBounded"
    }

    fn description(&self) -> &str {
        "Search returns at most the configured number of hits, ranked by frequency"
    }

    fn check(&self, log: &EventLog) -> Result<(), Violation> {
        let events = log.completed_events();

        for (idx, event) in events.iter().enumerate() {
            if let (
                OperationType::Search { terms },
                Some(OperationResult::SearchSuccess { hits }),
            ) = (&event.op_type, &event.result)
            {
                if hits.len() > self.limit {
                    let mut context = HashMap::new();
                    context.insert("terms".to_string(), format!("{:?}", terms));
                    context.insert("hit_count".to_string(), hits.len().to_string());
                    context.insert("limit".to_string(), self.limit.to_string());

                    return Err(Violation {
                        invariant: self.name().to_string(),
                        description: format!(
                            "Search returned {} hits, limit is {}",
                            hits.len(),
                            self.limit
                        ),
                        violating_events: vec![idx],
                        context,
                    });
                }

                for pair in hits.windows(2) {
                    if pair[0].1 < pair[1].1 {
                        let mut context = HashMap::new();
                        context.insert("terms".to_string(), format!("{:?}", terms));
                        context.insert("out_of_order".to_string(), format!("{:?}", pair));

                        return Err(Violation {
                            invariant: self.name().to_string(),
                            description: "Search hits are not sorted by descending frequency"
                                .to_string(),
                            violating_events: vec![idx],
                            context,
                        });
                    }
                }
            }
        }

        Ok(())
    }
}

/// Invariant: Search hits come from indexed content
///
/// Every path a search returns must have entered the system earlier,
/// either as a direct registration or under an indexed folder.
pub struct SearchReflectsIndex;

impl Invariant for SearchReflectsIndex {
    fn name(&self) -> &str {
        "SearchReflectsIndex"
    }

    fn description(&self) -> &str {
        "Search only returns paths that were indexed"
    }

    fn check(&self, log: &EventLog) -> Result<(), Violation> {
        let events = log.completed_events();

        let mut put_paths: HashSet<String> = HashSet::new();
        let mut indexed_roots: Vec<String> = Vec::new();

        for (idx, event) in events.iter().enumerate() {
            match (&event.op_type, &event.result) {
                (
                    OperationType::PutDocument { path },
                    Some(OperationResult::PutSuccess { .. }),
                ) => {
                    put_paths.insert(path.clone());
                }
                (
                    OperationType::IndexFolder { root },
                    Some(OperationResult::IndexSuccess { .. }),
                ) => {
                    indexed_roots.push(root.clone());
                }
                (
                    OperationType::Search { .. },
                    Some(OperationResult::SearchSuccess { hits }),
                ) => {
                    for (path, _) in hits {
                        let known = put_paths.contains(path)
                            || indexed_roots
                                .iter()
                                .any(|root| Path::new(path).starts_with(root));
                        if !known {
                            let mut context = HashMap::new();
                            context.insert("path".to_string(), path.clone());
                            context.insert("search_event_idx".to_string(), idx.to_string());

                            return Err(Violation {
                                invariant: self.name().to_string(),
                                description: format!(
                                    "Search returned '{}' which was never indexed",
                                    path
                                ),
                                violating_events: vec![idx],
                                context,
                            });
                        }
                    }
                }
                _ => {}
            }
        }

        Ok(())
    }
}

/// Create the default set of invariants
pub fn default_invariants() -> Vec<Box<dyn Invariant>> {
    vec![
        Box::new(UniqueDocumentIds),
        Box::new(IndexedDocumentRetrievable),
        Box::new(StableDocumentPaths),
        Box::new(PostingsAppendOnly),
        Box::new(SearchResultsBounded {
            limit: DEFAULT_MAX_RESULTS,
        }),
        Box::new(SearchReflectsIndex),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn put(log: &EventLog, path: &str, doc_id: u64) {
        let op = log.record_invoke(OperationType::PutDocument {
            path: path.to_string(),
        });
        log.record_return(op, OperationResult::PutSuccess { doc_id });
    }

    fn get(log: &EventLog, doc_id: u64, path: Option<&str>) {
        let op = log.record_invoke(OperationType::GetDocument { doc_id });
        log.record_return(
            op,
            OperationResult::GetSuccess {
                doc_id,
                path: path.map(|p| p.to_string()),
            },
        );
    }

    fn lookup(log: &EventLog, term: &str, postings: Vec<(u64, u64)>) {
        let op = log.record_invoke(OperationType::LookupIndex {
            term: term.to_string(),
        });
        log.record_return(op, OperationResult::LookupSuccess { postings });
    }

    fn search(log: &EventLog, terms: &[&str], hits: Vec<(&str, u64)>) {
        let op = log.record_invoke(OperationType::Search {
            terms: terms.iter().map(|t| t.to_string()).collect(),
        });
        log.record_return(
            op,
            OperationResult::SearchSuccess {
                hits: hits
                    .into_iter()
                    .map(|(path, frequency)| (path.to_string(), frequency))
                    .collect(),
            },
        );
    }

    #[test]
    fn test_unique_document_ids_pass() {
        let log = EventLog::new();
        put(&log, "/docs/a.txt", 1);
        put(&log, "/docs/b.txt", 2);

        assert!(UniqueDocumentIds.check(&log).is_ok());
    }

    #[test]
    fn test_unique_document_ids_fail() {
        let log = EventLog::new();
        put(&log, "/docs/a.txt", 1);
        put(&log, "/docs/b.txt", 1);

        let result = UniqueDocumentIds.check(&log);
        assert!(result.is_err());

        if let Err(violation) = result {
            assert_eq!(violation.invariant, "UniqueDocumentIds");
            assert_eq!(violation.violating_events.len(), 2);
        }
    }

    #[test]
    fn test_indexed_document_retrievable_pass() {
        let log = EventLog::new();
        put(&log, "/docs/a.txt", 1);
        get(&log, 1, Some("/docs/a.txt"));
        // Unknown ids may miss
        get(&log, 99, None);

        assert!(IndexedDocumentRetrievable.check(&log).is_ok());
    }

    #[test]
    fn test_indexed_document_retrievable_fail() {
        let log = EventLog::new();
        put(&log, "/docs/a.txt", 1);
        get(&log, 1, None);

        let result = IndexedDocumentRetrievable.check(&log);
        assert!(result.is_err());

        if let Err(violation) = result {
            assert_eq!(violation.invariant, "IndexedDocumentRetrievable");
        }
    }

    #[test]
    fn test_stable_document_paths_fail() {
        let log = EventLog::new();
        put(&log, "/docs/a.txt", 1);
        get(&log, 1, Some("/docs/b.txt"));

        let result = StableDocumentPaths.check(&log);
        assert!(result.is_err());

        if let Err(violation) = result {
            assert_eq!(violation.invariant, "StableDocumentPaths");
            assert_eq!(violation.violating_events.len(), 2);
        }
    }

    #[test]
    fn test_postings_append_only_pass() {
        let log = EventLog::new();
        lookup(&log, "cat", vec![(1, 2)]);
        lookup(&log, "cat", vec![(1, 2), (2, 1)]);

        assert!(PostingsAppendOnly.check(&log).is_ok());
    }

    #[test]
    fn test_postings_append_only_fail() {
        let log = EventLog::new();
        lookup(&log, "cat", vec![(1, 2), (2, 1)]);
        lookup(&log, "cat", vec![(2, 1)]);

        let result = PostingsAppendOnly.check(&log);
        assert!(result.is_err());

        if let Err(violation) = result {
            assert_eq!(violation.invariant, "PostingsAppendOnly");
        }
    }

    #[test]
    fn test_search_results_bounded_pass() {
        let log = EventLog::new();
        search(&log, &["cat"], vec![("/docs/b.txt", 3), ("/docs/a.txt", 1)]);

        let invariant = SearchResultsBounded { limit: 10 };
        assert!(invariant.check(&log).is_ok());
    }

    #[test]
    fn test_search_results_bounded_fail_on_count() {
        let log = EventLog::new();
        let hits: Vec<(String, u64)> = (0..11)
            .map(|i| (format!("/docs/{}.txt", i), 1))
            .collect();
        let op = log.record_invoke(OperationType::Search {
            terms: vec!["cat".to_string()],
        });
        log.record_return(op, OperationResult::SearchSuccess { hits });

        let invariant = SearchResultsBounded { limit: 10 };
        assert!(invariant.check(&log).is_err());
    }

    #[test]
    fn test_search_results_bounded_fail_on_order() {
        let log = EventLog::new();
        search(&log, &["cat"], vec![("/docs/a.txt", 1), ("/docs/b.txt", 3)]);

        let invariant = SearchResultsBounded { limit: 10 };
        let result = invariant.check(&log);
        assert!(result.is_err());
    }

    #[test]
    fn test_search_reflects_index_pass() {
        let log = EventLog::new();
        put(&log, "/docs/a.txt", 1);
        search(&log, &["cat"], vec![("/docs/a.txt", 2)]);

        assert!(SearchReflectsIndex.check(&log).is_ok());
    }

    #[test]
    fn test_search_reflects_index_accepts_indexed_folders() {
        let log = EventLog::new();
        let op = log.record_invoke(OperationType::IndexFolder {
            root: "/docs".to_string(),
        });
        log.record_return(
            op,
            OperationResult::IndexSuccess {
                files_indexed: 2,
                bytes_read: 64,
                failures: 0,
            },
        );
        search(&log, &["cat"], vec![("/docs/sub/a.txt", 2)]);

        assert!(SearchReflectsIndex.check(&log).is_ok());
    }

    #[test]
    fn test_search_reflects_index_fail() {
        let log = EventLog::new();
        put(&log, "/docs/a.txt", 1);
        search(&log, &["cat"], vec![("/elsewhere/x.txt", 2)]);

        let result = SearchReflectsIndex.check(&log);
        assert!(result.is_err());

        if let Err(violation) = result {
            assert_eq!(violation.invariant, "SearchReflectsIndex");
        }
    }

    #[test]
    fn test_check_all_invariants() {
        let log = EventLog::new();
        put(&log, "/docs/a.txt", 1);
        get(&log, 1, Some("/docs/a.txt"));
        lookup(&log, "cat", vec![(1, 2)]);
        search(&log, &["cat"], vec![("/docs/a.txt", 2)]);

        let invariants = default_invariants();
        let violations = check_all_invariants(&log, &invariants);

        assert!(violations.is_empty(), "{:?}", violations);
    }

    #[test]
    fn test_violation_display() {
        let mut context = HashMap::new();
        context.insert("doc_id".to_string(), "42".to_string());

        let violation = Violation {
            invariant: "TestInvariant".to_string(),
            description: "Something went wrong".to_string(),
            violating_events: vec![1, 2, 3],
            context,
        };

        let display = format!("{}", violation);
        assert!(display.contains("TestInvariant"));
        assert!(display.contains("Something went wrong"));
        assert!(display.contains("doc_id"));
        assert!(display.contains("42"));
    }
}
