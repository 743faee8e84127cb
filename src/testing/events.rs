//! Event types for capturing operations in the system
//!
//! This module defines the event model used for invariant-based testing.
//! Events capture all operations with timing information for verification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationId(pub u64);

impl OperationId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

/// Type of operation in the system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OperationType {
    /// Register a document path in the store
    PutDocument { path: String },
    /// Resolve a document id back to its path
    GetDocument { doc_id: u64 },
    /// Merge one document's term frequencies into the index
    UpdateIndex { doc_id: u64, terms: Vec<String> },
    /// Read the postings recorded for a term
    LookupIndex { term: String },
    /// Index a whole folder through the engine
    IndexFolder { root: String },
    /// Multi-term search through the engine
    Search { terms: Vec<String> },
}

/// Result of an operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OperationResult {
    /// Document registered, id assigned
    PutSuccess { doc_id: u64 },
    /// Lookup of a document id, path when found
    GetSuccess { doc_id: u64, path: Option<String> },
    /// Index update applied
    UpdateSuccess { doc_id: u64 },
    /// Postings snapshot as (doc_id, frequency) pairs
    LookupSuccess { postings: Vec<(u64, u64)> },
    /// Folder indexing finished
    IndexSuccess {
        files_indexed: usize,
        bytes_read: u64,
        failures: usize,
    },
    /// Ranked hits as (path, frequency) pairs
    SearchSuccess { hits: Vec<(String, u64)> },
    /// Operation failed
    Error { message: String },
}

/// Timestamp wrapper for consistent time handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now().timestamp_nanos_opt().unwrap_or(0))
    }

    pub fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    pub fn as_nanos(&self) -> i64 {
        self.0
    }

    pub fn to_datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_nanos(self.0)
    }
}

/// A recorded event in the system
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique operation ID
    pub op_id: OperationId,

    /// Type of operation
    pub op_type: OperationType,

    /// When the operation was invoked
    pub invoke_time: Timestamp,

    /// When the operation returned (None if still pending)
    pub return_time: Option<Timestamp>,

    /// Result of the operation (None if still pending)
    pub result: Option<OperationResult>,
}

impl Event {
    /// Create a new event at invocation time
    pub fn invoke(op_id: OperationId, op_type: OperationType) -> Self {
        Self {
            op_id,
            op_type,
            invoke_time: Timestamp::now(),
            return_time: None,
            result: None,
        }
    }

    /// Mark event as completed
    pub fn complete(&mut self, result: OperationResult) {
        self.return_time = Some(Timestamp::now());
        self.result = Some(result);
    }

    /// Check if event is completed
    pub fn is_complete(&self) -> bool {
        self.return_time.is_some() && self.result.is_some()
    }

    /// Duration of the operation in nanoseconds
    pub fn duration_nanos(&self) -> Option<i64> {
        self.return_time.map(|rt| rt.0 - self.invoke_time.0)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Op({:?}) {:?} @ {} -> ",
            self.op_id, self.op_type, self.invoke_time.0
        )?;
        match &self.result {
            Some(result) => write!(f, "{:?} @ {:?}", result, self.return_time),
            None => write!(f, "<pending>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_creation_and_completion() {
        let op_id = OperationId::new(1);
        let mut event = Event::invoke(
            op_id,
            OperationType::PutDocument {
                path: "/docs/a.txt".to_string(),
            },
        );

        assert!(!event.is_complete());
        assert!(event.result.is_none());
        assert!(event.return_time.is_none());

        event.complete(OperationResult::PutSuccess { doc_id: 1 });

        assert!(event.is_complete());
        assert!(event.result.is_some());
        assert!(event.return_time.is_some());
    }

    #[test]
    fn test_timestamp_ordering() {
        let t1 = Timestamp::from_nanos(100);
        let t2 = Timestamp::from_nanos(200);

        assert!(t1 < t2);
        assert!(t2 > t1);
        assert_eq!(t1, Timestamp::from_nanos(100));
    }

    #[test]
    fn test_event_display_pending() {
        let event = Event::invoke(
            OperationId::new(7),
            OperationType::LookupIndex {
                term: "cat".to_string(),
            },
        );

        let rendered = format!("{}", event);
        assert!(rendered.contains("<pending>"));
        assert!(rendered.contains("cat"));
    }
}
