//! Testing infrastructure for correctness verification
//!
//! This module provides:
//! - Event capture and history tracking
//! - Invariant checking framework
//! - Integration with the processing engine
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use ferrex::testing::prelude::*;
//! use ferrex::engine::InstrumentedEngine;
//!
//! // Wrap the engine for event capture
//! let instrumented = InstrumentedEngine::new(engine);
//!
//! // Perform operations (automatically captured)
//! instrumented.index_files("/docs")?;
//! instrumented.search_files(&["cat", "dog"])?;
//!
//! // Check invariants
//! let violations = instrumented.check_invariants(&default_invariants());
//! assert!(violations.is_empty());
//! ```
//!
//! # Invariants
//!
//! The following invariants are provided:
//!
//! - **UniqueDocumentIds**: No duplicate id allocation
//! - **IndexedDocumentRetrievable**: Registered document ids resolve to paths
//! - **StableDocumentPaths**: An id never changes paths between observations
//! - **PostingsAppendOnly**: A term's postings never shrink between lookups
//! - **SearchResultsBounded**: Searches honor the result limit and ranking order
//! - **SearchReflectsIndex**: Search hits only name paths that were indexed

pub mod events;
pub mod history;
pub mod invariants;

pub use events::{Event, OperationId, OperationResult, OperationType, Timestamp};
pub use history::EventLog;
pub use invariants::{
    check_all_invariants, default_invariants, IndexedDocumentRetrievable, Invariant,
    PostingsAppendOnly, SearchReflectsIndex, SearchResultsBounded, StableDocumentPaths,
    UniqueDocumentIds, Violation,
};

/// Prelude for easy imports
pub mod prelude {
    pub use super::events::*;
    pub use super::history::EventLog;
    pub use super::invariants::{
        check_all_invariants, default_invariants, Invariant, Violation,
    };
}
