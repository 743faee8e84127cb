pub mod document;
pub mod search;

pub use document::{DocumentId, Posting, TermFrequencies};
pub use search::{IndexFailure, IndexOutcome, SearchHit, SearchOutcome};
