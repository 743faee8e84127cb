use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Unique document identifier, assigned when a file is first indexed
pub type DocumentId = u64;

/// Per-file term frequencies produced by the tokenizer
pub type TermFrequencies = HashMap<String, u64>;

/// Inverted index entry: how often one document contains a given term
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocumentId,
    pub frequency: u64,
}

impl Posting {
    pub fn new(doc_id: DocumentId, frequency: u64) -> Self {
        Self { doc_id, frequency }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_posting_construction() {
        let posting = Posting::new(7, 3);
        assert_eq!(posting.doc_id, 7);
        assert_eq!(posting.frequency, 3);
    }
}
