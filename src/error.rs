use thiserror::Error;

/// Main error type for ferrex operations
#[derive(Error, Debug)]
pub enum FerrexError {
    #[error("Search query must contain at least one term")]
    EmptyQuery,

    #[error("Indexing did not complete within {timeout_secs}s ({completed} of {submitted} files finished)")]
    IndexTimeout {
        timeout_secs: u64,
        submitted: usize,
        completed: usize,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for ferrex operations
pub type Result<T> = std::result::Result<T, FerrexError>;

impl FerrexError {
    /// Check if this error indicates invalid caller input rather than an
    /// engine fault
    pub fn is_validation(&self) -> bool {
        matches!(self, FerrexError::EmptyQuery)
    }
}
