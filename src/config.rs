use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default number of ranked results returned by a search
pub const DEFAULT_MAX_RESULTS: usize = 10;

/// Default upper bound on a single indexing run
pub const DEFAULT_INDEX_TIMEOUT_SECS: u64 = 3600;

/// Engine configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineConfig {
    pub worker_threads: usize,
    pub max_results: usize,
    pub index_timeout_secs: u64,
    pub tokenizer_config: TokenizerConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            worker_threads: num_cpus::get(),
            max_results: DEFAULT_MAX_RESULTS,
            index_timeout_secs: DEFAULT_INDEX_TIMEOUT_SECS,
            tokenizer_config: TokenizerConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Set the number of worker threads used during indexing.
    ///
    /// One worker is a valid, fully sequential configuration; zero is
    /// clamped to one.
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads.max(1);
        self
    }

    /// Set the number of ranked results a search may return
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Set the upper bound on a single indexing run
    pub fn with_index_timeout_secs(mut self, secs: u64) -> Self {
        self.index_timeout_secs = secs;
        self
    }

    /// Upper bound on a single indexing run as a `Duration`
    pub fn index_timeout(&self) -> Duration {
        Duration::from_secs(self.index_timeout_secs)
    }
}

/// Tokenizer configuration
///
/// By default tokens shorter than three characters are dropped and
/// surviving tokens are lowercased before counting.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenizerConfig {
    pub lowercase: bool,
    pub min_token_length: usize,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            lowercase: true,
            min_token_length: 3,
        }
    }
}
