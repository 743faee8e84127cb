pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod store;
pub mod testing;
pub mod tokenizer;

pub use config::{EngineConfig, TokenizerConfig};
pub use engine::{InstrumentedEngine, ProcessingEngine};
pub use error::{FerrexError, Result};
pub use models::*;
pub use store::IndexStore;
pub use tokenizer::Tokenizer;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
