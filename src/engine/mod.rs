mod engine;
mod pool;
mod walker;

pub mod instrumented;

pub use engine::ProcessingEngine;
pub use instrumented::InstrumentedEngine;
