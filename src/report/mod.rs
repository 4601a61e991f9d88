//! Report module - prediction cards, batch summaries and exports

pub mod export;
pub mod prediction;
pub mod summary;

pub use export::*;
pub use prediction::*;
pub use summary::*;
