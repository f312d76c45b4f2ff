//! sened-hybrid
//!
//! Fusion layer over the keyword and vector indices: shared indexing
//! entry point, merged search with post-merge filters, snippets, and the
//! verify/rebuild reconciliation path.

pub mod engine;
pub mod snippet;

pub use engine::{DocumentEngine, SearchOptions};
