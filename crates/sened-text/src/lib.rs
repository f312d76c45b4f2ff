//! sened-text
//!
//! Keyword search over document titles, content and tags. One tantivy
//! index with a multilingual analyzer; ids are u64 terms so upserts and
//! removals stay idempotent.

pub mod index;
pub mod schema;

pub use index::{default_index_dir, KeywordIndex};
