//! sened-core
//!
//! Shared domain types and the text-processing front end of the sened
//! document pipeline: script-aware normalization, tokenization, language
//! detection, and key-phrase extraction. The index and classifier crates
//! build on the traits and types defined here.

pub mod config;
pub mod error;
pub mod keyphrases;
pub mod lang;
pub mod script;
pub mod token;
pub mod traits;
pub mod types;
