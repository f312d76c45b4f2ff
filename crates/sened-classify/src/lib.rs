//! sened-classify
//!
//! Document categorization for the registry pipeline. Three layers:
//! keyword rules ([`rules`]), a trained tf-idf naive bayes model
//! ([`model`]), and the engine that arbitrates between them
//! ([`arbiter`]).

pub mod arbiter;
pub mod model;
pub mod rules;

pub use arbiter::ClassifierEngine;
pub use model::LearnedModel;
pub use rules::{RuleOutcome, RuleSet};
