//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env
//! vars, and exposes the typed threshold block the classifier and search
//! fusion consume.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

use crate::error::Error;

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_"));

        Ok(Self { figment })
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// Typed threshold block under the `thresholds` key; defaults apply for
    /// any field (or the whole block) left unset.
    pub fn thresholds(&self) -> Thresholds {
        self.figment
            .extract_inner("thresholds")
            .unwrap_or_default()
    }
}

/// Tunable decision thresholds. Tests exercise boundary values through this
/// struct instead of scattered constants.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Rule-classifier confidence at or above which the learned model is
    /// not consulted.
    pub rule_threshold: f32,
    /// Below this final confidence the category is forced to `other`.
    pub floor_threshold: f32,
    /// Vector hits under this similarity are discarded before fusion.
    pub similarity_threshold: f32,
    /// Added when a document matches both keyword and semantic paths.
    pub dual_match_bonus: f32,
    /// Scales the rule classifier's normalized coverage score; calibration
    /// knob, see DESIGN.md.
    pub rule_coverage_boost: f32,
}

impl Thresholds {
    /// Reject threshold combinations that would make decisions vacuous,
    /// e.g. a floor above the rule fast-path cutoff.
    pub fn validate(&self) -> Result<(), Error> {
        let unit_ranged = [
            ("rule_threshold", self.rule_threshold),
            ("floor_threshold", self.floor_threshold),
            ("similarity_threshold", self.similarity_threshold),
            ("dual_match_bonus", self.dual_match_bonus),
        ];
        for (name, value) in unit_ranged {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be in [0, 1], got {value}"
                )));
            }
        }
        if self.rule_coverage_boost <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "rule_coverage_boost must be positive, got {}",
                self.rule_coverage_boost
            )));
        }
        if self.floor_threshold > self.rule_threshold {
            return Err(Error::InvalidConfig(format!(
                "floor_threshold ({}) must not exceed rule_threshold ({})",
                self.floor_threshold, self.rule_threshold
            )));
        }
        Ok(())
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            rule_threshold: 0.8,
            floor_threshold: 0.3,
            similarity_threshold: 0.5,
            dual_match_bonus: 0.05,
            rule_coverage_boost: 2.5,
        }
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_defaults() {
        let t = Thresholds::default();
        assert!((t.rule_threshold - 0.8).abs() < f32::EPSILON);
        assert!((t.floor_threshold - 0.3).abs() < f32::EPSILON);
        assert!((t.similarity_threshold - 0.5).abs() < f32::EPSILON);
        assert!(t.dual_match_bonus > 0.0 && t.dual_match_bonus < 0.2);
        assert!(t.validate().is_ok());
    }

    #[test]
    fn validate_rejects_out_of_range_thresholds() {
        let mut t = Thresholds::default();
        t.similarity_threshold = 1.5;
        assert!(t.validate().is_err());

        let mut t = Thresholds::default();
        t.rule_coverage_boost = 0.0;
        assert!(t.validate().is_err());

        let mut t = Thresholds::default();
        t.floor_threshold = 0.9;
        assert!(matches!(t.validate(), Err(Error::InvalidConfig(_))));
    }
}
