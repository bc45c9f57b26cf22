use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::EngineError;
use crate::tables::{defaults, CategoryRule};

// ────────────────────────────────────────────────────────────────────────────
// Engine configuration
// ────────────────────────────────────────────────────────────────────────────

/// Settings for the optional semantic heading strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SemanticConfig {
    pub enabled: bool,
    /// Embedding dimension. Zero makes the model unavailable.
    pub dims: usize,
    /// Minimum cosine similarity for a semantic heading match.
    pub threshold: f64,
    /// Multiplier applied to the similarity to get the reported confidence.
    pub confidence_scale: f64,
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dims: 256,
            threshold: 0.85,
            confidence_scale: 0.9,
        }
    }
}

/// Everything the engine needs, as typed fields with documented defaults.
/// Tables default to the built-in resume set; a JSON file may replace any
/// subset of fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum confidence for the arbiter to accept a category.
    pub confidence_threshold: f64,
    /// Minimum edit-distance ratio for a fuzzy heading match.
    pub fuzzy_threshold: f64,
    /// On heading/content disagreement where both clear the threshold,
    /// trust content (true) or heading (false).
    pub prefer_content_on_conflict: bool,
    pub synonym_table: BTreeMap<String, Vec<String>>,
    pub category_rules: BTreeMap<String, CategoryRule>,
    pub synonym_groups: BTreeMap<String, Vec<String>>,
    pub specific_terms: BTreeSet<String>,
    pub semantic: SemanticConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.6,
            fuzzy_threshold: 0.80,
            prefer_content_on_conflict: true,
            synonym_table: defaults::synonym_table(),
            category_rules: defaults::category_rules(),
            synonym_groups: defaults::synonym_groups(),
            specific_terms: defaults::specific_terms(),
            semantic: SemanticConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Loads a config from JSON. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, EngineError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, EngineError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| EngineError::TableLoad(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&raw)
    }

    /// Rejects values the engine cannot run with.
    pub fn validate(&self) -> Result<(), EngineError> {
        check_unit("confidence_threshold", self.confidence_threshold)?;
        check_unit("fuzzy_threshold", self.fuzzy_threshold)?;
        check_unit("semantic.threshold", self.semantic.threshold)?;
        check_unit("semantic.confidence_scale", self.semantic.confidence_scale)?;

        for key in self.synonym_table.keys() {
            if key.trim().is_empty() {
                return Err(EngineError::InvalidConfiguration(
                    "synonym_table contains an empty category key".to_string(),
                ));
            }
        }

        for (key, rule) in &self.category_rules {
            if key.trim().is_empty() {
                return Err(EngineError::InvalidConfiguration(
                    "category_rules contains an empty category key".to_string(),
                ));
            }
            if rule.min_matches == 0 {
                return Err(EngineError::InvalidConfiguration(format!(
                    "category_rules.{key}.min_matches must be at least 1"
                )));
            }
            for pattern in &rule.patterns {
                Regex::new(pattern).map_err(|e| {
                    EngineError::InvalidConfiguration(format!(
                        "category_rules.{key} has an invalid pattern '{pattern}': {e}"
                    ))
                })?;
            }
        }
        Ok(())
    }
}

fn check_unit(name: &str, value: f64) -> Result<(), EngineError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(EngineError::InvalidConfiguration(format!(
            "{name} must be within [0, 1], got {value}"
        )))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Process settings (CLI)
// ────────────────────────────────────────────────────────────────────────────

/// Runtime settings for the `sectioner` binary, loaded from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub tables_path: Option<PathBuf>,
    pub confidence_threshold: Option<f64>,
    pub document_timeout: Duration,
    pub max_workers: Option<usize>,
    pub rust_log: String,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Settings {
            tables_path: std::env::var("SECTIONER_TABLES_PATH").ok().map(PathBuf::from),
            confidence_threshold: optional_env("SECTIONER_CONFIDENCE_THRESHOLD")?
                .map(|v| {
                    v.parse::<f64>()
                        .context("SECTIONER_CONFIDENCE_THRESHOLD must be a number")
                })
                .transpose()?,
            document_timeout: Duration::from_millis(
                optional_env("SECTIONER_DOCUMENT_TIMEOUT_MS")?
                    .unwrap_or_else(|| "2000".to_string())
                    .parse::<u64>()
                    .context("SECTIONER_DOCUMENT_TIMEOUT_MS must be a whole number of milliseconds")?,
            ),
            max_workers: optional_env("SECTIONER_MAX_WORKERS")?
                .map(|v| {
                    v.parse::<usize>()
                        .context("SECTIONER_MAX_WORKERS must be a positive integer")
                })
                .transpose()?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Builds the engine config: tables file (if any) with the threshold
    /// override applied on top.
    pub fn engine_config(&self, tables_override: Option<&Path>) -> Result<EngineConfig> {
        let path = tables_override.or(self.tables_path.as_deref());
        let mut config = match path {
            Some(p) => EngineConfig::from_json_file(p)
                .with_context(|| format!("Failed to load tables from '{}'", p.display()))?,
            None => EngineConfig::default(),
        };
        if let Some(threshold) = self.confidence_threshold {
            config.confidence_threshold = threshold;
        }
        config.validate()?;
        Ok(config)
    }
}

fn optional_env(key: &str) -> Result<Option<String>> {
    match std::env::var(key) {
        Ok(v) if v.trim().is_empty() => Ok(None),
        Ok(v) => Ok(Some(v)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Environment variable '{key}' is not valid UTF-8")),
    }
}
