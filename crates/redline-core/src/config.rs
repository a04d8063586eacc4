//! Tunable thresholds and weights for the diff engine.
//!
//! `DiffConfig` keeps every heuristic constant in one place so the matching
//! passes can be tuned and tested independently of their shape.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Sequence alignment algorithm used for paragraph and word diffs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentAlgorithm {
    #[default]
    Myers,
    Patience,
    Lcs,
}

impl From<AlignmentAlgorithm> for similar::Algorithm {
    fn from(value: AlignmentAlgorithm) -> Self {
        match value {
            AlignmentAlgorithm::Myers => similar::Algorithm::Myers,
            AlignmentAlgorithm::Patience => similar::Algorithm::Patience,
            AlignmentAlgorithm::Lcs => similar::Algorithm::Lcs,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    pub alignment: AlignmentAlgorithm,
    /// Compute word-level segments inside replaced paragraph pairs.
    pub word_diff: bool,
    /// Leave whitespace-only paragraphs out of the alignment.
    pub skip_blank_paragraphs: bool,
    /// Relative position shift above which a paragraph present on both
    /// sides is reported as moved rather than inserted/deleted.
    pub paragraph_move_threshold: f64,
    /// Table similarity must exceed this to pair two tables.
    pub table_match_threshold: f64,
    pub header_weight: f64,
    pub locator_weight: f64,
    pub row_overlap_weight: f64,
    /// Key-column agreement must exceed this in the fuzzy row pass.
    pub row_key_threshold: f64,
    /// Number of leading columns forming the fuzzy join key.
    pub key_columns: usize,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            alignment: AlignmentAlgorithm::Myers,
            word_diff: true,
            skip_blank_paragraphs: false,
            paragraph_move_threshold: 0.1,
            table_match_threshold: 0.5,
            header_weight: 0.4,
            locator_weight: 0.3,
            row_overlap_weight: 0.3,
            row_key_threshold: 0.5,
            key_columns: 2,
        }
    }
}

impl DiffConfig {
    /// Load configuration from a file.
    ///
    /// Format is detected from file extension:
    /// - `.toml` -> TOML
    /// - `.json` -> JSON
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_lowercase();

        let content = std::fs::read_to_string(path)?;
        match extension.as_str() {
            "toml" => Self::from_toml_str(&content),
            "json" => Self::from_json_str(&content),
            _ => Err(Error::UnsupportedFormat { extension }),
        }
    }

    /// Parse and validate a TOML configuration.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| Error::config_parse("TOML", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)
            .map_err(|e| Error::config_parse("JSON", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let weights = [
            ("header_weight", self.header_weight),
            ("locator_weight", self.locator_weight),
            ("row_overlap_weight", self.row_overlap_weight),
        ];
        for (field, weight) in weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(Error::invalid_config(field, "must be a non-negative number"));
            }
        }
        if weights.iter().all(|(_, weight)| *weight == 0.0) {
            return Err(Error::invalid_config(
                "header_weight",
                "at least one table similarity weight must be positive",
            ));
        }

        let ratios = [
            ("paragraph_move_threshold", self.paragraph_move_threshold),
            ("table_match_threshold", self.table_match_threshold),
            ("row_key_threshold", self.row_key_threshold),
        ];
        for (field, value) in ratios {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::invalid_config(field, "must lie between 0 and 1"));
            }
        }

        if self.key_columns == 0 {
            return Err(Error::invalid_config("key_columns", "must be at least 1"));
        }
        Ok(())
    }
}
