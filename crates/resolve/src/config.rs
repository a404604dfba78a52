use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Minimum `max(jaccard, containment)` for a fuzzy organization match.
pub const DEFAULT_THRESHOLD: f64 = 0.67;

const DEFAULT_CORPORATE_SUFFIXES: &[&str] = &[
    "INC", "INCORPORATED", "LLC", "CORP", "CORPORATION", "CO", "COMPANY", "USA", "LTD",
    "LIMITED", "PLC", "GMBH", "AG", "SA", "LP", "LLP",
];

const DEFAULT_NOISE_WORDS: &[&str] = &[
    "PHARMACEUTICALS", "PHARMACEUTICAL", "PHARMA", "PHARMS", "PHARM", "HEALTHCARE",
    "LABORATORIES", "LABS", "INDUSTRIES", "INTERNATIONAL", "HOLDINGS", "THE",
];

const DEFAULT_JURISDICTION_SUFFIXES: &[(&str, &str)] = &[
    ("INC", "US"),
    ("CORP", "US"),
    ("LLC", "US"),
    ("CO", "US"),
    ("LTD", "UK"),
    ("PLC", "UK"),
    ("GMBH", "DE"),
];

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Tunables for entity resolution. Every key is optional in TOML.
///
/// ```toml
/// threshold = 0.67
/// noise_words = ["PHARMACEUTICALS", "PHARMA"]
///
/// [jurisdiction_suffixes]
/// INC = "US"
/// GMBH = "DE"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolveConfig {
    pub threshold: f64,
    /// Tokens always removed from company names.
    pub corporate_suffixes: BTreeSet<String>,
    /// Domain words removed only when noise stripping is requested.
    pub noise_words: BTreeSet<String>,
    /// Legal-form token → jurisdiction code.
    pub jurisdiction_suffixes: BTreeMap<String, String>,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            corporate_suffixes: DEFAULT_CORPORATE_SUFFIXES.iter().map(|s| s.to_string()).collect(),
            noise_words: DEFAULT_NOISE_WORDS.iter().map(|s| s.to_string()).collect(),
            jurisdiction_suffixes: DEFAULT_JURISDICTION_SUFFIXES
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ResolveConfig {
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let config: ResolveConfig =
            toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let input = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml(&input)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.threshold > 0.0 && self.threshold <= 1.0) {
            return Err(ConfigError::Validation(format!(
                "threshold must be in (0, 1], got {}",
                self.threshold
            )));
        }

        let tokens = self
            .jurisdiction_suffixes
            .keys()
            .chain(self.corporate_suffixes.iter())
            .chain(self.noise_words.iter());
        for token in tokens {
            if token.is_empty() || token.contains(char::is_whitespace) {
                return Err(ConfigError::Validation(format!(
                    "vocabulary entries must be single tokens, got '{token}'"
                )));
            }
            if token.to_uppercase() != *token {
                return Err(ConfigError::Validation(format!(
                    "vocabulary entries must be uppercase, got '{token}'"
                )));
            }
        }

        for (suffix, code) in &self.jurisdiction_suffixes {
            if code.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "jurisdiction suffix '{suffix}' maps to an empty code"
                )));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
