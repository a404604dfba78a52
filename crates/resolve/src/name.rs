// Company-name canonicalization for applicant ↔ organization matching.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::ResolveConfig;

/// Token set produced by [`NameNormalizer::tokenize`].
pub type TokenSet = BTreeSet<String>;

/// Normalizes and tokenizes company names against a configured vocabulary.
#[derive(Debug, Clone)]
pub struct NameNormalizer {
    corporate_suffixes: BTreeSet<String>,
    noise_words: BTreeSet<String>,
    jurisdiction_suffixes: BTreeMap<String, String>,
}

impl Default for NameNormalizer {
    fn default() -> Self {
        Self::new(&ResolveConfig::default())
    }
}

impl NameNormalizer {
    pub fn new(config: &ResolveConfig) -> Self {
        Self {
            corporate_suffixes: config.corporate_suffixes.clone(),
            noise_words: config.noise_words.clone(),
            jurisdiction_suffixes: config.jurisdiction_suffixes.clone(),
        }
    }

    /// Uppercase, strip punctuation and legal-form suffixes, collapse whitespace.
    ///
    /// With `strip_noise_words`, pharma-domain filler ("PHARMACEUTICALS", "LABS", ...)
    /// is removed as well.
    pub fn normalize_company_name(&self, name: &str, strip_noise_words: bool) -> String {
        clean_tokens(name)
            .filter(|t| !self.corporate_suffixes.contains(t))
            .filter(|t| !(strip_noise_words && self.noise_words.contains(t)))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Noise-stripped name split into tokens longer than one character.
    pub fn tokenize(&self, name: &str) -> TokenSet {
        self.normalize_company_name(name, true)
            .split_whitespace()
            .filter(|t| t.chars().count() > 1)
            .map(str::to_string)
            .collect()
    }

    /// Jurisdiction implied by a legal-form suffix, e.g. `PFIZER INC` → `US`.
    ///
    /// The last recognized suffix wins.
    pub fn detect_entity_jurisdiction(&self, name: &str) -> Option<String> {
        clean_tokens(name)
            .filter_map(|t| self.jurisdiction_suffixes.get(&t).cloned())
            .last()
    }
}

/// Uppercased tokens with punctuation removed. Periods and apostrophes are
/// dropped in place ("S.A." → "SA"); other separators split tokens.
fn clean_tokens(name: &str) -> impl Iterator<Item = String> {
    let cleaned: String = name
        .to_uppercase()
        .chars()
        .filter(|c| !matches!(c, '.' | '\''))
        .map(|c| match c {
            '&' | ',' | '(' | ')' | '/' | '-' | ';' | ':' => ' ',
            other => other,
        })
        .collect();

    cleaned
        .split_whitespace()
        .map(str::to_string)
        .collect::<Vec<_>>()
        .into_iter()
}
