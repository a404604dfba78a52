// Reference matchers. Each index is built once per run from the reference
// table, then queried per applicant / ingredient / product.
//
// Ties are broken deterministically: candidates are visited in ascending id
// order and only a strictly better candidate replaces the current best.

use std::collections::{BTreeMap, HashMap};

use log::debug;

use crate::model::{
    IngredientSubstance, MarketingCategory, MatchMethod, Organization, ReferenceMatch,
};
use crate::name::{NameNormalizer, TokenSet};
use crate::similarity::calculate_token_similarity;

// ---------------------------------------------------------------------------
// Applicant → Organization
// ---------------------------------------------------------------------------

struct PreparedOrganization {
    id: i64,
    tokens: TokenSet,
    jurisdiction: Option<String>,
}

pub struct OrganizationIndex {
    normalizer: NameNormalizer,
    threshold: f64,
    /// Suffix-stripped name → indexes into `prepared`, ascending id.
    exact: HashMap<String, Vec<usize>>,
    prepared: Vec<PreparedOrganization>,
}

/// Both jurisdictions known and different.
fn conflicting(a: &Option<String>, b: &Option<String>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a != b)
}

impl OrganizationIndex {
    pub fn new(organizations: &[Organization], normalizer: NameNormalizer, threshold: f64) -> Self {
        let mut sorted: Vec<&Organization> = organizations.iter().collect();
        sorted.sort_by_key(|o| o.id);

        let mut exact: HashMap<String, Vec<usize>> = HashMap::new();
        let mut prepared = Vec::with_capacity(sorted.len());
        for org in sorted {
            let key = normalizer.normalize_company_name(&org.name, false);
            if !key.is_empty() {
                exact.entry(key).or_default().push(prepared.len());
            }
            prepared.push(PreparedOrganization {
                id: org.id,
                tokens: normalizer.tokenize(&org.name),
                jurisdiction: normalizer.detect_entity_jurisdiction(&org.name),
            });
        }

        Self {
            normalizer,
            threshold,
            exact,
            prepared,
        }
    }

    pub fn len(&self) -> usize {
        self.prepared.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prepared.is_empty()
    }

    /// Best organization for an applicant, or `None` when nothing clears the threshold.
    ///
    /// The full name drives fuzzy matching; the short name is used when the full
    /// name is blank and as a second exact-match key. A candidate whose
    /// jurisdiction conflicts with the applicant's is never returned, exact or not.
    pub fn resolve(&self, short_name: &str, full_name: &str) -> Option<ReferenceMatch> {
        let source = if full_name.trim().is_empty() { short_name } else { full_name };
        let jurisdiction = self.normalizer.detect_entity_jurisdiction(source);

        for name in [full_name, short_name] {
            let key = self.normalizer.normalize_company_name(name, false);
            let hit = self.exact.get(&key).and_then(|indexes| {
                indexes
                    .iter()
                    .map(|&i| &self.prepared[i])
                    .find(|c| !conflicting(&jurisdiction, &c.jurisdiction))
            });
            if let Some(candidate) = hit {
                return Some(ReferenceMatch::exact(candidate.id));
            }
        }

        let tokens = self.normalizer.tokenize(source);
        if tokens.is_empty() {
            return None;
        }

        // (index into prepared, score, jaccard)
        let mut best: Option<(usize, f64, f64)> = None;
        for (idx, candidate) in self.prepared.iter().enumerate() {
            if conflicting(&jurisdiction, &candidate.jurisdiction) {
                continue;
            }

            let sim = calculate_token_similarity(&tokens, &candidate.tokens);
            let score = sim.score();
            if score < self.threshold {
                continue;
            }

            let better = match best {
                None => true,
                Some((_, best_score, best_jaccard)) => {
                    score > best_score || (score == best_score && sim.jaccard > best_jaccard)
                }
            };
            if better {
                best = Some((idx, score, sim.jaccard));
            }
        }

        best.map(|(idx, score, _)| {
            let id = self.prepared[idx].id;
            debug!("applicant '{source}' → organization {id} (score {score:.3})");
            ReferenceMatch {
                reference_id: id,
                method: MatchMethod::TokenSimilarity,
                score,
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Ingredient → IngredientSubstance
// ---------------------------------------------------------------------------

/// Split a multi-ingredient value ("ACETAMINOPHEN; CODEINE PHOSPHATE") into
/// uppercased components, dropping blanks and duplicates.
pub fn split_ingredients(ingredient: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for part in ingredient.split(';') {
        let part = part.trim().to_uppercase();
        if !part.is_empty() && !out.contains(&part) {
            out.push(part);
        }
    }
    out
}

pub struct SubstanceIndex {
    exact: HashMap<String, i64>,
    /// (id, uppercased name) in ascending id order.
    names: Vec<(i64, String)>,
}

impl SubstanceIndex {
    pub fn new(substances: &[IngredientSubstance]) -> Self {
        let mut names: Vec<(i64, String)> = substances
            .iter()
            .map(|s| (s.id, s.name.trim().to_uppercase()))
            .filter(|(_, name)| !name.is_empty())
            .collect();
        names.sort_by_key(|(id, _)| *id);

        let mut exact = HashMap::new();
        for (id, name) in &names {
            exact.entry(name.clone()).or_insert(*id);
        }

        Self { exact, names }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Exact case-insensitive match, else substring containment in either
    /// direction. Among substring hits the closest name length wins.
    pub fn resolve(&self, component: &str) -> Option<ReferenceMatch> {
        let component = component.trim().to_uppercase();
        if component.is_empty() {
            return None;
        }
        if let Some(&id) = self.exact.get(&component) {
            return Some(ReferenceMatch::exact(id));
        }

        let mut best: Option<(i64, f64)> = None;
        for (id, name) in &self.names {
            if !(name.contains(&component) || component.contains(name.as_str())) {
                continue;
            }
            let (short, long) = if name.len() < component.len() {
                (name.len(), component.len())
            } else {
                (component.len(), name.len())
            };
            let score = short as f64 / long as f64;
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((*id, score));
            }
        }

        best.map(|(reference_id, score)| ReferenceMatch {
            reference_id,
            method: MatchMethod::Substring,
            score,
        })
    }
}

// ---------------------------------------------------------------------------
// Product → MarketingCategory
// ---------------------------------------------------------------------------

pub struct CategoryIndex {
    /// Uppercased application id → lowest category id.
    exact: HashMap<String, i64>,
    /// Purely numeric (legacy) application ids → lowest category id.
    numeric: BTreeMap<u64, i64>,
}

impl CategoryIndex {
    pub fn new(categories: &[MarketingCategory]) -> Self {
        let mut sorted: Vec<&MarketingCategory> = categories.iter().collect();
        sorted.sort_by_key(|c| c.id);

        let mut exact = HashMap::new();
        let mut numeric = BTreeMap::new();
        for cat in sorted {
            let value = cat.application_id.trim().to_uppercase();
            if value.is_empty() {
                continue;
            }
            if let Some(n) = parse_numeric(&value) {
                numeric.entry(n).or_insert(cat.id);
            }
            exact.entry(value).or_insert(cat.id);
        }

        Self { exact, numeric }
    }

    /// `prefix + appl_no` exact match, falling back to the numeric part of `appl_no`.
    pub fn resolve(&self, prefix: &str, appl_no: &str) -> Option<ReferenceMatch> {
        let key = format!("{}{}", prefix.trim(), appl_no.trim()).to_uppercase();
        if let Some(&id) = self.exact.get(&key) {
            return Some(ReferenceMatch::exact(id));
        }

        let digits: String = appl_no.chars().filter(|c| c.is_ascii_digit()).collect();
        let n = parse_numeric(&digits)?;
        self.numeric.get(&n).map(|&reference_id| ReferenceMatch {
            reference_id,
            method: MatchMethod::NumericApplication,
            score: 1.0,
        })
    }
}

fn parse_numeric(value: &str) -> Option<u64> {
    if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
