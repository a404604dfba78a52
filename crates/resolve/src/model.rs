use serde::Serialize;

// ---------------------------------------------------------------------------
// Reference rows (read-only)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Organization {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngredientSubstance {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarketingCategory {
    pub id: i64,
    /// e.g. `NDA205613`, or a bare `205613` on legacy rows.
    pub application_id: String,
}

// ---------------------------------------------------------------------------
// Matches
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    Exact,
    TokenSimilarity,
    Substring,
    NumericApplication,
}

impl MatchMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::TokenSimilarity => "token_similarity",
            Self::Substring => "substring",
            Self::NumericApplication => "numeric_application",
        }
    }
}

impl std::fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved reference row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReferenceMatch {
    pub reference_id: i64,
    pub method: MatchMethod,
    /// 1.0 for exact matches, `max(jaccard, containment)` for token matches.
    pub score: f64,
}

impl ReferenceMatch {
    pub fn exact(reference_id: i64) -> Self {
        Self {
            reference_id,
            method: MatchMethod::Exact,
            score: 1.0,
        }
    }
}
