use std::collections::BTreeSet;

use serde::Serialize;

/// Overlap between two token sets.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct TokenSimilarity {
    /// |A∩B| / |A∪B|
    pub jaccard: f64,
    /// |A∩B| / |A|. Asymmetric: how much of A is absorbed by B.
    pub containment: f64,
}

impl TokenSimilarity {
    /// Score used for threshold checks and ranking.
    pub fn score(&self) -> f64 {
        self.jaccard.max(self.containment)
    }
}

/// Jaccard and containment of `a` in `b`. Empty or disjoint sets score 0.0.
pub fn calculate_token_similarity(a: &BTreeSet<String>, b: &BTreeSet<String>) -> TokenSimilarity {
    let intersection = a.intersection(b).count();
    if intersection == 0 {
        return TokenSimilarity::default();
    }

    let union = a.len() + b.len() - intersection;
    TokenSimilarity {
        jaccard: intersection as f64 / union as f64,
        containment: intersection as f64 / a.len() as f64,
    }
}
