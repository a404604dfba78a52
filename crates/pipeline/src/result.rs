use serde::Serialize;

/// Counters and messages for one import run.
///
/// Created when the run starts, filled in stage by stage, and handed back to
/// the caller (inside `ImportError::Cancelled` when the run is stopped).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportResult {
    pub rows_processed: usize,
    pub malformed_rows_skipped: usize,
    pub applicants_created: usize,
    pub applicants_updated: usize,
    pub products_created: usize,
    pub products_updated: usize,
    pub organization_matches_created: usize,
    pub ingredient_substance_matches_created: usize,
    pub marketing_category_matches_created: usize,
    pub unmatched_applicants: usize,
    pub unmatched_ingredients: usize,
    pub unmatched_products: usize,
    /// Persistence failures, in the order they happened.
    pub errors: Vec<String>,
    /// Field values that fell back to null.
    pub warnings: Vec<String>,
    pub cancelled: bool,
}

impl ImportResult {
    /// True iff no persistence error was recorded.
    pub fn success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn links_created(&self) -> usize {
        self.organization_matches_created
            + self.ingredient_substance_matches_created
            + self.marketing_category_matches_created
    }
}

/// What one resolver pass produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PassOutcome {
    /// Links written by this pass (pre-existing pairs are not counted).
    pub created: usize,
    pub unmatched: usize,
}
