use chrono::NaiveDate;
use serde::Serialize;

/// One product row of the feed, typed and normalized.
///
/// Natural key is `(appl_no, product_no)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRecord {
    pub ingredient: String,
    pub dosage_form: Option<String>,
    pub route: Option<String>,
    pub trade_name: String,
    pub strength: String,
    /// Raw application type code as published ("N", "A", ...).
    pub appl_type: String,
    /// Derived from `appl_type` ("NDA", "ANDA", or the raw code).
    pub appl_type_prefix: String,
    pub appl_no: String,
    pub product_no: String,
    pub te_code: Option<String>,
    pub approval_date: Option<NaiveDate>,
    pub approval_date_is_premarket: bool,
    pub is_rld: bool,
    pub is_rs: bool,
    pub product_type: String,
    pub applicant_short_name: String,
    pub applicant_full_name: String,
}

impl ProductRecord {
    /// Application id in the form marketing categories store it, e.g. `NDA205613`.
    pub fn application_key(&self) -> String {
        format!("{}{}", self.appl_type_prefix, self.appl_no)
    }
}

/// The applicant named on a product row. Keyed by the normalized short name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicantRecord {
    pub short_name: String,
    pub full_name: String,
}

/// Output of normalizing a single raw row.
#[derive(Debug, Clone)]
pub struct NormalizedRow {
    pub line: usize,
    pub product: ProductRecord,
    pub applicant: ApplicantRecord,
    /// Non-fatal field problems (value fell back to null).
    pub warnings: Vec<String>,
}
