use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// Approval date matched neither a known format nor the pre-market sentinel.
    #[error("cannot parse approval date '{value}'")]
    UnparseableDate { value: String },
}
