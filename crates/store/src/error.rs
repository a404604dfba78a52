use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("cannot open {path}: {message}")]
    Open { path: String, message: String },

    #[error("missing column '{column}' in {source_name}")]
    MissingColumn { column: String, source_name: String },

    #[error("{source_name} line {line}: invalid {column} '{value}'")]
    InvalidValue {
        source_name: String,
        line: u64,
        column: String,
        value: String,
    },
}
