use thiserror::Error;

use orangebook_store::StoreError;

use crate::result::ImportResult;

#[derive(Debug, Error)]
pub enum ImportError {
    /// The run observed its cancel token. `partial` holds the counters so far.
    #[error("import cancelled after {} rows", .partial.rows_processed)]
    Cancelled { partial: Box<ImportResult> },

    /// Setup failure: the reference tables could not be read.
    #[error(transparent)]
    Store(#[from] StoreError),
}
