//! CLI Exit Code Registry
//!
//! This is the single source of truth for all `obsync` exit codes.
//! Exit codes are part of the shell contract — scheduled imports rely on them.
//!
//! | Code | Meaning                                                   |
//! |------|-----------------------------------------------------------|
//! | 0    | Success                                                   |
//! | 1    | General error (unspecified)                               |
//! | 2    | Usage error (bad args, missing input file)                |
//! | 3    | Import completed, but some rows or links failed to persist |
//! | 4    | Import cancelled before completion                        |
//! | 5    | Invalid resolution config                                 |
//! | 6    | Database or filesystem error                              |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use orangebook_pipeline::ImportResult;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, input file missing or unreadable.
pub const EXIT_USAGE: u8 = 2;

/// The run finished but `errors` is non-empty.
pub const EXIT_IMPORT_ERRORS: u8 = 3;

/// The run observed its cancel token. Committed rows stay committed.
pub const EXIT_IMPORT_CANCELLED: u8 = 4;

/// Resolution config failed to parse or validate.
pub const EXIT_INVALID_CONFIG: u8 = 5;

/// Database could not be opened, reference tables could not be read,
/// or an output file could not be written.
pub const EXIT_IO: u8 = 6;

/// Exit code for a finished (or cancelled) import.
pub fn import_exit_code(result: &ImportResult) -> u8 {
    if result.cancelled {
        EXIT_IMPORT_CANCELLED
    } else if !result.success() {
        EXIT_IMPORT_ERRORS
    } else {
        EXIT_SUCCESS
    }
}
