// Patent use-code loader: `code~definition` lines, header discarded.

use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use crate::error::StoreError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UseCodeLoadResult {
    pub created: usize,
    pub updated: usize,
    pub malformed_rows_skipped: usize,
}

/// Split one line into `(code, definition)`. Lines that are not exactly two
/// fields, or have a blank code, are malformed.
fn split_use_code(line: &str) -> Option<(&str, &str)> {
    let mut parts = line.split('~');
    let code = parts.next()?.trim();
    let definition = parts.next()?.trim();
    if parts.next().is_some() || code.is_empty() {
        return None;
    }
    Some((code, definition))
}

/// Create or update `patent_use_codes` rows keyed by code.
pub fn load_patent_use_codes(
    conn: &Connection,
    text: &str,
) -> Result<UseCodeLoadResult, StoreError> {
    let mut result = UseCodeLoadResult::default();

    for (idx, raw) in text.lines().enumerate().skip(1) {
        let line = raw.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        let Some((code, definition)) = split_use_code(line) else {
            log::debug!("use codes line {}: malformed, skipped", idx + 1);
            result.malformed_rows_skipped += 1;
            continue;
        };

        let existing: Option<String> = conn
            .query_row(
                "SELECT code FROM patent_use_codes WHERE code = ?1",
                params![code],
                |row| row.get(0),
            )
            .optional()?;

        conn.execute(
            "INSERT INTO patent_use_codes (code, definition) VALUES (?1, ?2)
             ON CONFLICT(code) DO UPDATE SET definition = excluded.definition",
            params![code, definition],
        )?;

        if existing.is_some() {
            result.updated += 1;
        } else {
            result.created += 1;
        }
    }

    log::info!(
        "patent use codes: {} created, {} updated, {} malformed",
        result.created,
        result.updated,
        result.malformed_rows_skipped
    );
    Ok(result)
}
