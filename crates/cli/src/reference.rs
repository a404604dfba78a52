//! `obsync seed` and `obsync use-codes`.

use std::path::PathBuf;

use clap::ValueEnum;

use orangebook_store::{load_patent_use_codes, seed_reference, ReferenceKind, StoreError};

use crate::exit_codes::{EXIT_ERROR, EXIT_USAGE};
use crate::import::{open_store, read_input, store_err};
use crate::CliError;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum SeedTable {
    /// CSV with a `name` column (optional `id`)
    Organizations,
    /// CSV with a `name` column (optional `id`)
    Substances,
    /// CSV with an `application_id` column (optional `id`)
    Categories,
}

impl From<SeedTable> for ReferenceKind {
    fn from(t: SeedTable) -> Self {
        match t {
            SeedTable::Organizations => ReferenceKind::Organizations,
            SeedTable::Substances => ReferenceKind::Substances,
            SeedTable::Categories => ReferenceKind::Categories,
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), CliError> {
    let s = serde_json::to_string_pretty(value).map_err(|e| CliError {
        code: EXIT_ERROR,
        message: format!("JSON serialization error: {e}"),
        hint: None,
    })?;
    println!("{s}");
    Ok(())
}

pub fn cmd_seed(
    table: SeedTable,
    file: PathBuf,
    db: PathBuf,
    json: bool,
) -> Result<(), CliError> {
    let kind = ReferenceKind::from(table);
    let csv_data = read_input(&file)?;
    let store = open_store(&db)?;

    let result = seed_reference(store.conn(), kind, &csv_data).map_err(|e| match e {
        StoreError::MissingColumn { .. } | StoreError::Csv(_) | StoreError::InvalidValue { .. } => {
            CliError {
                code: EXIT_USAGE,
                message: format!("{}: {e}", file.display()),
                hint: Some(format!(
                    "expected a header row with a `{}` column and an optional integer `id`",
                    kind.value_column()
                )),
            }
        }
        other => store_err(other, Some("nothing was written; fix the file and seed again")),
    })?;

    if json {
        print_json(&result)?;
    }
    eprintln!("{kind}: {} inserted, {} already present", result.inserted, result.skipped);
    Ok(())
}

pub fn cmd_use_codes(file: PathBuf, db: PathBuf, json: bool) -> Result<(), CliError> {
    let text = read_input(&file)?;
    let store = open_store(&db)?;
    let result = load_patent_use_codes(store.conn(), &text).map_err(|e| store_err(e, None))?;

    if json {
        print_json(&result)?;
    }
    eprintln!(
        "patent use codes: {} created, {} updated, {} malformed skipped",
        result.created, result.updated, result.malformed_rows_skipped
    );
    Ok(())
}
