//! `obsync import` — load a products.txt feed and link it to reference data.

use std::path::{Path, PathBuf};

use serde::Serialize;

use orangebook_pipeline::{run_import, CancelToken, ImportError, ImportResult};
use orangebook_store::{Store, StoreError};

use crate::exit_codes::{import_exit_code, EXIT_ERROR, EXIT_IO, EXIT_SUCCESS, EXIT_USAGE};
use crate::settings::load_config;
use crate::CliError;

/// JSON shape printed by `--json` and written by `--output`.
#[derive(Serialize)]
struct ImportReport<'a> {
    status: &'static str,
    success: bool,
    #[serde(flatten)]
    result: &'a ImportResult,
}

impl<'a> ImportReport<'a> {
    fn new(result: &'a ImportResult) -> Self {
        let status = if result.cancelled {
            "cancelled"
        } else if result.success() {
            "completed"
        } else {
            "completed_with_errors"
        };
        Self {
            status,
            success: result.success(),
            result,
        }
    }
}

/// Read a text input. Invalid UTF-8 is replaced rather than rejected.
pub fn read_input(path: &Path) -> Result<String, CliError> {
    let bytes = std::fs::read(path).map_err(|e| CliError {
        code: EXIT_USAGE,
        message: format!("cannot read {}: {e}", path.display()),
        hint: None,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn open_store(db: &Path) -> Result<Store, CliError> {
    Store::open(db).map_err(|e| store_err(e, Some("the parent directory must exist")))
}

pub fn store_err(e: StoreError, hint: Option<&str>) -> CliError {
    CliError {
        code: EXIT_IO,
        message: e.to_string(),
        hint: hint.map(String::from),
    }
}

/// `cancel` is tripped by the Ctrl-C handler; a cancelled run still reports
/// what it committed.
pub fn cmd_import(
    file: PathBuf,
    db: PathBuf,
    config: Option<PathBuf>,
    json: bool,
    output: Option<PathBuf>,
    cancel: &CancelToken,
) -> Result<(), CliError> {
    let content = read_input(&file)?;
    let (config, source) = load_config(config.as_deref())?;
    tracing::info!("resolution config: {source}");
    let store = open_store(&db)?;

    let result = match run_import(&store, &content, &config, cancel) {
        Ok(result) => result,
        Err(ImportError::Cancelled { partial }) => *partial,
        Err(ImportError::Store(e)) => {
            return Err(store_err(e, Some("reference tables can be loaded with `obsync seed`")))
        }
    };

    let report = ImportReport::new(&result);
    let json_str = serde_json::to_string_pretty(&report).map_err(|e| CliError {
        code: EXIT_ERROR,
        message: format!("JSON serialization error: {e}"),
        hint: None,
    })?;

    if let Some(ref path) = output {
        std::fs::write(path, &json_str).map_err(|e| CliError {
            code: EXIT_IO,
            message: format!("cannot write output: {e}"),
            hint: None,
        })?;
        eprintln!("wrote {}", path.display());
    }

    if json {
        println!("{json_str}");
    }

    // Human summary to stderr
    eprintln!(
        "{}: {} rows ({} malformed skipped), applicants +{} ~{}, products +{} ~{}",
        file.display(),
        result.rows_processed,
        result.malformed_rows_skipped,
        result.applicants_created,
        result.applicants_updated,
        result.products_created,
        result.products_updated,
    );
    eprintln!(
        "links: {} organization, {} ingredient, {} category; \
         unmatched: {} applicants, {} ingredients, {} products",
        result.organization_matches_created,
        result.ingredient_substance_matches_created,
        result.marketing_category_matches_created,
        result.unmatched_applicants,
        result.unmatched_ingredients,
        result.unmatched_products,
    );
    for warning in &result.warnings {
        eprintln!("warning: {warning}");
    }
    for error in &result.errors {
        eprintln!("failed: {error}");
    }

    match import_exit_code(&result) {
        EXIT_SUCCESS => Ok(()),
        code => Err(CliError {
            code,
            message: format!("import {}", report.status.replace('_', " ")),
            hint: None,
        }),
    }
}
