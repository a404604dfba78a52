use log::info;

use orangebook_feed::fields::normalize_row;
use orangebook_feed::parse_products;
use orangebook_resolve::ResolveConfig;
use orangebook_store::Store;

use crate::cancel::CancelToken;
use crate::error::ImportError;
use crate::resolver::EntityResolver;
use crate::result::ImportResult;
use crate::stage::Stage;
use crate::upsert::UpsertEngine;

/// Stop with the partial result if the token has been cancelled.
fn check_cancel(cancel: &CancelToken, result: &mut ImportResult) -> Result<(), ImportError> {
    if !cancel.is_cancelled() {
        return Ok(());
    }
    let mut partial = std::mem::take(result);
    partial.cancelled = true;
    info!("import: {} after {} rows", Stage::Cancelled, partial.rows_processed);
    Err(ImportError::Cancelled {
        partial: Box::new(partial),
    })
}

fn enter(stage: Stage, cancel: &CancelToken, result: &mut ImportResult) -> Result<(), ImportError> {
    check_cancel(cancel, result)?;
    info!("import: {stage}");
    Ok(())
}

/// Import one products.txt body into `store` and link it to the reference tables.
///
/// Row-level persistence failures are collected in `ImportResult::errors`; the
/// call only fails when the reference tables cannot be read or the run is
/// cancelled.
pub fn run_import(
    store: &Store,
    content: &str,
    config: &ResolveConfig,
    cancel: &CancelToken,
) -> Result<ImportResult, ImportError> {
    let mut result = ImportResult::default();
    let conn = store.conn();

    enter(Stage::Parse, cancel, &mut result)?;
    let parsed = parse_products(content);
    result.malformed_rows_skipped = parsed.malformed_rows_skipped;
    info!(
        "parsed {} rows ({} malformed skipped)",
        parsed.rows.len(),
        parsed.malformed_rows_skipped
    );

    enter(Stage::Normalize, cancel, &mut result)?;
    let mut rows = Vec::with_capacity(parsed.rows.len());
    for raw in &parsed.rows {
        check_cancel(cancel, &mut result)?;
        let row = normalize_row(raw);
        result.warnings.extend(row.warnings.iter().cloned());
        rows.push(row);
    }

    enter(Stage::Upsert, cancel, &mut result)?;
    let mut engine = UpsertEngine::new(conn);
    for row in &rows {
        check_cancel(cancel, &mut result)?;
        engine.apply(row, &mut result);
    }
    let touched = engine.into_touched();

    let resolver = EntityResolver::load(conn, config)?;

    // A pass cut short by cancellation still records its counts; the next
    // checkpoint then returns them as the partial result.

    enter(Stage::ResolveOrganizations, cancel, &mut result)?;
    let pass =
        resolver.resolve_organizations(conn, &touched.applicants, cancel, &mut result.errors);
    result.organization_matches_created = pass.created;
    result.unmatched_applicants = pass.unmatched;

    enter(Stage::ResolveIngredients, cancel, &mut result)?;
    let pass = resolver.resolve_ingredients(conn, &touched.products, cancel, &mut result.errors);
    result.ingredient_substance_matches_created = pass.created;
    result.unmatched_ingredients = pass.unmatched;

    enter(Stage::ResolveCategories, cancel, &mut result)?;
    let pass = resolver.resolve_categories(conn, &touched.products, cancel, &mut result.errors);
    result.marketing_category_matches_created = pass.created;
    result.unmatched_products = pass.unmatched;

    enter(Stage::Aggregate, cancel, &mut result)?;
    info!(
        "rows {}: applicants +{} ~{}, products +{} ~{}, links +{}, errors {}",
        result.rows_processed,
        result.applicants_created,
        result.applicants_updated,
        result.products_created,
        result.products_updated,
        result.links_created(),
        result.errors.len()
    );

    info!("import: {}", Stage::Completed);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use orangebook_store::Table;

    const HEADER: &str = "Ingredient~DF;Route~Trade_Name~Applicant~Strength~Appl_Type~Appl_No\
                          ~Product_No~TE_Code~Approval_Date~RLD~RS~Type~Applicant_Full_Name";

    fn feed(rows: &[&str]) -> String {
        let mut s = String::from(HEADER);
        for r in rows {
            s.push('\n');
            s.push_str(r);
        }
        s
    }

    #[test]
    fn empty_feed_completes() {
        let store = Store::open_in_memory().unwrap();
        let result =
            run_import(&store, HEADER, &ResolveConfig::default(), &CancelToken::new()).unwrap();
        assert_eq!(result, ImportResult::default());
        assert!(result.success());
    }

    #[test]
    fn cancelled_before_start_writes_nothing() {
        let store = Store::open_in_memory().unwrap();
        let cancel = CancelToken::new();
        cancel.cancel();
        let content = feed(&["BUDESONIDE~AEROSOL, FOAM;RECTAL~UCERIS~SALIX~2MG~N~205613~001~\
                              ~Apr 12, 2023~Yes~Yes~RX~SALIX PHARMACEUTICALS INC"]);

        match run_import(&store, &content, &ResolveConfig::default(), &cancel) {
            Err(ImportError::Cancelled { partial }) => {
                assert!(partial.cancelled);
                assert!(partial.errors.is_empty());
                assert_eq!(partial.rows_processed, 0);
            }
            other => panic!("expected cancellation, got {other:?}"),
        }
        assert_eq!(store.count(Table::Products).unwrap(), 0);
    }

    #[test]
    fn bad_date_becomes_warning() {
        let store = Store::open_in_memory().unwrap();
        let content = feed(&["ASPIRIN~TABLET;ORAL~BAYER ASPIRIN~BAYER~325MG~A~012345~002~\
                              ~13/45/2020~No~No~OTC~bayer ag"]);
        let result =
            run_import(&store, &content, &ResolveConfig::default(), &CancelToken::new()).unwrap();
        assert_eq!(result.products_created, 1);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("13/45/2020"));
        assert!(result.success());
    }

    #[test]
    fn missing_reference_table_is_fatal() {
        let store = Store::open_in_memory().unwrap();
        store.conn().execute_batch("DROP TABLE organizations;").unwrap();
        let err = run_import(&store, HEADER, &ResolveConfig::default(), &CancelToken::new())
            .unwrap_err();
        assert!(matches!(err, ImportError::Store(_)));
    }
}
