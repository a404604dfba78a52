// Per-row create-or-update of applicants and products.
//
// Each row is written in its own transaction. A failed row is rolled back,
// reported in `errors` and the run moves on to the next row.

use std::collections::{BTreeMap, HashMap};

use log::{debug, warn};
use rusqlite::Connection;

use orangebook_feed::{ApplicantRecord, NormalizedRow, ProductRecord};
use orangebook_store::repository::{upsert_applicant, upsert_product};
use orangebook_store::{StoreError, UpsertOutcome};

use crate::result::ImportResult;

/// Applicants and products written by this run, keyed by row id.
/// Resolution is scoped to these.
#[derive(Debug, Default)]
pub struct Touched {
    pub applicants: BTreeMap<i64, ApplicantRecord>,
    pub products: BTreeMap<i64, ProductRecord>,
}

struct RowWrite {
    /// `None` outcome: applicant already written earlier in this run.
    applicant: Option<(i64, Option<UpsertOutcome>)>,
    product: (i64, UpsertOutcome),
}

pub struct UpsertEngine<'a> {
    conn: &'a Connection,
    /// Normalized short name → applicant id, for applicants written this run.
    seen_applicants: HashMap<String, i64>,
    touched: Touched,
}

impl<'a> UpsertEngine<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self {
            conn,
            seen_applicants: HashMap::new(),
            touched: Touched::default(),
        }
    }

    /// Persist one row and update the run's counters.
    pub fn apply(&mut self, row: &NormalizedRow, result: &mut ImportResult) {
        result.rows_processed += 1;

        let written = match self.write_row(row) {
            Ok(w) => w,
            Err(e) => {
                warn!("row {}: {e}", row.line);
                result.errors.push(format!("row {}: {e}", row.line));
                return;
            }
        };

        if let Some((applicant_id, outcome)) = written.applicant {
            match outcome {
                Some(UpsertOutcome::Created) => result.applicants_created += 1,
                Some(UpsertOutcome::Updated) => result.applicants_updated += 1,
                None => {}
            }
            if outcome.is_some() {
                self.seen_applicants
                    .insert(row.applicant.short_name.clone(), applicant_id);
                self.touched
                    .applicants
                    .insert(applicant_id, row.applicant.clone());
            }
        }

        let (product_id, outcome) = written.product;
        match outcome {
            UpsertOutcome::Created => result.products_created += 1,
            UpsertOutcome::Updated => result.products_updated += 1,
        }
        debug!(
            "row {}: product {}/{} {:?} (id {product_id})",
            row.line, row.product.appl_no, row.product.product_no, outcome
        );
        self.touched.products.insert(product_id, row.product.clone());
    }

    fn write_row(&self, row: &NormalizedRow) -> Result<RowWrite, StoreError> {
        let tx = self.conn.unchecked_transaction()?;

        let applicant = if row.applicant.short_name.is_empty() {
            None
        } else if let Some(&id) = self.seen_applicants.get(&row.applicant.short_name) {
            Some((id, None))
        } else {
            let (id, outcome) = upsert_applicant(&tx, &row.applicant)?;
            Some((id, Some(outcome)))
        };

        let product = upsert_product(&tx, &row.product, applicant.map(|(id, _)| id))?;
        tx.commit()?;

        Ok(RowWrite { applicant, product })
    }

    pub fn into_touched(self) -> Touched {
        self.touched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orangebook_feed::fields::normalize_row;
    use orangebook_feed::RawRow;
    use orangebook_store::{Store, Table};

    fn row(line: usize, applicant: &str, product_no: &str) -> NormalizedRow {
        let fields = [
            "BUDESONIDE",
            "AEROSOL, FOAM;RECTAL",
            "UCERIS",
            applicant,
            "2MG/ACTUATION",
            "N",
            "205613",
            product_no,
            "",
            "Apr 12, 2023",
            "Yes",
            "Yes",
            "RX",
            "SALIX PHARMACEUTICALS INC",
        ]
        .map(String::from);
        normalize_row(&RawRow { line, fields })
    }

    #[test]
    fn applicant_counted_once_per_run() {
        let store = Store::open_in_memory().unwrap();
        let mut result = ImportResult::default();
        let mut engine = UpsertEngine::new(store.conn());
        engine.apply(&row(2, "SALIX", "001"), &mut result);
        engine.apply(&row(3, "salix ", "002"), &mut result);
        let touched = engine.into_touched();

        assert_eq!(result.rows_processed, 2);
        assert_eq!(result.applicants_created, 1);
        assert_eq!(result.applicants_updated, 0);
        assert_eq!(result.products_created, 2);
        assert_eq!(touched.applicants.len(), 1);
        assert_eq!(touched.products.len(), 2);
        assert_eq!(store.count(Table::Applicants).unwrap(), 1);
    }

    #[test]
    fn existing_applicant_updated_once() {
        let store = Store::open_in_memory().unwrap();
        let mut first = ImportResult::default();
        let mut engine = UpsertEngine::new(store.conn());
        engine.apply(&row(2, "SALIX", "001"), &mut first);

        let mut second = ImportResult::default();
        let mut engine = UpsertEngine::new(store.conn());
        engine.apply(&row(2, "SALIX", "001"), &mut second);
        engine.apply(&row(3, "SALIX", "002"), &mut second);

        assert_eq!(second.applicants_created, 0);
        assert_eq!(second.applicants_updated, 1);
        assert_eq!(second.products_updated, 1);
        assert_eq!(second.products_created, 1);
    }

    #[test]
    fn failed_row_is_rolled_back_and_reported() {
        let store = Store::open_in_memory().unwrap();
        store
            .conn()
            .execute_batch(
                "CREATE TRIGGER reject_002 BEFORE INSERT ON products
                 WHEN NEW.product_no = '002'
                 BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
            )
            .unwrap();

        let mut result = ImportResult::default();
        let mut engine = UpsertEngine::new(store.conn());
        engine.apply(&row(2, "TEVA", "002"), &mut result);
        engine.apply(&row(3, "SALIX", "001"), &mut result);

        assert_eq!(result.rows_processed, 2);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].starts_with("row 2: "));
        assert!(result.errors[0].contains("rejected"));
        // TEVA was rolled back with its row
        assert_eq!(result.applicants_created, 1);
        assert_eq!(store.count(Table::Applicants).unwrap(), 1);
        assert_eq!(store.count(Table::Products).unwrap(), 1);
    }

    #[test]
    fn blank_applicant_leaves_product_unlinked() {
        let store = Store::open_in_memory().unwrap();
        let mut result = ImportResult::default();
        let mut engine = UpsertEngine::new(store.conn());
        engine.apply(&row(2, "  ", "001"), &mut result);

        assert_eq!(result.products_created, 1);
        assert_eq!(result.applicants_created, 0);
        let stored = orangebook_store::repository::get_product(store.conn(), "205613", "001")
            .unwrap()
            .unwrap();
        assert_eq!(stored.applicant_id, None);
    }
}
