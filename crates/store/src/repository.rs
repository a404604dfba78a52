// Natural-key upserts, reference reads and link writes.
// Every function takes a `&Connection` so it can run inside a caller's transaction.

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use orangebook_feed::{ApplicantRecord, ProductRecord};
use orangebook_resolve::model::{
    IngredientSubstance, MarketingCategory, Organization, ReferenceMatch,
};

use crate::error::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertOutcome {
    Created,
    Updated,
}

// ---------------------------------------------------------------------------
// Applicants
// ---------------------------------------------------------------------------

pub fn find_applicant_id(conn: &Connection, short_name: &str) -> Result<Option<i64>, StoreError> {
    let id = conn
        .query_row(
            "SELECT id FROM applicants WHERE short_name = ?1",
            params![short_name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id)
}

/// Create or update an applicant keyed by its normalized short name.
pub fn upsert_applicant(
    conn: &Connection,
    applicant: &ApplicantRecord,
) -> Result<(i64, UpsertOutcome), StoreError> {
    if let Some(id) = find_applicant_id(conn, &applicant.short_name)? {
        conn.execute(
            "UPDATE applicants SET full_name = ?1 WHERE id = ?2",
            params![applicant.full_name, id],
        )?;
        return Ok((id, UpsertOutcome::Updated));
    }

    conn.execute(
        "INSERT INTO applicants (short_name, full_name) VALUES (?1, ?2)",
        params![applicant.short_name, applicant.full_name],
    )?;
    Ok((conn.last_insert_rowid(), UpsertOutcome::Created))
}

pub fn applicant_names(conn: &Connection, id: i64) -> Result<Option<ApplicantRecord>, StoreError> {
    let found = conn
        .query_row(
            "SELECT short_name, full_name FROM applicants WHERE id = ?1",
            params![id],
            |row| {
                Ok(ApplicantRecord {
                    short_name: row.get(0)?,
                    full_name: row.get(1)?,
                })
            },
        )
        .optional()?;
    Ok(found)
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

/// A product row as persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredProduct {
    pub id: i64,
    pub applicant_id: Option<i64>,
    pub appl_no: String,
    pub product_no: String,
    pub ingredient: String,
    pub dosage_form: Option<String>,
    pub route: Option<String>,
    pub trade_name: String,
    pub strength: String,
    pub appl_type: String,
    pub appl_type_prefix: String,
    pub te_code: Option<String>,
    pub approval_date: Option<NaiveDate>,
    pub approval_date_is_premarket: bool,
    pub is_rld: bool,
    pub is_rs: bool,
    pub product_type: String,
}

pub fn find_product_id(
    conn: &Connection,
    appl_no: &str,
    product_no: &str,
) -> Result<Option<i64>, StoreError> {
    let id = conn
        .query_row(
            "SELECT id FROM products WHERE appl_no = ?1 AND product_no = ?2",
            params![appl_no, product_no],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id)
}

/// Create or update a product keyed by `(appl_no, product_no)`.
pub fn upsert_product(
    conn: &Connection,
    product: &ProductRecord,
    applicant_id: Option<i64>,
) -> Result<(i64, UpsertOutcome), StoreError> {
    if let Some(id) = find_product_id(conn, &product.appl_no, &product.product_no)? {
        conn.execute(
            "UPDATE products SET
                applicant_id = ?1, ingredient = ?2, dosage_form = ?3, route = ?4,
                trade_name = ?5, strength = ?6, appl_type = ?7, appl_type_prefix = ?8,
                te_code = ?9, approval_date = ?10, approval_date_is_premarket = ?11,
                is_rld = ?12, is_rs = ?13, product_type = ?14
             WHERE id = ?15",
            params![
                applicant_id,
                product.ingredient,
                product.dosage_form,
                product.route,
                product.trade_name,
                product.strength,
                product.appl_type,
                product.appl_type_prefix,
                product.te_code,
                product.approval_date,
                product.approval_date_is_premarket,
                product.is_rld,
                product.is_rs,
                product.product_type,
                id,
            ],
        )?;
        return Ok((id, UpsertOutcome::Updated));
    }

    conn.execute(
        "INSERT INTO products (
            appl_no, product_no, applicant_id, ingredient, dosage_form, route,
            trade_name, strength, appl_type, appl_type_prefix, te_code,
            approval_date, approval_date_is_premarket, is_rld, is_rs, product_type
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
        params![
            product.appl_no,
            product.product_no,
            applicant_id,
            product.ingredient,
            product.dosage_form,
            product.route,
            product.trade_name,
            product.strength,
            product.appl_type,
            product.appl_type_prefix,
            product.te_code,
            product.approval_date,
            product.approval_date_is_premarket,
            product.is_rld,
            product.is_rs,
            product.product_type,
        ],
    )?;
    Ok((conn.last_insert_rowid(), UpsertOutcome::Created))
}

pub fn get_product(
    conn: &Connection,
    appl_no: &str,
    product_no: &str,
) -> Result<Option<StoredProduct>, StoreError> {
    let found = conn
        .query_row(
            "SELECT id, applicant_id, appl_no, product_no, ingredient, dosage_form, route,
                    trade_name, strength, appl_type, appl_type_prefix, te_code, approval_date,
                    approval_date_is_premarket, is_rld, is_rs, product_type
             FROM products WHERE appl_no = ?1 AND product_no = ?2",
            params![appl_no, product_no],
            |row| {
                Ok(StoredProduct {
                    id: row.get(0)?,
                    applicant_id: row.get(1)?,
                    appl_no: row.get(2)?,
                    product_no: row.get(3)?,
                    ingredient: row.get(4)?,
                    dosage_form: row.get(5)?,
                    route: row.get(6)?,
                    trade_name: row.get(7)?,
                    strength: row.get(8)?,
                    appl_type: row.get(9)?,
                    appl_type_prefix: row.get(10)?,
                    te_code: row.get(11)?,
                    approval_date: row.get(12)?,
                    approval_date_is_premarket: row.get(13)?,
                    is_rld: row.get(14)?,
                    is_rs: row.get(15)?,
                    product_type: row.get(16)?,
                })
            },
        )
        .optional()?;
    Ok(found)
}

// ---------------------------------------------------------------------------
// Reference reads
// ---------------------------------------------------------------------------

pub fn load_organizations(conn: &Connection) -> Result<Vec<Organization>, StoreError> {
    let mut stmt = conn.prepare("SELECT id, name FROM organizations ORDER BY id")?;
    let rows = stmt.query_map([], |row| {
        Ok(Organization {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub fn load_substances(conn: &Connection) -> Result<Vec<IngredientSubstance>, StoreError> {
    let mut stmt = conn.prepare("SELECT id, name FROM ingredient_substances ORDER BY id")?;
    let rows = stmt.query_map([], |row| {
        Ok(IngredientSubstance {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub fn load_marketing_categories(conn: &Connection) -> Result<Vec<MarketingCategory>, StoreError> {
    let mut stmt = conn.prepare("SELECT id, application_id FROM marketing_categories ORDER BY id")?;
    let rows = stmt.query_map([], |row| {
        Ok(MarketingCategory {
            id: row.get(0)?,
            application_id: row.get(1)?,
        })
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

// ---------------------------------------------------------------------------
// Links
// ---------------------------------------------------------------------------

/// Insert a link unless the pair already exists. Returns true if a row was added.
fn insert_link(
    conn: &Connection,
    table: &str,
    left_col: &str,
    right_col: &str,
    left_id: i64,
    m: &ReferenceMatch,
) -> Result<bool, StoreError> {
    let sql = format!(
        "INSERT OR IGNORE INTO {table} ({left_col}, {right_col}, method, score)
         VALUES (?1, ?2, ?3, ?4)"
    );
    let changed = conn.execute(
        &sql,
        params![left_id, m.reference_id, m.method.as_str(), m.score],
    )?;
    Ok(changed == 1)
}

/// Point an applicant at its organization. An applicant has at most one link:
/// a different organization replaces the existing one, the same one is a no-op.
/// Returns true if a row was added or replaced.
pub fn link_applicant_organization(
    conn: &Connection,
    applicant_id: i64,
    m: &ReferenceMatch,
) -> Result<bool, StoreError> {
    let changed = conn.execute(
        "INSERT INTO applicant_organization_links (applicant_id, organization_id, method, score)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT (applicant_id) DO UPDATE SET
            organization_id = excluded.organization_id,
            method = excluded.method,
            score = excluded.score
         WHERE organization_id != excluded.organization_id",
        params![applicant_id, m.reference_id, m.method.as_str(), m.score],
    )?;
    Ok(changed == 1)
}

pub fn link_product_substance(
    conn: &Connection,
    product_id: i64,
    m: &ReferenceMatch,
) -> Result<bool, StoreError> {
    insert_link(
        conn,
        "product_ingredient_substance_links",
        "product_id",
        "substance_id",
        product_id,
        m,
    )
}

pub fn link_product_marketing_category(
    conn: &Connection,
    product_id: i64,
    m: &ReferenceMatch,
) -> Result<bool, StoreError> {
    insert_link(
        conn,
        "product_marketing_category_links",
        "product_id",
        "marketing_category_id",
        product_id,
        m,
    )
}

pub fn organization_links_for(
    conn: &Connection,
    applicant_id: i64,
) -> Result<Vec<i64>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT organization_id FROM applicant_organization_links
         WHERE applicant_id = ?1 ORDER BY organization_id",
    )?;
    let rows = stmt.query_map(params![applicant_id], |row| row.get(0))?;
    Ok(rows.collect::<Result<Vec<i64>, _>>()?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
