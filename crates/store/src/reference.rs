// Reference-table seeding from CSV.
//
// The reference tables are owned by an upstream system; seeding lets a fresh
// database be prepared for imports. Rows whose value is already present are
// skipped, so seeding the same file twice is a no-op.

use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use crate::error::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Organizations,
    Substances,
    Categories,
}

impl ReferenceKind {
    fn table(&self) -> &'static str {
        match self {
            Self::Organizations => "organizations",
            Self::Substances => "ingredient_substances",
            Self::Categories => "marketing_categories",
        }
    }

    /// Name of the value column, both in the CSV header and in the table.
    pub fn value_column(&self) -> &'static str {
        match self {
            Self::Organizations | Self::Substances => "name",
            Self::Categories => "application_id",
        }
    }
}

impl std::fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Organizations => write!(f, "organizations"),
            Self::Substances => write!(f, "substances"),
            Self::Categories => write!(f, "categories"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedResult {
    pub inserted: usize,
    pub skipped: usize,
}

/// Load reference rows from CSV text with a header row.
///
/// The value column (`name`, or `application_id` for categories) is required.
/// An optional `id` column pins row ids. Blank values are skipped.
pub fn seed_reference(
    conn: &Connection,
    kind: ReferenceKind,
    csv_data: &str,
) -> Result<SeedResult, StoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_lowercase()).collect();
    let value_idx = headers
        .iter()
        .position(|h| h == kind.value_column())
        .ok_or_else(|| StoreError::MissingColumn {
            column: kind.value_column().into(),
            source_name: kind.to_string(),
        })?;
    let id_idx = headers.iter().position(|h| h == "id");

    let exists_sql = format!(
        "SELECT 1 FROM {} WHERE {} = ?1",
        kind.table(),
        kind.value_column()
    );
    let insert_sql = format!(
        "INSERT INTO {} (id, {}) VALUES (?1, ?2)",
        kind.table(),
        kind.value_column()
    );

    // All or nothing: a failing row leaves the table as it was
    let tx = conn.unchecked_transaction()?;
    let mut result = SeedResult::default();
    for record in reader.records() {
        let record = record?;
        let value = record.get(value_idx).unwrap_or("");
        if value.is_empty() {
            result.skipped += 1;
            continue;
        }

        let present: Option<i64> = tx
            .query_row(&exists_sql, params![value], |row| row.get(0))
            .optional()?;
        if present.is_some() {
            result.skipped += 1;
            continue;
        }

        let id = match id_idx.and_then(|i| record.get(i)).filter(|s| !s.is_empty()) {
            None => None,
            Some(raw) => Some(raw.parse::<i64>().map_err(|_| StoreError::InvalidValue {
                source_name: kind.to_string(),
                line: record.position().map_or(0, |p| p.line()),
                column: "id".into(),
                value: raw.into(),
            })?),
        };
        tx.execute(&insert_sql, params![id, value])?;
        result.inserted += 1;
    }
    tx.commit()?;

    log::info!(
        "seeded {}: {} inserted, {} skipped",
        kind,
        result.inserted,
        result.skipped
    );
    Ok(result)
}

pub fn seed_organizations(conn: &Connection, csv_data: &str) -> Result<SeedResult, StoreError> {
    seed_reference(conn, ReferenceKind::Organizations, csv_data)
}

pub fn seed_substances(conn: &Connection, csv_data: &str) -> Result<SeedResult, StoreError> {
    seed_reference(conn, ReferenceKind::Substances, csv_data)
}

pub fn seed_marketing_categories(
    conn: &Connection,
    csv_data: &str,
) -> Result<SeedResult, StoreError> {
    seed_reference(conn, ReferenceKind::Categories, csv_data)
}
