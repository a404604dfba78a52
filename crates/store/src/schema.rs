// Database bootstrap. Tables are created if missing; there is no migration layer.

use std::path::Path;

use rusqlite::Connection;

use crate::error::StoreError;

const SCHEMA: &str = r#"
-- Reference tables (maintained upstream, read-only to imports)
CREATE TABLE IF NOT EXISTS organizations (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS ingredient_substances (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS marketing_categories (
    id INTEGER PRIMARY KEY,
    application_id TEXT NOT NULL     -- 'NDA205613', or bare '205613' on legacy rows
);

-- Feed-owned tables
CREATE TABLE IF NOT EXISTS applicants (
    id INTEGER PRIMARY KEY,
    short_name TEXT NOT NULL UNIQUE, -- normalized (trimmed, uppercased)
    full_name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS products (
    id INTEGER PRIMARY KEY,
    appl_no TEXT NOT NULL,
    product_no TEXT NOT NULL,
    applicant_id INTEGER REFERENCES applicants(id),
    ingredient TEXT NOT NULL,
    dosage_form TEXT,
    route TEXT,
    trade_name TEXT NOT NULL,
    strength TEXT NOT NULL,
    appl_type TEXT NOT NULL,
    appl_type_prefix TEXT NOT NULL,
    te_code TEXT,
    approval_date TEXT,              -- YYYY-MM-DD
    approval_date_is_premarket INTEGER NOT NULL DEFAULT 0,
    is_rld INTEGER NOT NULL DEFAULT 0,
    is_rs INTEGER NOT NULL DEFAULT 0,
    product_type TEXT NOT NULL,
    UNIQUE (appl_no, product_no)
);

CREATE TABLE IF NOT EXISTS applicant_organization_links (
    applicant_id INTEGER NOT NULL REFERENCES applicants(id),
    organization_id INTEGER NOT NULL REFERENCES organizations(id),
    method TEXT NOT NULL,
    score REAL NOT NULL,
    UNIQUE (applicant_id)            -- one canonical organization per applicant
);

CREATE TABLE IF NOT EXISTS product_ingredient_substance_links (
    product_id INTEGER NOT NULL REFERENCES products(id),
    substance_id INTEGER NOT NULL REFERENCES ingredient_substances(id),
    method TEXT NOT NULL,
    score REAL NOT NULL,
    UNIQUE (product_id, substance_id)
);

CREATE TABLE IF NOT EXISTS product_marketing_category_links (
    product_id INTEGER NOT NULL REFERENCES products(id),
    marketing_category_id INTEGER NOT NULL REFERENCES marketing_categories(id),
    method TEXT NOT NULL,
    score REAL NOT NULL,
    UNIQUE (product_id, marketing_category_id)
);

CREATE TABLE IF NOT EXISTS patent_use_codes (
    code TEXT PRIMARY KEY,
    definition TEXT NOT NULL
);
"#;

/// One connection, scoped to a single import run.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| StoreError::Open {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA foreign_keys = ON;")?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn count(&self, table: Table) -> Result<usize, StoreError> {
        let sql = format!("SELECT COUNT(*) FROM {}", table.name());
        let n: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(n as usize)
    }
}

/// Tables exposed for row counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Applicants,
    Products,
    ApplicantOrganizationLinks,
    ProductIngredientSubstanceLinks,
    ProductMarketingCategoryLinks,
    PatentUseCodes,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Applicants => "applicants",
            Self::Products => "products",
            Self::ApplicantOrganizationLinks => "applicant_organization_links",
            Self::ProductIngredientSubstanceLinks => "product_ingredient_substance_links",
            Self::ProductMarketingCategoryLinks => "product_marketing_category_links",
            Self::PatentUseCodes => "patent_use_codes",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_is_reentrant() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ob.sqlite");
        {
            let store = Store::open(&path).unwrap();
            store
                .conn()
                .execute(
                    "INSERT INTO applicants (short_name, full_name) VALUES ('ACME', 'ACME INC')",
                    [],
                )
                .unwrap();
        }
        let store = Store::open(&path).unwrap();
        assert_eq!(store.count(Table::Applicants).unwrap(), 1);
        assert_eq!(store.count(Table::Products).unwrap(), 0);
    }

    #[test]
    fn open_bad_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("ob.sqlite");
        assert!(matches!(Store::open(&path), Err(StoreError::Open { .. })));
    }
}
