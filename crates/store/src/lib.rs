//! `orangebook-store` — SQLite persistence.
//!
//! `Store` owns the connection and bootstraps the schema; the `repository`
//! functions take a `&Connection` so callers can run them inside a transaction.

pub mod error;
pub mod reference;
pub mod repository;
pub mod schema;
pub mod use_codes;

pub use error::StoreError;
pub use reference::{
    seed_marketing_categories, seed_organizations, seed_reference, seed_substances, ReferenceKind,
    SeedResult,
};
pub use repository::{StoredProduct, UpsertOutcome};
pub use schema::{Store, Table};
pub use use_codes::{load_patent_use_codes, UseCodeLoadResult};
