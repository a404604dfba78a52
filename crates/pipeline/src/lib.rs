//! `orangebook-pipeline` — one import run over a products.txt body.
//!
//! ```text
//! Parse → Normalize → Upsert → ResolveOrganizations → ResolveIngredients
//!       → ResolveCategories → Aggregate → Completed | Cancelled
//! ```
//!
//! Rows are upserted one transaction each. Resolution only looks at the
//! applicants and products the run touched, and links are written at most
//! once per pair, so running the same file twice converges.

pub mod cancel;
pub mod error;
pub mod import;
pub mod resolver;
pub mod result;
pub mod stage;
pub mod upsert;

pub use cancel::CancelToken;
pub use error::ImportError;
pub use import::run_import;
pub use resolver::EntityResolver;
pub use result::{ImportResult, PassOutcome};
pub use stage::Stage;
