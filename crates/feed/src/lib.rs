//! `orangebook-feed` — Orange Book `products.txt` reader.
//!
//! Pure crate: raw text in, typed product/applicant records out.
//! No database or CLI dependencies.

pub mod error;
pub mod fields;
pub mod model;
pub mod parser;

pub use error::FieldError;
pub use model::{ApplicantRecord, NormalizedRow, ProductRecord};
pub use parser::{parse_products, ParseOutput, RawRow, FIELD_COUNT};
