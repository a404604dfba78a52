//! `orangebook-resolve` — entity resolution primitives.
//!
//! Pure engine crate: receives reference rows and names, returns matches.
//! No database or CLI dependencies.

pub mod config;
pub mod error;
pub mod matcher;
pub mod model;
pub mod name;
pub mod similarity;

pub use config::ResolveConfig;
pub use error::ConfigError;
pub use matcher::{CategoryIndex, OrganizationIndex, SubstanceIndex};
pub use name::NameNormalizer;
pub use similarity::{calculate_token_similarity, TokenSimilarity};
