//! Base Recipe Rules for paint formulation
//!
//! A base recipe carries a [`Rules`] document: the bill-of-materials listing,
//! per compositional role, which raw materials may substitute each other.
//!
//! - **Film formers** and **solvents**: material lists common to all colors
//! - **Pigment part**: one variant per supported color, each with its own
//!   groups (pigments, fillers, color-specific extras) and ratio parameters
//! - **Additives**: groups independent of color
//!
//! # Validation
//!
//! Posting a base recipe runs two stages:
//!
//! 1. [`validate_structure`]: pure shape and self-consistency checks,
//!    reporting the first error with its structural path
//! 2. [`ReferenceValidator`]: existence of every referenced material and
//!    group in the nomenclature catalog, and the mandatory named groups of
//!    every color variant
//!
//! Unposted documents are drafts and skip both stages.
//!
//! # Example
//!
//! ```ignore
//! use rules::{validate_rules, InMemoryCatalog, RequiredGroupNames, Rules};
//!
//! let rules = Rules::from_json(&body)?;
//! let snapshot = catalog.snapshot().await;
//! validate_rules(&rules, &snapshot, &RequiredGroupNames::default()).await?;
//! ```

pub mod catalog;
pub mod error;
pub mod path;
pub mod reference;
pub mod structure;
pub mod types;

pub use catalog::{
    CatalogContents, CatalogSnapshot, GroupRecord, InMemoryCatalog, NomenclatureLookup,
    NomenclatureSource,
};
pub use error::{CatalogError, ErrorCategory, ValidationError};
pub use path::FieldPath;
pub use reference::{validate_references, ReferenceValidator, RequiredGroupNames, RulesReferences};
pub use structure::validate_structure;
pub use types::*;

/// Run structural validation, then reference validation.
///
/// The catalog is not queried when the structure is invalid.
pub async fn validate_rules(
    rules: &Rules,
    catalog: &dyn NomenclatureLookup,
    required: &RequiredGroupNames,
) -> Result<(), ValidationError> {
    validate_structure(rules)?;
    ReferenceValidator::new(required.clone())
        .validate(rules, catalog)
        .await
}
