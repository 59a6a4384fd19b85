//! Core contracts for vitalgen.
//!
//! This crate defines the field catalog, value and operator types, and the
//! percentage specifier grammar shared by the generator and the CLI.

pub mod catalog;
pub mod error;
pub mod specifier;
pub mod value;

pub use catalog::{
    CatalogDocument, Domain, DomainSpec, Field, FieldCatalog, FieldSpec, catalog_document_schema,
};
pub use error::{Error, Result};
pub use specifier::{FieldPercentage, SpecifierParser};
pub use value::{DATE_FORMAT, FieldValue, MAX_FLOAT_SCALE, Operator, round_to_scale};
