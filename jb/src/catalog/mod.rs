//! Component Catalog
//!
//! A fixed, read-only table of screen components and their field components,
//! supplied by the component backend. Sessions take one snapshot at start and
//! keep it for their lifetime.

mod error;
mod provider;
mod types;

pub use error::CatalogError;
pub use provider::{BuiltinCatalog, CatalogProvider, FileCatalog, builtin_entries};
pub use types::{Catalog, CatalogEntry, CatalogSummary, FieldComponent};
