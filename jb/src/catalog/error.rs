//! Catalog error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors fetching the component catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse catalog: {0}")]
    Parse(String),

    #[error("Component catalog is empty")]
    Empty,
}
