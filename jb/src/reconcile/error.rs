//! Reconciliation error types

use thiserror::Error;

/// Reasons an Oracle reply cannot become the next Journey Document
///
/// Any of these leaves the prior document untouched.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("Reply is not valid JSON: {0}")]
    NotJson(String),

    #[error("Reply is not a journey object")]
    NotAnObject,

    #[error("Unknown screen component '{reference}' on {screen}")]
    UnknownComponent { screen: String, reference: String },

    #[error("Journey document has an unexpected shape: {0}")]
    Shape(String),
}
