//! Turn error types

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::session::SessionError;

/// Failures that end a request without a conversational reply
///
/// Oracle and reply problems never show up here; they are part of a
/// successful turn.
#[derive(Debug, Error)]
pub enum TurnError {
    /// Unknown, deleted, or already finished session
    #[error("Invalid session ID or message")]
    InvalidSession,

    #[error("Invalid session ID or message")]
    EmptyMessage,

    #[error("Unknown component: {0}")]
    UnknownComponent(String),

    #[error("Component catalog unavailable: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Session store error: {0}")]
    Session(SessionError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<SessionError> for TurnError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotFound(_) => TurnError::InvalidSession,
            other => TurnError::Session(other),
        }
    }
}

impl TurnError {
    /// Whether the caller sent something unusable
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            TurnError::InvalidSession | TurnError::EmptyMessage | TurnError::UnknownComponent(_)
        )
    }
}
