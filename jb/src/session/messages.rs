//! Session store messages
//!
//! Commands and responses for the actor pattern.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::oneshot;

use super::SharedSession;
use crate::catalog::Catalog;
use crate::domain::SessionId;

/// Errors from session operations
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(SessionId),

    #[error("Channel error")]
    ChannelError,
}

/// Response from session operations
pub type SessionResponse<T> = Result<T, SessionError>;

/// Commands sent to the SessionStore actor
#[derive(Debug)]
pub enum SessionCommand {
    Create {
        catalog: Arc<Catalog>,
        reply: oneshot::Sender<SessionResponse<SessionId>>,
    },
    Get {
        id: SessionId,
        reply: oneshot::Sender<SessionResponse<SharedSession>>,
    },
    Delete {
        id: SessionId,
        reply: oneshot::Sender<SessionResponse<bool>>,
    },
    Count {
        reply: oneshot::Sender<SessionResponse<usize>>,
    },
    Shutdown,
}
