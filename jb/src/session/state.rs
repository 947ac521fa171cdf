//! Per-session state

use std::sync::Arc;

use tracing::debug;

use crate::catalog::Catalog;
use crate::domain::{JourneyDocument, Lifecycle, SessionId};

/// Session state behind its own lock; one turn holds it at a time
pub type SharedSession = Arc<tokio::sync::Mutex<SessionState>>;

/// Everything a session owns
#[derive(Debug, Clone)]
pub struct SessionState {
    pub id: SessionId,

    /// The journey being built
    pub journey: JourneyDocument,

    /// Catalog fetched at session start, never refreshed
    pub catalog: Arc<Catalog>,

    pub lifecycle: Lifecycle,

    /// Messages processed so far
    pub turns: u64,
}

impl SessionState {
    pub fn new(id: SessionId, catalog: Arc<Catalog>) -> Self {
        debug!(%id, "SessionState::new: called");
        Self {
            id,
            journey: JourneyDocument::empty(),
            catalog,
            lifecycle: Lifecycle::Building,
            turns: 0,
        }
    }

    /// Whether requests may still act on this session
    pub fn is_open(&self) -> bool {
        !self.lifecycle.is_terminal()
    }

    /// Discard the journey; the catalog snapshot stays
    pub fn reset(&mut self) {
        debug!(id = %self.id, "SessionState::reset: called");
        self.journey = JourneyDocument::empty();
    }
}
