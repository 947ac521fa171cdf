//! Conversation
//!
//! One turn per user message: classify, then confirm, cancel, quit, apply a
//! directive, or ask the Oracle and reconcile its reply.

mod engine;
mod error;
pub mod messages;
mod outcome;

pub use engine::{ConversationEngine, EngineSettings};
pub use error::TurnError;
pub use outcome::{StartOutcome, TurnKind, TurnOutcome, UnchangedReason};
