//! Turn results

use serde::Serialize;

use crate::domain::{JourneyDocument, SessionId};
use crate::reconcile::TriggerChoice;

/// Why a turn left the document as it was
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnchangedReason {
    /// The model asked a question instead of sending a document
    Clarification,
    /// The model call failed or timed out
    OracleFailed,
    /// The reply could not be read as a journey
    Malformed,
    /// The reply placed a component the catalog does not have
    UnknownComponent,
    /// The message was too vague to send to the model
    Ambiguous,
}

/// What a turn did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnKind {
    /// The model's document was reconciled and stored
    Updated,
    /// A trigger or navigation directive was applied without the model
    DirectiveApplied,
    DocumentUnchanged(UnchangedReason),
    Confirmed,
    ConfirmBlocked,
    Cancelled,
    Quit,
}

/// Response body of `/start`
#[derive(Debug, Clone, Serialize)]
pub struct StartOutcome {
    pub message: String,
    pub next_prompt: String,
    #[serde(rename = "final")]
    pub is_final: bool,
    pub session_id: SessionId,
}

/// Response body of `/process`
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    pub journey_json: JourneyDocument,
    pub next_prompt: String,
    /// The session is gone after this turn
    #[serde(rename = "final")]
    pub is_final: bool,
    pub needs_trigger_selection: bool,
    pub trigger_candidates: Vec<TriggerChoice>,
    pub flow_diagram: String,
    #[serde(skip)]
    pub kind: TurnKind,
}
