//! Reconciler and Validator
//!
//! Everything between a raw Oracle reply and the next Journey Document:
//! reply interpretation, catalog binding, trigger resolution, directive
//! edits, and the two-mode validation checklist.

mod directives;
mod error;
mod reconciler;
mod reply;
mod triggers;
mod validation;

pub use directives::{NavigationOutcome, SelectionOutcome, apply_navigation_requests, apply_trigger_selections};
pub use error::ReconcileError;
pub use reconciler::{ReconcileReport, Reconciler};
pub use reply::{OracleReply, interpret_reply, normalize_keys, strip_fence};
pub use triggers::{
    AutoAssignment, EdgeSummary, TriggerCandidate, TriggerChoice, TriggerResolution, resolve_trigger,
};
pub use validation::{ValidationResult, Validator};
