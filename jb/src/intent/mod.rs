//! Intent Extractor
//!
//! Classifies each incoming message before any model call: fixed commands
//! (confirm/cancel/quit), the ambiguity guard, and structured directives
//! embedded in free text (trigger selection, navigation requests).

mod extractor;

pub use extractor::{
    CANCEL_COMMANDS, CONFIRM_COMMANDS, DEFAULT_AMBIGUITY_PATTERNS, Intent, IntentExtractor, NavigationRequest,
    QUIT_COMMANDS, TriggerSelection,
};
