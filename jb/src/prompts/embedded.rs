//! Embedded prompts
//!
//! These are compiled into the binary from .pmt files at build time.

use tracing::debug;

/// Journey update prompt: catalog, current document and user message in, JSON out
pub const JOURNEY: &str = include_str!("../../prompts/journey.pmt");

/// Guidance prompt: writes the friendly next prompt after an update
pub const GUIDANCE: &str = include_str!("../../prompts/guidance.pmt");

/// Get the embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    match name {
        "journey" => Some(JOURNEY),
        "guidance" => Some(GUIDANCE),
        _ => {
            debug!("get_embedded: no match found");
            None
        }
    }
}
