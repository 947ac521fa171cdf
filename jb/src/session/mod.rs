//! Session Store
//!
//! In-memory map from unguessable session id to session state. Sessions live
//! for the process lifetime or until confirmed or quit.

mod messages;
mod state;
mod store;

pub use messages::{SessionCommand, SessionError, SessionResponse};
pub use state::{SessionState, SharedSession};
pub use store::SessionStore;
