//! HTTP surface
//!
//! Routes: `/health`, `/start`, `/process`, `/field-components/:name`,
//! `/components`, `/diagram/:session_id`, all under the configured base path.

mod error;
mod handlers;
mod router;

pub use error::ApiError;
pub use handlers::{AppState, DiagramResponse, HealthResponse, ProcessRequest};
pub use router::{router, serve};
