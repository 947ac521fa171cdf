//! Journey Builder - conversational banking journey configuration
//!
//! A user describes a multi-screen banking flow in plain language; a hosted
//! LLM turns each message into a structured journey document, which is then
//! reconciled against a fixed component catalog before it is stored.
//!
//! # Modules
//!
//! - [`catalog`] - Component catalog and its providers
//! - [`domain`] - Journey document, session ids, lifecycle
//! - [`intent`] - Command and directive recognition
//! - [`reconcile`] - Reply parsing, defaulting, trigger resolution, validation
//! - [`conversation`] - Turn processing and the confirm/cancel/quit state machine
//! - [`session`] - In-memory session store
//! - [`llm`] - LLM client trait and providers
//! - [`server`] - HTTP routes
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod catalog;
pub mod cli;
pub mod config;
pub mod conversation;
pub mod diagram;
pub mod domain;
pub mod intent;
pub mod llm;
pub mod prompts;
pub mod reconcile;
pub mod server;
pub mod session;

pub use catalog::{BuiltinCatalog, Catalog, CatalogEntry, CatalogError, CatalogProvider, FieldComponent, FileCatalog};
pub use config::Config;
pub use conversation::{ConversationEngine, EngineSettings, TurnError, TurnKind, TurnOutcome};
pub use domain::{JourneyDocument, Lifecycle, SessionId};
pub use llm::{LlmClient, LlmError, create_client};
pub use reconcile::{ReconcileReport, Reconciler, ValidationResult, Validator};
pub use session::SessionStore;
