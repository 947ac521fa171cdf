//! ConversationEngine - processes one user message per call
//!
//! Each turn holds its session's lock from classification to the stored
//! result, Oracle call included. Other sessions are unaffected because every
//! session has its own lock.

use std::sync::Arc;
use std::time::Duration;

use eyre::Result;
use tracing::{debug, error, info, warn};

use super::messages;
use super::{StartOutcome, TurnError, TurnKind, TurnOutcome, UnchangedReason};
use crate::catalog::{Catalog, CatalogProvider, CatalogSummary, FieldComponent};
use crate::config::{AmbiguityPolicy, Config};
use crate::diagram;
use crate::domain::{JourneyDocument, Lifecycle, LifecycleEvent, SessionId};
use crate::intent::{Intent, IntentExtractor};
use crate::llm::{self, CompletionRequest, LlmClient, LlmError};
use crate::prompts::{GuidancePromptContext, JourneyPromptContext, PromptLoader};
use crate::reconcile::{
    EdgeSummary, NavigationOutcome, OracleReply, ReconcileError, ReconcileReport, Reconciler, SelectionOutcome,
    TriggerChoice, TriggerResolution, Validator, apply_navigation_requests, apply_trigger_selections,
    interpret_reply, resolve_trigger,
};
use crate::session::{SessionState, SessionStore};

/// Tunables for turn processing
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub ambiguity_policy: AmbiguityPolicy,

    /// Let the model phrase the next prompt after an update
    pub guidance: bool,

    pub max_tokens: u32,

    pub temperature: f32,

    /// Upper bound on each Oracle call
    pub timeout: Duration,
}

impl EngineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            ambiguity_policy: config.conversation.ambiguity_policy,
            guidance: config.conversation.guidance,
            max_tokens: config.llm.max_tokens,
            temperature: config.llm.temperature,
            timeout: config.llm.timeout(),
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Turn processor shared by all HTTP handlers
pub struct ConversationEngine {
    sessions: SessionStore,
    catalog: Arc<dyn CatalogProvider>,
    llm: Arc<dyn LlmClient>,
    prompts: PromptLoader,
    extractor: IntentExtractor,
    settings: EngineSettings,
}

impl ConversationEngine {
    pub fn new(
        sessions: SessionStore,
        catalog: Arc<dyn CatalogProvider>,
        llm: Arc<dyn LlmClient>,
        prompts: PromptLoader,
        extractor: IntentExtractor,
        settings: EngineSettings,
    ) -> Self {
        debug!(?settings, "ConversationEngine::new: called");
        Self {
            sessions,
            catalog,
            llm,
            prompts,
            extractor,
            settings,
        }
    }

    /// Build an engine from configuration
    pub fn from_config(
        config: &Config,
        sessions: SessionStore,
        catalog: Arc<dyn CatalogProvider>,
        llm: Arc<dyn LlmClient>,
    ) -> Result<Self> {
        debug!("ConversationEngine::from_config: called");
        let extractor = IntentExtractor::new(&config.conversation.ambiguity_patterns)?;
        let prompts = PromptLoader::new(config.conversation.prompts_dir.as_deref());
        Ok(Self::new(
            sessions,
            catalog,
            llm,
            prompts,
            extractor,
            EngineSettings::from_config(config),
        ))
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Open a session with a fresh catalog snapshot
    pub async fn start(&self) -> Result<StartOutcome, TurnError> {
        debug!("start: called");
        let catalog = Arc::new(self.catalog.snapshot().await?);
        let session_id = self.sessions.create(catalog).await?;
        Ok(StartOutcome {
            message: messages::SESSION_STARTED.to_string(),
            next_prompt: messages::WELCOME_PROMPT.to_string(),
            is_final: false,
            session_id,
        })
    }

    /// Process one user message against a session
    pub async fn process(&self, session_id: &SessionId, message: &str) -> Result<TurnOutcome, TurnError> {
        debug!(%session_id, message_len = message.len(), "process: called");
        let message = message.trim();
        if message.is_empty() {
            return Err(TurnError::EmptyMessage);
        }

        let session = self.sessions.get(session_id).await?;
        let mut state = session.lock().await;
        if !state.is_open() {
            debug!(%session_id, lifecycle = ?state.lifecycle, "process: session already closed");
            return Err(TurnError::InvalidSession);
        }
        state.turns += 1;

        let turn = match self.extractor.classify(message) {
            Intent::Confirm => self.confirm(&mut state).await?,
            Intent::Cancel => self.cancel(&mut state),
            Intent::Quit => self.quit(&mut state).await?,
            Intent::Ambiguous if self.settings.ambiguity_policy.applies_to(&state.journey) => {
                info!(%session_id, "Message too vague; asking for detail");
                let prompt = messages::ambiguity(&state.catalog);
                outcome(
                    &state.journey,
                    prompt,
                    TurnKind::DocumentUnchanged(UnchangedReason::Ambiguous),
                )
            }
            Intent::TriggerSelection(selections) => {
                let mut doc = state.journey.clone();
                let results = apply_trigger_selections(&mut doc, &selections);
                if results.iter().all(|r| matches!(r, SelectionOutcome::UnknownScreen(_))) {
                    debug!("process: trigger selection named no known screen");
                    self.oracle_turn(&mut state, message).await?
                } else {
                    let notes = results.iter().map(SelectionOutcome::describe).collect();
                    directive_turn(&mut state, doc, notes)
                }
            }
            Intent::NavigationRequest(requests) => {
                let mut doc = state.journey.clone();
                let results = apply_navigation_requests(&mut doc, &requests);
                if results.iter().all(|r| matches!(r, NavigationOutcome::UnknownScreen(_))) {
                    debug!("process: navigation request named no known screen");
                    self.oracle_turn(&mut state, message).await?
                } else {
                    let notes = results.iter().map(NavigationOutcome::describe).collect();
                    directive_turn(&mut state, doc, notes)
                }
            }
            Intent::Ambiguous | Intent::FreeText => self.oracle_turn(&mut state, message).await?,
        };

        debug!(%session_id, kind = ?turn.kind, "process: turn complete");
        Ok(turn)
    }

    /// Field list of one catalog component
    pub async fn field_components(&self, name: &str) -> Result<Vec<FieldComponent>, TurnError> {
        debug!(%name, "field_components: called");
        let catalog = self.catalog.snapshot().await?;
        catalog
            .by_name(name)
            .map(|e| e.field_components.clone())
            .ok_or_else(|| TurnError::UnknownComponent(name.to_string()))
    }

    /// Catalog listing without field detail
    pub async fn components(&self) -> Result<Vec<CatalogSummary>, TurnError> {
        debug!("components: called");
        Ok(self.catalog.snapshot().await?.summaries())
    }

    /// Mermaid flowchart of a session's journey
    pub async fn diagram(&self, session_id: &SessionId) -> Result<String, TurnError> {
        debug!(%session_id, "diagram: called");
        let session = self.sessions.get(session_id).await?;
        let state = session.lock().await;
        if !state.is_open() {
            return Err(TurnError::InvalidSession);
        }
        Ok(diagram::flowchart(&state.journey))
    }

    async fn confirm(&self, state: &mut SessionState) -> Result<TurnOutcome, TurnError> {
        debug!(session_id = %state.id, "confirm: called");
        let verdict = Validator::new(&state.catalog).validate(&state.journey, true);
        let next = state.lifecycle.next(LifecycleEvent::Confirm { valid: verdict.valid });

        if next != Lifecycle::Confirmed {
            info!(session_id = %state.id, gap = %verdict.message, "Confirmation blocked");
            return Ok(outcome(
                &state.journey,
                messages::confirm_blocked(&verdict.message),
                TurnKind::ConfirmBlocked,
            ));
        }

        state.lifecycle = next;
        self.sessions.delete(&state.id).await?;
        info!(
            session_id = %state.id,
            journey = %state.journey.journey_name,
            screens = state.journey.no_screens,
            turns = state.turns,
            "Journey confirmed"
        );
        Ok(outcome(&state.journey, messages::CONFIRMED.to_string(), TurnKind::Confirmed))
    }

    fn cancel(&self, state: &mut SessionState) -> TurnOutcome {
        debug!(session_id = %state.id, "cancel: called");
        state.lifecycle = state.lifecycle.next(LifecycleEvent::Cancel).settle();
        state.reset();
        info!(session_id = %state.id, "Journey cancelled");
        outcome(&state.journey, messages::CANCELLED.to_string(), TurnKind::Cancelled)
    }

    async fn quit(&self, state: &mut SessionState) -> Result<TurnOutcome, TurnError> {
        debug!(session_id = %state.id, "quit: called");
        state.lifecycle = state.lifecycle.next(LifecycleEvent::Quit);
        self.sessions.delete(&state.id).await?;
        info!(session_id = %state.id, turns = state.turns, "Session quit");
        Ok(outcome(&state.journey, messages::QUIT.to_string(), TurnKind::Quit))
    }

    /// Ask the model for the next document and reconcile it
    async fn oracle_turn(&self, state: &mut SessionState, message: &str) -> Result<TurnOutcome, TurnError> {
        debug!(session_id = %state.id, "oracle_turn: called");
        let catalog = Arc::clone(&state.catalog);
        let context = JourneyPromptContext::new(&catalog, &state.journey, message).map_err(internal)?;
        let prompt = self.prompts.journey_prompt(&context).map_err(internal)?;

        let text = match self.ask(prompt).await {
            Ok(text) => text,
            Err(e) => {
                error!(session_id = %state.id, error = %e, "Oracle call failed");
                return Ok(unchanged(state, messages::ORACLE_FAILURE, UnchangedReason::OracleFailed));
            }
        };

        let reply = match interpret_reply(&text) {
            Ok(OracleReply::Document(map)) => map,
            Ok(OracleReply::Clarification(question)) => {
                info!(session_id = %state.id, "Oracle asked for clarification");
                return Ok(unchanged(state, &question, UnchangedReason::Clarification));
            }
            Err(e) => {
                warn!(session_id = %state.id, error = %e, reply = %text, "Oracle reply is not a journey");
                return Ok(unchanged(state, messages::PARSE_FAILURE, UnchangedReason::Malformed));
            }
        };

        let (doc, report) = match Reconciler::new(&catalog).reconcile_reply(reply, &state.journey) {
            Ok(result) => result,
            Err(ReconcileError::UnknownComponent { reference, .. }) => {
                let prompt = messages::unknown_component(&reference, &catalog);
                return Ok(unchanged(state, &prompt, UnchangedReason::UnknownComponent));
            }
            Err(e) => {
                warn!(session_id = %state.id, error = %e, "Oracle document rejected");
                return Ok(unchanged(state, messages::PARSE_FAILURE, UnchangedReason::Malformed));
            }
        };

        let next_prompt = self.next_prompt(&catalog, &doc, message, &report).await;
        state.journey = doc;
        Ok(outcome(&state.journey, next_prompt, TurnKind::Updated))
    }

    /// Guidance from the model, or a plain summary, plus trigger questions and the gap
    async fn next_prompt(
        &self,
        catalog: &Catalog,
        doc: &JourneyDocument,
        message: &str,
        report: &ReconcileReport,
    ) -> String {
        let mut notes: Vec<String> = report.auto_assigned.iter().map(messages::auto_assigned).collect();
        notes.extend(report.missing_triggers.iter().map(messages::missing_trigger));

        let mut prompt = if self.settings.guidance {
            match self.guidance(catalog, doc, message, &notes, report).await {
                Ok(text) => text.trim().to_string(),
                Err(e) => {
                    warn!(error = %e, "Guidance unavailable; using summary");
                    messages::summary(doc, catalog, &notes)
                }
            }
        } else {
            messages::summary(doc, catalog, &notes)
        };

        append_followups(&mut prompt, report);
        prompt
    }

    async fn guidance(
        &self,
        catalog: &Catalog,
        doc: &JourneyDocument,
        message: &str,
        notes: &[String],
        report: &ReconcileReport,
    ) -> Result<String> {
        let context =
            GuidancePromptContext::new(catalog, doc, message, notes.to_vec(), report.completion_gap.clone())?;
        let prompt = self.prompts.guidance_prompt(&context)?;
        Ok(self.ask(prompt).await?)
    }

    async fn ask(&self, prompt: String) -> Result<String, LlmError> {
        let request =
            CompletionRequest::prompt(prompt, self.settings.max_tokens).with_temperature(self.settings.temperature);
        llm::ask(self.llm.as_ref(), request, self.settings.timeout).await
    }
}

/// Store a directive-edited document after a reconcile pass
fn directive_turn(state: &mut SessionState, doc: JourneyDocument, notes: Vec<String>) -> TurnOutcome {
    debug!(session_id = %state.id, "directive_turn: called");
    let catalog = Arc::clone(&state.catalog);
    match Reconciler::new(&catalog).reconcile(doc) {
        Ok((doc, report)) => {
            let mut prompt = notes.join("\n");
            append_followups(&mut prompt, &report);
            state.journey = doc;
            outcome(&state.journey, prompt, TurnKind::DirectiveApplied)
        }
        Err(e) => {
            warn!(session_id = %state.id, error = %e, "Directive left the journey inconsistent");
            unchanged(state, messages::PARSE_FAILURE, UnchangedReason::Malformed)
        }
    }
}

fn append_followups(prompt: &mut String, report: &ReconcileReport) {
    for choice in &report.ambiguous_triggers {
        let question = choice.prompt();
        if !prompt.contains(&question) {
            prompt.push_str("\n\n");
            prompt.push_str(&question);
        }
    }
    if let Some(gap) = &report.completion_gap {
        if !prompt.contains(gap.as_str()) {
            prompt.push_str(&messages::completion_gap(gap));
        }
    }
}

/// Edges waiting for the user to pick one of several triggers
fn pending_choices(doc: &JourneyDocument) -> Vec<TriggerChoice> {
    doc.navigation
        .iter()
        .filter(|e| e.trigger_component_id.is_none())
        .filter_map(|e| {
            let edge = EdgeSummary::of(doc, e)?;
            let source = doc.screen(edge.source_screen_id)?;
            match resolve_trigger(source) {
                TriggerResolution::Ambiguous(candidates) => Some(TriggerChoice { edge, candidates }),
                _ => None,
            }
        })
        .collect()
}

fn outcome(doc: &JourneyDocument, next_prompt: String, kind: TurnKind) -> TurnOutcome {
    let trigger_candidates = pending_choices(doc);
    TurnOutcome {
        journey_json: doc.clone(),
        next_prompt,
        is_final: matches!(kind, TurnKind::Confirmed | TurnKind::Quit),
        needs_trigger_selection: doc.needs_trigger_selection(),
        trigger_candidates,
        flow_diagram: diagram::flowchart(doc),
        kind,
    }
}

fn unchanged(state: &SessionState, next_prompt: &str, reason: UnchangedReason) -> TurnOutcome {
    outcome(
        &state.journey,
        next_prompt.to_string(),
        TurnKind::DocumentUnchanged(reason),
    )
}

fn internal(err: eyre::Report) -> TurnError {
    TurnError::Internal(err.to_string())
}
