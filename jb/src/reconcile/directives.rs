//! Deterministic edits for explicit user directives
//!
//! "use trigger 13 for screen 1" and "connect Welcome to PAN" are applied
//! straight to the document without a model round trip.

use tracing::{debug, info};

use super::triggers::{EdgeSummary, TriggerCandidate, TriggerChoice, TriggerResolution, resolve_trigger};
use crate::domain::{JourneyDocument, NavigationEdge, ScreenRef};
use crate::intent::{NavigationRequest, TriggerSelection};

/// Result of one trigger selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// The trigger now fires `edges` outgoing edges of `screen`
    Applied {
        screen: String,
        trigger: TriggerCandidate,
        edges: usize,
    },
    /// The field is absent from the screen or is not a trigger
    NotATrigger { screen: String, trigger_component_id: i64 },
    NoOutgoingEdges { screen: String },
    UnknownScreen(ScreenRef),
}

impl SelectionOutcome {
    pub fn describe(&self) -> String {
        match self {
            SelectionOutcome::Applied { screen, trigger, .. } => format!(
                "{} (ID {}) now triggers navigation from {}.",
                trigger.label, trigger.id, screen
            ),
            SelectionOutcome::NotATrigger {
                screen,
                trigger_component_id,
            } => format!(
                "Component {} is not a trigger on {}, so it was not applied.",
                trigger_component_id, screen
            ),
            SelectionOutcome::NoOutgoingEdges { screen } => {
                format!("{} has no navigation leading away from it yet.", screen)
            }
            SelectionOutcome::UnknownScreen(screen_ref) => {
                format!("I couldn't find {} in this journey.", screen_ref)
            }
        }
    }
}

/// Result of one navigation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    Created {
        edge: EdgeSummary,
        trigger: TriggerResolution,
    },
    AlreadyExists(EdgeSummary),
    SameScreen(String),
    UnknownScreen(ScreenRef),
}

impl NavigationOutcome {
    pub fn describe(&self) -> String {
        match self {
            NavigationOutcome::Created { edge, trigger } => match trigger {
                TriggerResolution::Unique(c) => {
                    format!("Added navigation from {} using {} (ID {}).", edge, c.label, c.id)
                }
                TriggerResolution::NoneFound => format!(
                    "Added navigation from {}, but {} has no trigger component to fire it.",
                    edge, edge.source_screen_name
                ),
                TriggerResolution::Ambiguous(candidates) => {
                    let choice = TriggerChoice {
                        edge: edge.clone(),
                        candidates: candidates.clone(),
                    };
                    format!("Added navigation from {}. {}", edge, choice.prompt())
                }
            },
            NavigationOutcome::AlreadyExists(edge) => format!("Navigation from {} already exists.", edge),
            NavigationOutcome::SameScreen(name) => format!("{} cannot navigate to itself.", name),
            NavigationOutcome::UnknownScreen(screen_ref) => {
                format!("I couldn't find {} in this journey.", screen_ref)
            }
        }
    }
}

/// Apply trigger selections to outgoing edges of each named screen
///
/// Edges still lacking a trigger are filled first; when none lack one, every
/// outgoing edge of the screen takes the new trigger.
pub fn apply_trigger_selections(doc: &mut JourneyDocument, selections: &[TriggerSelection]) -> Vec<SelectionOutcome> {
    debug!(count = selections.len(), "apply_trigger_selections: called");
    selections.iter().map(|s| apply_selection(doc, s)).collect()
}

fn apply_selection(doc: &mut JourneyDocument, selection: &TriggerSelection) -> SelectionOutcome {
    let Some(source) = doc.resolve_screen(&selection.screen) else {
        return SelectionOutcome::UnknownScreen(selection.screen.clone());
    };
    let Some(source_id) = source.screen_id else {
        return SelectionOutcome::UnknownScreen(selection.screen.clone());
    };
    let screen = source.display_name();
    let trigger_id = selection.trigger_component_id;

    let Some(field) = source.field(trigger_id).filter(|f| f.is_trigger_component) else {
        debug!(trigger_id, %screen, "apply_selection: not a trigger on this screen");
        return SelectionOutcome::NotATrigger {
            screen,
            trigger_component_id: trigger_id,
        };
    };
    let trigger = TriggerCandidate::from(field);

    let outgoing: Vec<usize> = doc
        .navigation
        .iter()
        .enumerate()
        .filter(|(_, e)| e.source_screen_id == Some(source_id))
        .map(|(i, _)| i)
        .collect();
    if outgoing.is_empty() {
        return SelectionOutcome::NoOutgoingEdges { screen };
    }

    let unset: Vec<usize> = outgoing
        .iter()
        .copied()
        .filter(|&i| doc.navigation[i].trigger_component_id.is_none())
        .collect();
    let targets = if unset.is_empty() { outgoing } else { unset };
    for &i in &targets {
        doc.navigation[i].trigger_component_id = Some(trigger_id);
    }

    info!(trigger_id, %screen, edges = targets.len(), "Applied trigger selection");
    SelectionOutcome::Applied {
        screen,
        trigger,
        edges: targets.len(),
    }
}

/// Create edges for explicit navigation requests
pub fn apply_navigation_requests(doc: &mut JourneyDocument, requests: &[NavigationRequest]) -> Vec<NavigationOutcome> {
    debug!(count = requests.len(), "apply_navigation_requests: called");
    requests.iter().map(|r| apply_request(doc, r)).collect()
}

fn apply_request(doc: &mut JourneyDocument, request: &NavigationRequest) -> NavigationOutcome {
    let Some(source) = doc.resolve_screen(&request.from) else {
        return NavigationOutcome::UnknownScreen(request.from.clone());
    };
    let Some(target) = doc.resolve_screen(&request.to) else {
        return NavigationOutcome::UnknownScreen(request.to.clone());
    };
    let (Some(source_id), Some(target_id)) = (source.screen_id, target.screen_id) else {
        return NavigationOutcome::UnknownScreen(request.from.clone());
    };
    if source_id == target_id {
        return NavigationOutcome::SameScreen(source.display_name());
    }

    let summary = EdgeSummary::between(source, target);
    if doc.has_edge(source_id, target_id) {
        return NavigationOutcome::AlreadyExists(summary);
    }

    let trigger = resolve_trigger(source);
    let mut edge = NavigationEdge::between(source_id, target_id);
    if let TriggerResolution::Unique(candidate) = &trigger {
        edge.trigger_component_id = Some(candidate.id);
    }
    doc.navigation.push(edge);

    info!(source_id, target_id, "Added navigation edge");
    NavigationOutcome::Created { edge: summary, trigger }
}
