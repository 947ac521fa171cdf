//! Reconciler: turns an Oracle reply into the next Journey Document
//!
//! Every pass is deterministic and idempotent. Reconciling an already
//! reconciled document changes nothing.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::ReconcileError;
use super::triggers::{AutoAssignment, EdgeSummary, TriggerChoice, TriggerResolution, resolve_trigger};
use super::validation::Validator;
use crate::catalog::Catalog;
use crate::domain::{
    ComponentInstance, DEFAULT_COMPONENT_STYLE, DEFAULT_SCREEN_STYLE, DEFAULT_TEMPLATE, JourneyDocument,
    NAVIGATION_BUTTON_CLICK, NavigationEdge, Screen,
};

/// Top-level keys a partial reply may omit and inherit from the prior document
const INHERITED_KEYS: &[&str] = &["journey_name", "screens", "navigation"];

/// What a reconciliation pass changed or could not settle
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconcileReport {
    /// Edges that received the only trigger their source screen offers
    pub auto_assigned: Vec<AutoAssignment>,

    /// Edges whose source screen has no trigger field at all
    pub missing_triggers: Vec<EdgeSummary>,

    /// Edges whose source screen offers several triggers
    pub ambiguous_triggers: Vec<TriggerChoice>,

    /// Edges removed because an endpoint was absent or duplicated
    pub dropped_edges: usize,

    /// Triggers cleared because they were not trigger fields on the source screen
    pub cleared_triggers: usize,

    /// First structural gap, when the document is not yet well formed
    pub completion_gap: Option<String>,
}

/// Deterministic normalizer bound to one session's catalog
#[derive(Debug, Clone, Copy)]
pub struct Reconciler<'a> {
    catalog: &'a Catalog,
}

impl<'a> Reconciler<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Merge a parsed reply over `prior` and reconcile the result
    ///
    /// Keys the reply leaves out keep their prior values, and edges that come
    /// back without a trigger keep the trigger the same edge had before.
    pub fn reconcile_reply(
        &self,
        mut reply: Map<String, Value>,
        prior: &JourneyDocument,
    ) -> Result<(JourneyDocument, ReconcileReport), ReconcileError> {
        debug!(keys = ?reply.keys().collect::<Vec<_>>(), "reconcile_reply: called");

        let prior_value = serde_json::to_value(prior).map_err(|e| ReconcileError::Shape(e.to_string()))?;
        if let Value::Object(prior_map) = prior_value {
            for key in INHERITED_KEYS {
                if !reply.contains_key(*key) {
                    if let Some(value) = prior_map.get(*key) {
                        debug!(%key, "reconcile_reply: inheriting key from prior document");
                        reply.insert((*key).to_string(), value.clone());
                    }
                }
            }
        }

        let mut doc: JourneyDocument =
            serde_json::from_value(Value::Object(reply)).map_err(|e| ReconcileError::Shape(e.to_string()))?;
        inherit_triggers(&mut doc, prior);
        self.reconcile(doc)
    }

    /// Normalize a document against the catalog
    pub fn reconcile(&self, mut doc: JourneyDocument) -> Result<(JourneyDocument, ReconcileReport), ReconcileError> {
        debug!(screens = doc.screens.len(), edges = doc.navigation.len(), "reconcile: called");
        let mut report = ReconcileReport::default();

        doc.journey_name = doc.journey_name.trim().to_string();
        assign_screen_ids(&mut doc);
        for screen in doc.screens.iter_mut() {
            self.fill_screen(screen)?;
        }
        repair_edges(&mut doc, &mut report);
        doc.sync_screen_count();

        let structural = Validator::new(self.catalog).validate(&doc, false);
        if !structural.valid {
            report.completion_gap = Some(structural.message);
        }

        info!(
            screens = doc.no_screens,
            edges = doc.navigation.len(),
            auto_assigned = report.auto_assigned.len(),
            ambiguous = report.ambiguous_triggers.len(),
            dropped = report.dropped_edges,
            "Reconciled journey document"
        );
        Ok((doc, report))
    }

    fn fill_screen(&self, screen: &mut Screen) -> Result<(), ReconcileError> {
        screen.screen_name = screen
            .screen_name
            .take()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        if screen.template.as_deref().map(str::trim).is_none_or(str::is_empty) {
            screen.template = Some(DEFAULT_TEMPLATE.to_string());
        }
        if screen.style.as_deref().map(str::trim).is_none_or(str::is_empty) {
            screen.style = Some(DEFAULT_SCREEN_STYLE.to_string());
        }

        let placed = screen.screen_components.take().unwrap_or_default();
        let mut resolved = Vec::with_capacity(placed.len());
        for component in placed {
            if let Some(component) = self.resolve_component(screen, component)? {
                resolved.push(component);
            }
        }
        screen.screen_components = Some(resolved);
        Ok(())
    }

    /// Bind a placed component to its catalog entry; blank placeholders are dropped
    fn resolve_component(
        &self,
        screen: &Screen,
        component: ComponentInstance,
    ) -> Result<Option<ComponentInstance>, ReconcileError> {
        let name = component
            .screen_component_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty());
        if name.is_none() && component.screen_component_id.is_none() {
            debug!(screen = %screen.display_name(), "resolve_component: dropping blank component");
            return Ok(None);
        }

        let entry = self
            .catalog
            .resolve(name, component.screen_component_id)
            .ok_or_else(|| {
                let reference = match (name, component.screen_component_id) {
                    (Some(n), _) => n.to_string(),
                    (None, Some(id)) => format!("ID {}", id),
                    (None, None) => String::new(),
                };
                warn!(screen = %screen.display_name(), %reference, "Component not in catalog");
                ReconcileError::UnknownComponent {
                    screen: screen.display_name(),
                    reference,
                }
            })?;

        let style = component
            .screen_component_style
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_COMPONENT_STYLE.to_string());

        Ok(Some(ComponentInstance {
            screen_component_id: Some(entry.screen_component_id),
            screen_component_name: Some(entry.screen_component_name.clone()),
            screen_component_style: Some(style),
            field_components: entry.field_components.clone(),
        }))
    }
}

/// Give every screen a unique id, defaulting to its 1-based position
fn assign_screen_ids(doc: &mut JourneyDocument) {
    let mut taken = HashSet::new();
    for screen in doc.screens.iter_mut() {
        if let Some(id) = screen.screen_id {
            if !taken.insert(id) {
                warn!(screen_id = id, "Duplicate screen id; reassigning");
                screen.screen_id = None;
            }
        }
    }

    let mut next = taken.iter().copied().max().unwrap_or(0);
    for (idx, screen) in doc.screens.iter_mut().enumerate() {
        if screen.screen_id.is_some() {
            continue;
        }
        let position = idx as i64 + 1;
        let id = if taken.contains(&position) {
            next = next.max(position);
            while taken.contains(&next) {
                next += 1;
            }
            next
        } else {
            position
        };
        taken.insert(id);
        debug!(screen_id = id, "assign_screen_ids: assigned id");
        screen.screen_id = Some(id);
    }
}

/// Carry a prior trigger onto an edge the reply returned without one
fn inherit_triggers(doc: &mut JourneyDocument, prior: &JourneyDocument) {
    for edge in doc.navigation.iter_mut().filter(|e| e.trigger_component_id.is_none()) {
        let inherited = prior
            .navigation
            .iter()
            .find(|p| p.source_screen_id == edge.source_screen_id && p.target_screen_id == edge.target_screen_id)
            .and_then(|p| p.trigger_component_id);
        if inherited.is_some() {
            debug!(trigger = ?inherited, "inherit_triggers: keeping prior trigger");
            edge.trigger_component_id = inherited;
        }
    }
}

/// Drop dangling or duplicate edges, then settle each edge's trigger
fn repair_edges(doc: &mut JourneyDocument, report: &mut ReconcileReport) {
    let edges = std::mem::take(&mut doc.navigation);
    let mut kept = Vec::with_capacity(edges.len());

    for mut edge in edges {
        let (Some(source_id), Some(target_id)) = (edge.source_screen_id, edge.target_screen_id) else {
            report.dropped_edges += 1;
            continue;
        };
        let (Some(source), Some(target)) = (doc.screen(source_id), doc.screen(target_id)) else {
            warn!(source_id, target_id, "Dropping edge to a screen that does not exist");
            report.dropped_edges += 1;
            continue;
        };
        let duplicate = kept
            .iter()
            .any(|k: &NavigationEdge| k.source_screen_id == Some(source_id) && k.target_screen_id == Some(target_id));
        if duplicate {
            report.dropped_edges += 1;
            continue;
        }

        if edge.navigation_type.as_deref().map(str::trim).is_none_or(str::is_empty) {
            edge.navigation_type = Some(NAVIGATION_BUTTON_CLICK.to_string());
        }

        if let Some(trigger) = edge.trigger_component_id {
            if !source.has_trigger_field(trigger) {
                warn!(trigger, source_id, "Clearing trigger that is not a trigger field on the source screen");
                edge.trigger_component_id = None;
                report.cleared_triggers += 1;
            }
        }

        if edge.trigger_component_id.is_none() {
            let summary = EdgeSummary::between(source, target);
            match resolve_trigger(source) {
                TriggerResolution::Unique(trigger) => {
                    edge.trigger_component_id = Some(trigger.id);
                    report.auto_assigned.push(AutoAssignment { edge: summary, trigger });
                }
                TriggerResolution::NoneFound => report.missing_triggers.push(summary),
                TriggerResolution::Ambiguous(candidates) => {
                    report.ambiguous_triggers.push(TriggerChoice {
                        edge: summary,
                        candidates,
                    });
                }
            }
        }

        kept.push(edge);
    }

    doc.navigation = kept;
}
