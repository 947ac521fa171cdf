//! Trigger component resolution
//!
//! An edge's trigger must be a field flagged `isTriggerComponent` on the
//! source screen. When none is chosen, the number of eligible fields decides:
//! zero leaves it unset, one is assigned, more than one waits for the user.

use serde::Serialize;

use crate::catalog::FieldComponent;
use crate::domain::{JourneyDocument, NavigationEdge, Screen};

/// A trigger-eligible field offered to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggerCandidate {
    pub id: i64,
    pub name: String,
    pub label: String,
}

impl From<&FieldComponent> for TriggerCandidate {
    fn from(field: &FieldComponent) -> Self {
        Self {
            id: field.field_component_id,
            name: field.field_name.clone(),
            label: field.field_label.clone(),
        }
    }
}

/// Outcome of scanning a source screen for trigger fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerResolution {
    /// Exactly one eligible field
    Unique(TriggerCandidate),
    /// No eligible field on the screen
    NoneFound,
    /// Several eligible fields; the user has to pick
    Ambiguous(Vec<TriggerCandidate>),
}

/// Scan a screen's resolved fields for trigger candidates
pub fn resolve_trigger(screen: &Screen) -> TriggerResolution {
    let mut candidates: Vec<TriggerCandidate> = screen.trigger_fields().into_iter().map(Into::into).collect();
    match candidates.len() {
        0 => TriggerResolution::NoneFound,
        1 => TriggerResolution::Unique(candidates.remove(0)),
        _ => TriggerResolution::Ambiguous(candidates),
    }
}

/// Source and target of an edge with display names, for reports and prompts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeSummary {
    pub source_screen_id: i64,
    pub source_screen_name: String,
    pub target_screen_id: i64,
    pub target_screen_name: String,
}

impl EdgeSummary {
    /// Summarize an edge whose endpoints exist in `doc`
    pub fn of(doc: &JourneyDocument, edge: &NavigationEdge) -> Option<Self> {
        let source = doc.screen(edge.source_screen_id?)?;
        let target = doc.screen(edge.target_screen_id?)?;
        Some(Self::between(source, target))
    }

    pub fn between(source: &Screen, target: &Screen) -> Self {
        Self {
            source_screen_id: source.screen_id.unwrap_or_default(),
            source_screen_name: source.display_name(),
            target_screen_id: target.screen_id.unwrap_or_default(),
            target_screen_name: target.display_name(),
        }
    }
}

impl std::fmt::Display for EdgeSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (ID: {}) to {} (ID: {})",
            self.source_screen_name, self.source_screen_id, self.target_screen_name, self.target_screen_id
        )
    }
}

/// A trigger the reconciler picked because it was the only option
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutoAssignment {
    #[serde(flatten)]
    pub edge: EdgeSummary,
    pub trigger: TriggerCandidate,
}

/// An edge waiting for the user to choose among several triggers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggerChoice {
    #[serde(flatten)]
    pub edge: EdgeSummary,
    pub candidates: Vec<TriggerCandidate>,
}

impl TriggerChoice {
    /// Prompt text listing the candidates and how to pick one
    pub fn prompt(&self) -> String {
        let options = self
            .candidates
            .iter()
            .map(|c| format!("ID {} ({}, \"{}\")", c.id, c.name, c.label))
            .collect::<Vec<_>>()
            .join(", ");
        let example = self.candidates.first().map(|c| c.id).unwrap_or_default();
        format!(
            "The navigation from {} can be triggered by: {}. Reply with e.g. \"use trigger {} for screen {}\".",
            self.edge, options, example, self.edge.source_screen_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ComponentInstance, DEFAULT_FIELD_STYLE};

    fn field(id: i64, trigger: bool) -> FieldComponent {
        FieldComponent {
            field_component_id: id,
            field_type: "button".into(),
            field_name: format!("btn{}", id),
            field_label: format!("Button {}", id),
            validations: Default::default(),
            data_source: None,
            dependencies: None,
            is_trigger_component: trigger,
            style: DEFAULT_FIELD_STYLE.into(),
        }
    }

    fn screen_with(fields: Vec<FieldComponent>) -> Screen {
        Screen {
            screen_id: Some(1),
            screen_name: Some("A".into()),
            screen_components: Some(vec![ComponentInstance {
                field_components: fields,
                ..Default::default()
            }]),
            ..Default::default()
        }
    }

    #[test]
    fn test_resolve_none() {
        let screen = screen_with(vec![field(1, false)]);
        assert_eq!(resolve_trigger(&screen), TriggerResolution::NoneFound);
    }

    #[test]
    fn test_resolve_unique() {
        let screen = screen_with(vec![field(11, false), field(13, true)]);
        match resolve_trigger(&screen) {
            TriggerResolution::Unique(c) => assert_eq!(c.id, 13),
            other => panic!("Expected Unique, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_ambiguous_keeps_field_order() {
        let screen = screen_with(vec![field(10, true), field(11, false), field(13, true)]);
        match resolve_trigger(&screen) {
            TriggerResolution::Ambiguous(c) => {
                assert_eq!(c.iter().map(|c| c.id).collect::<Vec<_>>(), vec![10, 13]);
                assert_eq!(c[1].label, "Button 13");
            }
            other => panic!("Expected Ambiguous, got {:?}", other),
        }
    }

    #[test]
    fn test_trigger_choice_prompt() {
        let choice = TriggerChoice {
            edge: EdgeSummary {
                source_screen_id: 1,
                source_screen_name: "A".into(),
                target_screen_id: 2,
                target_screen_name: "B".into(),
            },
            candidates: vec![
                TriggerCandidate {
                    id: 10,
                    name: "next".into(),
                    label: "Next".into(),
                },
                TriggerCandidate {
                    id: 13,
                    name: "verify".into(),
                    label: "Verify".into(),
                },
            ],
        };
        let prompt = choice.prompt();
        assert!(prompt.contains("ID 10 (next, \"Next\")"));
        assert!(prompt.contains("ID 13"));
        assert!(prompt.contains("use trigger 10 for screen 1"));
    }
}
