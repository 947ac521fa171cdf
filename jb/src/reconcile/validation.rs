//! Journey validation
//!
//! Checks run in a fixed order and stop at the first failure, so the user
//! always gets the most fundamental gap first.

use serde::Serialize;
use tracing::debug;

use crate::catalog::Catalog;
use crate::domain::{JourneyDocument, Screen};

/// Validation outcome with a user-facing message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub message: String,
}

impl ValidationResult {
    fn ok(message: &str) -> Self {
        Self {
            valid: true,
            message: message.to_string(),
        }
    }

    fn gap(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
        }
    }
}

/// Validator bound to the session catalog
#[derive(Debug, Clone, Copy)]
pub struct Validator<'a> {
    catalog: &'a Catalog,
}

impl<'a> Validator<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Structural checks only, or the full confirmation checklist
    pub fn validate(&self, doc: &JourneyDocument, full_check: bool) -> ValidationResult {
        debug!(full_check, screens = doc.screens.len(), "validate: called");
        match self.first_gap(doc, full_check) {
            Some(message) => {
                debug!(%message, "validate: gap found");
                ValidationResult::gap(message)
            }
            None if full_check => ValidationResult::ok("Journey is complete."),
            None => ValidationResult::ok("Journey structure is valid."),
        }
    }

    fn first_gap(&self, doc: &JourneyDocument, full_check: bool) -> Option<String> {
        if doc.journey_name.trim().is_empty() {
            return Some("Add a name for your journey.".to_string());
        }
        if doc.screens.is_empty() {
            return Some("Add at least one screen to your journey.".to_string());
        }
        if doc.no_screens != doc.screens.len() {
            return Some(format!(
                "The journey lists {} screens but no_screens is {}.",
                doc.screens.len(),
                doc.no_screens
            ));
        }
        for screen in &doc.screens {
            if let Some(gap) = screen_gap(screen) {
                return Some(gap);
            }
        }
        if !full_check {
            return None;
        }

        for screen in &doc.screens {
            if let Some(gap) = self.component_gap(screen) {
                return Some(gap);
            }
        }
        navigation_gap(doc)
            .or_else(|| missing_trigger_gap(doc))
            .or_else(|| connectivity_gap(doc))
    }

    /// Every placed component must be a catalog component carrying its fields
    fn component_gap(&self, screen: &Screen) -> Option<String> {
        for component in screen.screen_components.iter().flatten() {
            let entry = self
                .catalog
                .resolve(component.screen_component_name.as_deref(), component.screen_component_id);
            let Some(entry) = entry else {
                let reference = component
                    .screen_component_name
                    .clone()
                    .or_else(|| component.screen_component_id.map(|id| format!("ID {}", id)))
                    .unwrap_or_else(|| "an unnamed component".to_string());
                return Some(format!(
                    "Screen {} uses {}, which is not an available component.",
                    screen.display_name(),
                    reference
                ));
            };
            if component.field_components.is_empty() && !entry.field_components.is_empty() {
                return Some(format!(
                    "Component {} on screen {} is missing its field components.",
                    entry.screen_component_name,
                    screen.display_name()
                ));
            }
        }
        None
    }
}

fn screen_gap(screen: &Screen) -> Option<String> {
    let Some(id) = screen.screen_id else {
        return Some("All screens must have a screen_id.".to_string());
    };
    let Some(name) = screen.screen_name.as_deref().filter(|n| !n.trim().is_empty()) else {
        return Some(format!("Screen with ID {} is missing a screen_name.", id));
    };
    if screen.template.as_deref().is_none_or(|t| t.trim().is_empty()) {
        return Some(format!("Screen {} is missing a template.", name));
    }
    if screen.style.as_deref().is_none_or(|s| s.trim().is_empty()) {
        return Some(format!("Screen {} is missing a style.", name));
    }
    if screen.screen_components.is_none() {
        return Some(format!("Screen {} is missing screen_components.", name));
    }
    None
}

fn navigation_gap(doc: &JourneyDocument) -> Option<String> {
    if doc.screens.len() > 1 && doc.navigation.is_empty() {
        return Some("Add navigation between your screens.".to_string());
    }
    for edge in &doc.navigation {
        let Some(source_id) = edge.source_screen_id else {
            return Some("A navigation rule is missing source_screen_id.".to_string());
        };
        let Some(target_id) = edge.target_screen_id else {
            return Some("A navigation rule is missing target_screen_id.".to_string());
        };
        if edge.navigation_type.as_deref().is_none_or(|t| t.trim().is_empty()) {
            return Some("A navigation rule is missing navigation_type.".to_string());
        }
        let Some(source) = doc.screen(source_id) else {
            return Some(format!(
                "A navigation rule starts at screen ID {}, which does not exist.",
                source_id
            ));
        };
        if doc.screen(target_id).is_none() {
            return Some(format!(
                "A navigation rule leads to screen ID {}, which does not exist.",
                target_id
            ));
        }
        if let Some(trigger) = edge.trigger_component_id {
            if !source.has_trigger_field(trigger) {
                return Some(format!(
                    "Component {} is not a trigger on screen {}.",
                    trigger,
                    source.display_name()
                ));
            }
        }
    }
    None
}

/// One message listing every edge still without a trigger
fn missing_trigger_gap(doc: &JourneyDocument) -> Option<String> {
    let pending: Vec<String> = doc
        .navigation
        .iter()
        .filter(|e| e.trigger_component_id.is_none())
        .filter_map(|e| e.source_screen_id)
        .map(|id| {
            let name = doc.screen(id).map(Screen::display_name).unwrap_or_default();
            format!("navigation from {} (ID: {})", name, id)
        })
        .collect();
    if pending.is_empty() {
        None
    } else {
        Some(format!("Choose trigger components for: {}", pending.join(", ")))
    }
}

/// In a multi-screen journey every screen must touch at least one edge
fn connectivity_gap(doc: &JourneyDocument) -> Option<String> {
    if doc.screens.len() < 2 {
        return None;
    }
    doc.screens
        .iter()
        .filter_map(|s| s.screen_id.map(|id| (id, s)))
        .find(|(id, _)| {
            !doc
                .navigation
                .iter()
                .any(|e| e.source_screen_id == Some(*id) || e.target_screen_id == Some(*id))
        })
        .map(|(id, screen)| {
            format!(
                "Screen {} (ID: {}) is not connected to any other screen.",
                screen.display_name(),
                id
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::builtin_entries;
    use crate::domain::{ComponentInstance, NavigationEdge};
    use crate::reconcile::Reconciler;

    fn catalog() -> Catalog {
        Catalog::new(builtin_entries())
    }

    fn screen(id: i64, name: &str, component: &str) -> Screen {
        Screen {
            screen_id: Some(id),
            screen_name: Some(name.to_string()),
            screen_components: Some(vec![ComponentInstance {
                screen_component_name: Some(component.to_string()),
                ..Default::default()
            }]),
            ..Default::default()
        }
    }

    fn reconciled(doc: JourneyDocument) -> JourneyDocument {
        let catalog = catalog();
        Reconciler::new(&catalog).reconcile(doc).unwrap().0
    }

    #[test]
    fn test_empty_document_asks_for_name_first() {
        let catalog = catalog();
        let validator = Validator::new(&catalog);
        for full in [false, true] {
            let result = validator.validate(&JourneyDocument::empty(), full);
            assert!(!result.valid);
            assert_eq!(result.message, "Add a name for your journey.");
        }
    }

    #[test]
    fn test_named_journey_without_screens() {
        let catalog = catalog();
        let doc = JourneyDocument {
            journey_name: "KYC".into(),
            ..Default::default()
        };
        let result = Validator::new(&catalog).validate(&doc, true);
        assert_eq!(result.message, "Add at least one screen to your journey.");
    }

    #[test]
    fn test_screen_count_mismatch() {
        let catalog = catalog();
        let doc = JourneyDocument {
            journey_name: "KYC".into(),
            no_screens: 3,
            screens: vec![screen(1, "A", "pan")],
            ..Default::default()
        };
        let result = Validator::new(&catalog).validate(&doc, false);
        assert_eq!(result.message, "The journey lists 1 screens but no_screens is 3.");
    }

    #[test]
    fn test_missing_screen_name() {
        let catalog = catalog();
        let mut doc = reconciled(JourneyDocument {
            journey_name: "KYC".into(),
            screens: vec![screen(1, "A", "pan")],
            ..Default::default()
        });
        doc.screens[0].screen_name = None;
        let result = Validator::new(&catalog).validate(&doc, false);
        assert_eq!(result.message, "Screen with ID 1 is missing a screen_name.");
    }

    #[test]
    fn test_two_screens_without_navigation_blocks_full_check_only() {
        let catalog = catalog();
        let doc = reconciled(JourneyDocument {
            journey_name: "KYC".into(),
            screens: vec![screen(1, "A", "pan"), screen(2, "B", "otp")],
            ..Default::default()
        });
        let validator = Validator::new(&catalog);
        assert!(validator.validate(&doc, false).valid);

        let full = validator.validate(&doc, true);
        assert!(!full.valid);
        assert_eq!(full.message, "Add navigation between your screens.");
    }

    #[test]
    fn test_missing_triggers_are_listed_together() {
        let catalog = catalog();
        let doc = reconciled(JourneyDocument {
            journey_name: "KYC".into(),
            screens: vec![screen(1, "Code", "otp"), screen(2, "Done", "status"), screen(3, "PAN", "pan")],
            navigation: vec![NavigationEdge::between(1, 2), NavigationEdge::between(2, 3)],
            ..Default::default()
        });
        let result = Validator::new(&catalog).validate(&doc, true);
        assert_eq!(
            result.message,
            "Choose trigger components for: navigation from Code (ID: 1), navigation from Done (ID: 2)"
        );
    }

    #[test]
    fn test_disconnected_screen() {
        let catalog = catalog();
        let doc = reconciled(JourneyDocument {
            journey_name: "KYC".into(),
            screens: vec![
                screen(1, "Details", "CustomerDetails"),
                screen(2, "PAN", "pan"),
                screen(3, "Aadhar", "aadhar"),
            ],
            navigation: vec![NavigationEdge::between(1, 2)],
            ..Default::default()
        });
        let result = Validator::new(&catalog).validate(&doc, true);
        assert_eq!(result.message, "Screen Aadhar (ID: 3) is not connected to any other screen.");
    }

    #[test]
    fn test_complete_journey_is_valid() {
        let catalog = catalog();
        let doc = reconciled(JourneyDocument {
            journey_name: "KYC".into(),
            screens: vec![screen(1, "Details", "CustomerDetails"), screen(2, "PAN", "pan")],
            navigation: vec![NavigationEdge::between(1, 2)],
            ..Default::default()
        });
        let result = Validator::new(&catalog).validate(&doc, true);
        assert!(result.valid, "{}", result.message);
    }

    #[test]
    fn test_unreconciled_edge_problems() {
        let catalog = catalog();
        let mut doc = reconciled(JourneyDocument {
            journey_name: "KYC".into(),
            screens: vec![screen(1, "Details", "CustomerDetails"), screen(2, "PAN", "pan")],
            navigation: vec![NavigationEdge::between(1, 2)],
            ..Default::default()
        });
        let validator = Validator::new(&catalog);

        doc.navigation[0].trigger_component_id = Some(1);
        assert_eq!(
            validator.validate(&doc, true).message,
            "Component 1 is not a trigger on screen Details."
        );

        doc.navigation[0].target_screen_id = Some(9);
        assert_eq!(
            validator.validate(&doc, true).message,
            "A navigation rule leads to screen ID 9, which does not exist."
        );

        doc.navigation[0].source_screen_id = None;
        assert_eq!(
            validator.validate(&doc, true).message,
            "A navigation rule is missing source_screen_id."
        );
    }

    #[test]
    fn test_component_without_fields_fails_full_check() {
        let catalog = catalog();
        let mut doc = reconciled(JourneyDocument {
            journey_name: "KYC".into(),
            screens: vec![screen(1, "PAN", "pan")],
            ..Default::default()
        });
        doc.screens[0].screen_components.as_mut().unwrap()[0].field_components.clear();
        let result = Validator::new(&catalog).validate(&doc, true);
        assert_eq!(result.message, "Component pan on screen PAN is missing its field components.");
    }
}
