//! User-facing turn messages

use crate::catalog::Catalog;
use crate::domain::JourneyDocument;
use crate::reconcile::{AutoAssignment, EdgeSummary};

pub const SESSION_STARTED: &str = "session started";

pub const WELCOME_PROMPT: &str = "Hi! I'll help you create a journey for your banking application. \
What would you like to name this journey? Please tell me what type of journey you want to create \
(e.g., Savings Account Opening, Loan Application).";

pub const CONFIRMED: &str = "Your journey has been confirmed and saved. Thank you!";

pub const CANCELLED: &str =
    "Journey creation has been cancelled. Let's start again. What would you like to name this journey?";

pub const QUIT: &str = "Your journey session has been closed. Thank you for using our service.";

pub const PARSE_FAILURE: &str =
    "I'm having trouble understanding that. Could you please clarify your requirements for the journey?";

pub const ORACLE_FAILURE: &str = "Sorry, I encountered an error processing your request. Please try again.";

pub const COMMAND_HINT: &str =
    "Type \"confirm\" to save the journey, \"cancel\" to start over, or \"quit\" to close the session.";

pub fn confirm_blocked(gap: &str) -> String {
    format!("Your journey cannot be confirmed yet. {}", gap)
}

/// Clarification request for under-specified messages
pub fn ambiguity(catalog: &Catalog) -> String {
    format!(
        "I need more specific information. Please provide details about what kind of screens you'd like to add, \
         their names, and their components. You can choose from these components: {}",
        catalog.names().join(", ")
    )
}

pub fn unknown_component(reference: &str, catalog: &Catalog) -> String {
    format!(
        "{} is not an available component, so I left the journey as it was. Please choose from: {}",
        reference,
        catalog.names().join(", ")
    )
}

/// Suffix naming the first structural gap
pub fn completion_gap(gap: &str) -> String {
    format!("\n\nTo complete your journey, you need to: {}", gap)
}

pub fn auto_assigned(assignment: &AutoAssignment) -> String {
    format!(
        "Connected {} to {} using '{}' (ID {}), the only trigger on {}.",
        assignment.edge.source_screen_name,
        assignment.edge.target_screen_name,
        assignment.trigger.label,
        assignment.trigger.id,
        assignment.edge.source_screen_name
    )
}

pub fn missing_trigger(edge: &EdgeSummary) -> String {
    format!(
        "{} has no trigger component, so the navigation from {} cannot fire yet.",
        edge.source_screen_name, edge
    )
}

/// Next prompt written without the model
pub fn summary(doc: &JourneyDocument, catalog: &Catalog, notes: &[String]) -> String {
    let mut out = String::new();

    if doc.screens.is_empty() {
        if doc.journey_name.is_empty() {
            out.push_str("Your journey has no name or screens yet.");
        } else {
            out.push_str(&format!("Journey '{}' has no screens yet.", doc.journey_name));
        }
        out.push_str(" What screens would you like to add?");
    } else {
        let screens = doc
            .screens
            .iter()
            .map(|s| match s.screen_id {
                Some(id) => format!("{} (ID {})", s.display_name(), id),
                None => s.display_name(),
            })
            .collect::<Vec<_>>()
            .join(", ");
        let name = if doc.journey_name.is_empty() {
            "Your journey".to_string()
        } else {
            format!("Journey '{}'", doc.journey_name)
        };
        out.push_str(&format!(
            "{} has {} screen{}: {}.",
            name,
            doc.screens.len(),
            if doc.screens.len() == 1 { "" } else { "s" },
            screens
        ));
    }

    for note in notes {
        out.push('\n');
        out.push_str(note);
    }

    out.push_str(&format!("\nAvailable components: {}.", catalog.names().join(", ")));
    out.push('\n');
    out.push_str(COMMAND_HINT);
    out
}
