//! Flow diagrams
//!
//! Renders a journey as a Mermaid flowchart: one node per screen, one arrow
//! per navigation edge labelled with the trigger field's label. Edges still
//! waiting for a trigger are drawn dashed.

use std::fmt::Write;

use tracing::debug;

use crate::domain::{JourneyDocument, NavigationEdge};

/// Render `doc` as Mermaid `flowchart TD` source
pub fn flowchart(doc: &JourneyDocument) -> String {
    debug!(screens = doc.screens.len(), edges = doc.navigation.len(), "flowchart: called");
    let mut out = String::from("flowchart TD\n");

    if doc.screens.is_empty() {
        out.push_str("    empty[\"No screens yet\"]\n");
        return out;
    }

    for screen in &doc.screens {
        if let Some(id) = screen.screen_id {
            let _ = writeln!(out, "    {}[\"{}\"]", node(id), escape(&screen.display_name()));
        }
    }

    for edge in &doc.navigation {
        let (Some(source), Some(target)) = (edge.source_screen_id, edge.target_screen_id) else {
            continue;
        };
        match trigger_label(doc, edge) {
            Some(label) => {
                let _ = writeln!(out, "    {} -->|\"{}\"| {}", node(source), escape(&label), node(target));
            }
            None => {
                let _ = writeln!(out, "    {} -.-> {}", node(source), node(target));
            }
        }
    }

    out
}

fn node(screen_id: i64) -> String {
    format!("S{}", screen_id)
}

/// Label of the edge's trigger field, or its bare id when the field is gone
fn trigger_label(doc: &JourneyDocument, edge: &NavigationEdge) -> Option<String> {
    let trigger = edge.trigger_component_id?;
    let label = edge
        .source_screen_id
        .and_then(|id| doc.screen(id))
        .and_then(|s| s.field(trigger))
        .map(|f| f.field_label.clone())
        .unwrap_or_else(|| format!("ID {}", trigger));
    Some(label)
}

fn escape(text: &str) -> String {
    text.replace('"', "#quot;")
}
