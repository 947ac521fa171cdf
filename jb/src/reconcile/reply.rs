//! Oracle reply interpretation
//!
//! A reply is either prose (a clarifying question for the user) or a JSON
//! journey, possibly wrapped in a markdown fence and possibly using key
//! spellings the model drifts into.

use serde_json::{Map, Value};
use tracing::debug;

use super::ReconcileError;

/// What the model sent back
#[derive(Debug, Clone, PartialEq)]
pub enum OracleReply {
    /// Prose meant for the user; the document stays as it was
    Clarification(String),
    /// A candidate journey object, keys already normalized
    Document(Map<String, Value>),
}

/// Classify and parse raw model text
pub fn interpret_reply(text: &str) -> Result<OracleReply, ReconcileError> {
    debug!(len = text.len(), "interpret_reply: called");
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ReconcileError::NotJson("empty reply".to_string()));
    }

    if is_clarification(trimmed) {
        debug!("interpret_reply: reply is a clarification");
        return Ok(OracleReply::Clarification(trimmed.to_string()));
    }

    let body = strip_fence(trimmed);
    let value: Value = serde_json::from_str(body).map_err(|e| ReconcileError::NotJson(e.to_string()))?;
    match value {
        Value::Object(mut map) => {
            normalize_keys(&mut map);
            Ok(OracleReply::Document(map))
        }
        _ => Err(ReconcileError::NotAnObject),
    }
}

/// Prose replies neither open like JSON nor carry a code fence
fn is_clarification(text: &str) -> bool {
    !text.starts_with('{') && !text.starts_with('[') && !text.contains("```")
}

/// Return the content of the first fenced block, preferring a `json` fence
pub fn strip_fence(text: &str) -> &str {
    let inner = if let Some(start) = text.find("```json") {
        &text[start + "```json".len()..]
    } else if let Some(start) = text.find("```") {
        &text[start + 3..]
    } else {
        return text.trim();
    };
    match inner.find("```") {
        Some(end) => inner[..end].trim(),
        None => inner.trim(),
    }
}

/// Rewrite alternate key spellings to the canonical ones
///
/// Canonical keys win when both spellings are present.
pub fn normalize_keys(doc: &mut Map<String, Value>) {
    if doc.contains_key("journey_type") {
        doc.insert("journey_type".to_string(), Value::String("single".to_string()));
    }
    // Derived from the screen list; never trusted from the model
    doc.remove("no_screens");
    for key in ["journey_name", "screens", "navigation"] {
        if doc.get(key).is_some_and(Value::is_null) {
            doc.remove(key);
        }
    }

    if let Some(Value::Array(screens)) = doc.get_mut("screens") {
        for screen in screens.iter_mut().filter_map(Value::as_object_mut) {
            normalize_screen(screen);
        }
    }

    if let Some(Value::Array(edges)) = doc.get_mut("navigation") {
        for edge in edges.iter_mut().filter_map(Value::as_object_mut) {
            rename(edge, "from_screen_id", "source_screen_id");
            rename(edge, "to_screen_id", "target_screen_id");
        }
    }
}

fn normalize_screen(screen: &mut Map<String, Value>) {
    rename(screen, "id", "screen_id");
    rename(screen, "name", "screen_name");

    // A single component object where a list belongs
    if let Some(single) = screen.remove("screen_component") {
        if !screen.contains_key("screen_components") {
            let list = match single {
                Value::Array(items) => items,
                Value::Null => vec![],
                other => vec![other],
            };
            screen.insert("screen_components".to_string(), Value::Array(list));
        }
    }
    if let Some(Value::Object(_)) = screen.get("screen_components") {
        if let Some(single) = screen.remove("screen_components") {
            screen.insert("screen_components".to_string(), Value::Array(vec![single]));
        }
    }

    if let Some(Value::Array(components)) = screen.get_mut("screen_components") {
        for component in components.iter_mut().filter_map(Value::as_object_mut) {
            rename(component, "id", "screen_component_id");
            rename(component, "name", "screen_component_name");
            rename(component, "style", "screen_component_style");
        }
    }
}

fn rename(map: &mut Map<String, Value>, from: &str, to: &str) {
    if let Some(value) = map.remove(from) {
        if !map.contains_key(to) {
            map.insert(to.to_string(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(text: &str) -> Map<String, Value> {
        match interpret_reply(text).unwrap() {
            OracleReply::Document(map) => map,
            other => panic!("Expected Document, got {:?}", other),
        }
    }

    #[test]
    fn test_prose_is_clarification() {
        let reply = interpret_reply("Which screen should come after OTP?").unwrap();
        assert_eq!(
            reply,
            OracleReply::Clarification("Which screen should come after OTP?".to_string())
        );
    }

    #[test]
    fn test_fenced_json_is_document() {
        let text = "Here you go:\n```json\n{\"journey_name\": \"KYC\"}\n```\nAnything else?";
        let map = document(text);
        assert_eq!(map["journey_name"], "KYC");
    }

    #[test]
    fn test_bare_fence() {
        let map = document("```\n{\"journey_name\": \"Loan\"}\n```");
        assert_eq!(map["journey_name"], "Loan");
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(matches!(
            interpret_reply("{\"journey_name\": "),
            Err(ReconcileError::NotJson(_))
        ));
        assert!(matches!(interpret_reply("   "), Err(ReconcileError::NotJson(_))));
    }

    #[test]
    fn test_array_is_not_an_object() {
        assert!(matches!(interpret_reply("[1, 2]"), Err(ReconcileError::NotAnObject)));
    }

    #[test]
    fn test_alias_keys_are_normalized() {
        let map = document(
            &json!({
                "journey_name": "KYC",
                "journey_type": "multi",
                "no_screens": 9,
                "screens": [{
                    "screen_id": 1,
                    "screen_component": {"id": 2, "name": "pan"}
                }],
                "navigation": [{"from_screen_id": 1, "to_screen_id": 2}]
            })
            .to_string(),
        );

        assert_eq!(map["journey_type"], "single");
        assert!(!map.contains_key("no_screens"));
        assert_eq!(
            map["screens"][0]["screen_components"],
            json!([{"screen_component_id": 2, "screen_component_name": "pan"}])
        );
        assert_eq!(map["navigation"][0]["source_screen_id"], 1);
        assert_eq!(map["navigation"][0]["target_screen_id"], 2);
    }

    #[test]
    fn test_canonical_key_wins_over_alias() {
        let mut map = json!({
            "screens": [{
                "screen_components": [{"id": 7, "screen_component_id": 2}]
            }]
        })
        .as_object()
        .cloned()
        .unwrap();
        normalize_keys(&mut map);
        assert_eq!(map["screens"][0]["screen_components"][0], json!({"screen_component_id": 2}));
    }

    #[test]
    fn test_null_top_level_keys_are_dropped() {
        let map = document("{\"journey_name\": null, \"screens\": null}");
        assert!(!map.contains_key("journey_name"));
        assert!(!map.contains_key("screens"));
    }
}
