//! Catalog types
//!
//! Field components use the camelCase wire names of the component backend.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::DEFAULT_FIELD_STYLE;

/// One form field or button belonging to a screen component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldComponent {
    pub field_component_id: i64,

    pub field_type: String,

    pub field_name: String,

    pub field_label: String,

    /// Rule name -> constraint
    #[serde(default)]
    pub validations: BTreeMap<String, serde_json::Value>,

    #[serde(default)]
    pub data_source: Option<String>,

    #[serde(default)]
    pub dependencies: Option<serde_json::Value>,

    /// Marks fields (typically buttons) that can fire navigation
    #[serde(default)]
    pub is_trigger_component: bool,

    #[serde(default = "default_field_style")]
    pub style: String,
}

fn default_field_style() -> String {
    DEFAULT_FIELD_STYLE.to_string()
}

/// A screen component the backend knows about, with its field list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub screen_component_id: i64,

    pub screen_component_name: String,

    #[serde(default)]
    pub field_components: Vec<FieldComponent>,
}

/// Summary row for listings and prompts (no field detail)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogSummary {
    pub screen_component_id: i64,
    pub screen_component_name: String,
}

/// Read-only snapshot of the component catalog
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Build a catalog from backend entries, preserving their order
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        debug!(entry_count = entries.len(), "Catalog::new: called");
        Self { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact name lookup
    pub fn by_name(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.screen_component_name == name)
    }

    pub fn by_id(&self, id: i64) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.screen_component_id == id)
    }

    /// Resolve a component reference: exact name first, then id
    pub fn resolve(&self, name: Option<&str>, id: Option<i64>) -> Option<&CatalogEntry> {
        debug!(?name, ?id, "Catalog::resolve: called");
        name.map(str::trim)
            .filter(|n| !n.is_empty())
            .and_then(|n| self.by_name(n))
            .or_else(|| id.and_then(|i| self.by_id(i)))
    }

    /// Component names in catalog order
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.screen_component_name.as_str()).collect()
    }

    pub fn summaries(&self) -> Vec<CatalogSummary> {
        self.entries
            .iter()
            .map(|e| CatalogSummary {
                screen_component_id: e.screen_component_id,
                screen_component_name: e.screen_component_name.clone(),
            })
            .collect()
    }

    /// One line per component, as offered to the model
    pub fn describe(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("- ID: {}, Name: {}", e.screen_component_id, e.screen_component_name))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: i64, name: &str) -> CatalogEntry {
        CatalogEntry {
            screen_component_id: id,
            screen_component_name: name.to_string(),
            field_components: vec![],
        }
    }

    #[test]
    fn test_resolve_prefers_name_over_id() {
        let catalog = Catalog::new(vec![entry(1, "CustomerDetails"), entry(2, "pan")]);

        // Name wins even when the id points elsewhere
        let resolved = catalog.resolve(Some("pan"), Some(1)).unwrap();
        assert_eq!(resolved.screen_component_id, 2);

        // Unknown name falls back to id
        let resolved = catalog.resolve(Some("PanCard"), Some(1)).unwrap();
        assert_eq!(resolved.screen_component_name, "CustomerDetails");

        assert!(catalog.resolve(Some("nope"), Some(42)).is_none());
        assert!(catalog.resolve(None, None).is_none());
    }

    #[test]
    fn test_name_lookup_is_exact() {
        let catalog = Catalog::new(vec![entry(2, "pan")]);
        assert!(catalog.by_name("pan").is_some());
        assert!(catalog.by_name("PAN").is_none());
    }

    #[test]
    fn test_describe() {
        let catalog = Catalog::new(vec![entry(1, "CustomerDetails"), entry(2, "pan")]);
        assert_eq!(catalog.describe(), "- ID: 1, Name: CustomerDetails\n- ID: 2, Name: pan");
    }

    #[test]
    fn test_field_component_wire_names() {
        let json = serde_json::json!({
            "fieldComponentId": 13,
            "fieldType": "button",
            "fieldName": "validatePanBtn",
            "fieldLabel": "Validate PAN",
            "validations": {},
            "dataSource": null,
            "dependencies": null,
            "isTriggerComponent": true,
            "style": "defaultFieldStyle"
        });
        let field: FieldComponent = serde_json::from_value(json.clone()).unwrap();
        assert!(field.is_trigger_component);
        assert_eq!(serde_json::to_value(&field).unwrap(), json);
    }

    #[test]
    fn test_field_component_defaults() {
        let field: FieldComponent = serde_json::from_value(serde_json::json!({
            "fieldComponentId": 1,
            "fieldType": "largetext",
            "fieldName": "heading",
            "fieldLabel": "Heading"
        }))
        .unwrap();
        assert!(!field.is_trigger_component);
        assert_eq!(field.style, DEFAULT_FIELD_STYLE);
        assert!(field.validations.is_empty());
    }
}
