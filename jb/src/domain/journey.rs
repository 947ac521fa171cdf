//! Journey Document model
//!
//! Mirrors the JSON shape the LLM is asked to produce. Field names are the
//! wire names, so a document serializes back to exactly what clients see in
//! `journey_json`.

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::catalog::FieldComponent;

/// Template injected into every screen that lacks one
pub const DEFAULT_TEMPLATE: &str = "defaultTemplate";

/// Style injected into every screen that lacks one
pub const DEFAULT_SCREEN_STYLE: &str = "defaultScreenStyle";

/// Style injected into every screen component that lacks one
pub const DEFAULT_COMPONENT_STYLE: &str = "defaultScreenComponentStyle";

/// Style carried by catalog field components
pub const DEFAULT_FIELD_STYLE: &str = "defaultFieldStyle";

/// The only navigation type the builder emits
pub const NAVIGATION_BUTTON_CLICK: &str = "button_click";

/// Journey type; every journey built so far is single-flow
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JourneyType {
    #[default]
    Single,
}

/// The in-progress journey configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JourneyDocument {
    #[serde(default)]
    pub journey_name: String,

    #[serde(default)]
    pub journey_type: JourneyType,

    /// Always equal to `screens.len()` after reconciliation
    #[serde(default)]
    pub no_screens: usize,

    #[serde(default)]
    pub screens: Vec<Screen>,

    #[serde(default)]
    pub navigation: Vec<NavigationEdge>,
}

/// One page of the journey
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Screen {
    #[serde(default, deserialize_with = "lenient_id", skip_serializing_if = "Option::is_none")]
    pub screen_id: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen_components: Option<Vec<ComponentInstance>>,
}

/// A catalog component placed on a screen
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentInstance {
    #[serde(default, deserialize_with = "lenient_id", skip_serializing_if = "Option::is_none")]
    pub screen_component_id: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen_component_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen_component_style: Option<String>,

    /// Copied from the catalog, never authored by the model
    #[serde(default, deserialize_with = "lenient_fields")]
    pub field_components: Vec<FieldComponent>,
}

/// A screen-to-screen transition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NavigationEdge {
    #[serde(default, deserialize_with = "lenient_id", skip_serializing_if = "Option::is_none")]
    pub source_screen_id: Option<i64>,

    #[serde(default, deserialize_with = "lenient_id", skip_serializing_if = "Option::is_none")]
    pub target_screen_id: Option<i64>,

    #[serde(default, deserialize_with = "lenient_id", skip_serializing_if = "Option::is_none")]
    pub trigger_component_id: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navigation_type: Option<String>,
}

/// A reference to a screen as a user typed it: a numeric id or a name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenRef {
    Id(i64),
    Name(String),
}

impl ScreenRef {
    /// Parse a user-supplied token; all-digit tokens are ids
    pub fn parse(token: &str) -> Self {
        let token = token.trim();
        match token.parse::<i64>() {
            Ok(id) => ScreenRef::Id(id),
            Err(_) => ScreenRef::Name(token.to_string()),
        }
    }
}

impl std::fmt::Display for ScreenRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScreenRef::Id(id) => write!(f, "screen {}", id),
            ScreenRef::Name(name) => write!(f, "{}", name),
        }
    }
}

impl JourneyDocument {
    /// An empty single-flow journey, as created at session start and on cancel
    pub fn empty() -> Self {
        Self::default()
    }

    /// Find a screen by id
    pub fn screen(&self, id: i64) -> Option<&Screen> {
        self.screens.iter().find(|s| s.screen_id == Some(id))
    }

    /// Find a screen by name, ignoring case
    pub fn screen_by_name(&self, name: &str) -> Option<&Screen> {
        let name = name.trim();
        self.screens.iter().find(|s| {
            s.screen_name
                .as_deref()
                .is_some_and(|n| n.trim().eq_ignore_ascii_case(name))
        })
    }

    /// Resolve a user reference; numeric references fall back to names
    pub fn resolve_screen(&self, screen_ref: &ScreenRef) -> Option<&Screen> {
        debug!(?screen_ref, "resolve_screen: called");
        match screen_ref {
            ScreenRef::Id(id) => self.screen(*id).or_else(|| self.screen_by_name(&id.to_string())),
            ScreenRef::Name(name) => self.screen_by_name(name),
        }
    }

    /// Whether an edge between the two screens already exists
    pub fn has_edge(&self, source: i64, target: i64) -> bool {
        self.navigation
            .iter()
            .any(|n| n.source_screen_id == Some(source) && n.target_screen_id == Some(target))
    }

    /// Whether any navigation edge still lacks a trigger component
    pub fn needs_trigger_selection(&self) -> bool {
        self.navigation.iter().any(|n| n.trigger_component_id.is_none())
    }

    /// Repair `no_screens` to match the screen list
    pub fn sync_screen_count(&mut self) {
        self.no_screens = self.screens.len();
    }

}

impl Screen {
    /// Name for user-facing messages
    pub fn display_name(&self) -> String {
        match (&self.screen_name, self.screen_id) {
            (Some(name), _) if !name.trim().is_empty() => name.clone(),
            (_, Some(id)) => format!("screen {}", id),
            _ => "unnamed screen".to_string(),
        }
    }

    /// All fields across the screen's components, in component order
    pub fn fields(&self) -> impl Iterator<Item = &FieldComponent> {
        self.screen_components
            .iter()
            .flatten()
            .flat_map(|c| c.field_components.iter())
    }

    /// Fields eligible to trigger navigation away from this screen
    pub fn trigger_fields(&self) -> Vec<&FieldComponent> {
        self.fields().filter(|f| f.is_trigger_component).collect()
    }

    /// Whether `field_id` names a trigger field on this screen
    pub fn has_trigger_field(&self, field_id: i64) -> bool {
        self.fields()
            .any(|f| f.field_component_id == field_id && f.is_trigger_component)
    }

    /// Look up a field on this screen by id
    pub fn field(&self, field_id: i64) -> Option<&FieldComponent> {
        self.fields().find(|f| f.field_component_id == field_id)
    }
}

impl NavigationEdge {
    /// A new button-click edge with no trigger chosen yet
    pub fn between(source: i64, target: i64) -> Self {
        Self {
            source_screen_id: Some(source),
            target_screen_id: Some(target),
            trigger_component_id: None,
            navigation_type: Some(NAVIGATION_BUTTON_CLICK.to_string()),
        }
    }
}

/// Accept ids as JSON numbers or numeric strings; anything else reads as absent
fn lenient_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Some(serde_json::Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    })
}

/// Keep only entries that are whole field records; the catalog overwrites them anyway
fn lenient_fields<'de, D>(deserializer: D) -> Result<Vec<FieldComponent>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let entries = match value {
        Some(serde_json::Value::Array(entries)) => entries,
        _ => return Ok(Vec::new()),
    };
    Ok(entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value(entry).ok())
        .collect())
}
