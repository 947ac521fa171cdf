//! Catalog providers
//!
//! The component backend is an external collaborator. The builder only needs
//! `fetch_all_components`, called once per session.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};

use super::{Catalog, CatalogEntry, CatalogError, FieldComponent};
use crate::domain::DEFAULT_FIELD_STYLE;

/// Source of screen components and their field lists
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Fetch every component the backend offers
    async fn fetch_all_components(&self) -> Result<Vec<CatalogEntry>, CatalogError>;

    /// Fetch and wrap as a catalog snapshot
    async fn snapshot(&self) -> Result<Catalog, CatalogError> {
        let entries = self.fetch_all_components().await?;
        if entries.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Catalog::new(entries))
    }
}

/// In-process stand-in for the component backend
#[derive(Debug, Clone, Default)]
pub struct BuiltinCatalog;

#[async_trait]
impl CatalogProvider for BuiltinCatalog {
    async fn fetch_all_components(&self) -> Result<Vec<CatalogEntry>, CatalogError> {
        debug!("BuiltinCatalog::fetch_all_components: called");
        Ok(builtin_entries())
    }
}

/// Catalog read from a JSON or YAML file on every fetch
#[derive(Debug, Clone)]
pub struct FileCatalog {
    path: PathBuf,
}

impl FileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CatalogProvider for FileCatalog {
    async fn fetch_all_components(&self) -> Result<Vec<CatalogEntry>, CatalogError> {
        debug!(path = %self.path.display(), "FileCatalog::fetch_all_components: called");
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| CatalogError::Io {
                path: self.path.clone(),
                source: e,
            })?;

        let is_json = self
            .path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        let entries: Vec<CatalogEntry> = if is_json {
            serde_json::from_str(&content).map_err(|e| CatalogError::Parse(e.to_string()))?
        } else {
            serde_yaml::from_str(&content).map_err(|e| CatalogError::Parse(e.to_string()))?
        };

        info!(path = %self.path.display(), count = entries.len(), "Loaded component catalog");
        Ok(entries)
    }
}

fn field(id: i64, field_type: &str, name: &str, label: &str, data_source: Option<&str>, trigger: bool) -> FieldComponent {
    FieldComponent {
        field_component_id: id,
        field_type: field_type.to_string(),
        field_name: name.to_string(),
        field_label: label.to_string(),
        validations: Default::default(),
        data_source: data_source.map(str::to_string),
        dependencies: None,
        is_trigger_component: trigger,
        style: DEFAULT_FIELD_STYLE.to_string(),
    }
}

fn entry(id: i64, name: &str, fields: Vec<FieldComponent>) -> CatalogEntry {
    CatalogEntry {
        screen_component_id: id,
        screen_component_name: name.to_string(),
        field_components: fields,
    }
}

/// The mock backend's components
pub fn builtin_entries() -> Vec<CatalogEntry> {
    vec![
        entry(
            1,
            "CustomerDetails",
            vec![
                field(1, "largetext", "customerDetailsHeading", "Enter Customer Details", None, false),
                field(10, "button", "customDtlBtn", "Proceed >", None, true),
            ],
        ),
        entry(
            2,
            "pan",
            vec![
                field(11, "largetext", "panDetailsHeading", "Enter PAN Details", None, false),
                field(13, "button", "validatePanBtn", "Validate PAN", None, true),
            ],
        ),
        entry(
            3,
            "aadhar",
            vec![
                field(14, "largetext", "aadharHeadingDetails", "Enter Aadhar Details", None, false),
                field(16, "button", "validateAadhar", "Validate Aadhar", Some("validateaadhar"), true),
            ],
        ),
        entry(
            4,
            "otp",
            vec![
                field(17, "largetext", "otpHeading", "Enter OTP", None, false),
                field(18, "otp", "otp", "OTP", None, false),
            ],
        ),
        entry(
            5,
            "status",
            vec![
                field(19, "statustext", "status", "status", None, false),
                field(20, "button", "homeScreenButton", "Home Screen", Some("gotohomescreen"), false),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_builtin_catalog_snapshot() {
        let catalog = BuiltinCatalog.snapshot().await.unwrap();
        assert_eq!(catalog.names(), vec!["CustomerDetails", "pan", "aadhar", "otp", "status"]);

        let pan = catalog.by_name("pan").unwrap();
        let triggers: Vec<_> = pan.field_components.iter().filter(|f| f.is_trigger_component).collect();
        assert_eq!(triggers.len(), 1);
        assert_eq!(triggers[0].field_component_id, 13);
    }

    #[tokio::test]
    async fn test_builtin_otp_and_status_have_no_triggers() {
        let catalog = BuiltinCatalog.snapshot().await.unwrap();
        for name in ["otp", "status"] {
            let entry = catalog.by_name(name).unwrap();
            assert!(entry.field_components.iter().all(|f| !f.is_trigger_component), "{}", name);
        }
    }

    #[tokio::test]
    async fn test_file_catalog_yaml() {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        writeln!(
            file,
            r#"
- screen_component_id: 7
  screen_component_name: consent
  field_components:
    - fieldComponentId: 70
      fieldType: button
      fieldName: agreeBtn
      fieldLabel: I Agree
      isTriggerComponent: true
"#
        )
        .unwrap();

        let catalog = FileCatalog::new(file.path()).snapshot().await.unwrap();
        let consent = catalog.by_name("consent").unwrap();
        assert_eq!(consent.screen_component_id, 7);
        assert!(consent.field_components[0].is_trigger_component);
    }

    #[tokio::test]
    async fn test_file_catalog_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"[{{"screen_component_id": 1, "screen_component_name": "welcome", "field_components": []}}]"#
        )
        .unwrap();

        let catalog = FileCatalog::new(file.path()).snapshot().await.unwrap();
        assert_eq!(catalog.names(), vec!["welcome"]);
    }

    #[tokio::test]
    async fn test_file_catalog_empty_is_error() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "[]").unwrap();

        let result = FileCatalog::new(file.path()).snapshot().await;
        assert!(matches!(result, Err(CatalogError::Empty)));
    }

    #[tokio::test]
    async fn test_file_catalog_missing_file() {
        let result = FileCatalog::new("/nonexistent/catalog.json").fetch_all_components().await;
        assert!(matches!(result, Err(CatalogError::Io { .. })));
    }
}
