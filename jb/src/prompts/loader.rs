//! Prompt Loader
//!
//! Loads prompt templates from an override directory or falls back to the
//! embedded defaults, then renders them with handlebars.

use std::path::{Path, PathBuf};

use eyre::{Result, eyre};
use handlebars::Handlebars;
use serde::Serialize;
use tracing::debug;

use super::embedded;
use crate::catalog::Catalog;
use crate::domain::JourneyDocument;

/// Context for the journey update prompt
#[derive(Debug, Clone, Serialize)]
pub struct JourneyPromptContext {
    /// One "- ID: n, Name: x" line per catalog component
    pub catalog: String,
    /// Current document, pretty-printed
    pub journey_json: String,
    pub user_message: String,
}

impl JourneyPromptContext {
    pub fn new(catalog: &Catalog, journey: &JourneyDocument, user_message: &str) -> Result<Self> {
        Ok(Self {
            catalog: catalog.describe(),
            journey_json: serde_json::to_string_pretty(journey)?,
            user_message: user_message.to_string(),
        })
    }
}

/// Context for the guidance prompt
#[derive(Debug, Clone, Serialize)]
pub struct GuidancePromptContext {
    pub catalog: String,
    pub journey_json: String,
    pub user_message: String,
    /// Trigger assignments and other automatic changes to mention
    pub notes: Vec<String>,
    pub completion_gap: Option<String>,
}

impl GuidancePromptContext {
    pub fn new(
        catalog: &Catalog,
        journey: &JourneyDocument,
        user_message: &str,
        notes: Vec<String>,
        completion_gap: Option<String>,
    ) -> Result<Self> {
        Ok(Self {
            catalog: catalog.describe(),
            journey_json: serde_json::to_string_pretty(journey)?,
            user_message: user_message.to_string(),
            notes,
            completion_gap,
        })
    }
}

/// Loads and renders `.pmt` templates
pub struct PromptLoader {
    hbs: Handlebars<'static>,
    override_dir: Option<PathBuf>,
}

impl PromptLoader {
    /// Create a loader; `.pmt` files in `override_dir` shadow the embedded ones
    pub fn new(override_dir: Option<&Path>) -> Self {
        debug!(?override_dir, "PromptLoader::new: called");
        let override_dir = override_dir.filter(|d| d.is_dir()).map(Path::to_path_buf);
        if override_dir.is_none() {
            debug!("PromptLoader::new: no override directory, using embedded prompts");
        }
        Self {
            hbs: Self::handlebars(),
            override_dir,
        }
    }

    /// Create a loader that only uses embedded prompts
    pub fn embedded_only() -> Self {
        debug!("PromptLoader::embedded_only: called");
        Self {
            hbs: Self::handlebars(),
            override_dir: None,
        }
    }

    /// Prompts carry raw JSON, so HTML escaping is off
    fn handlebars() -> Handlebars<'static> {
        let mut hbs = Handlebars::new();
        hbs.register_escape_fn(handlebars::no_escape);
        hbs
    }

    /// Load a template by name
    ///
    /// Checks in order:
    /// 1. Override: `{override_dir}/{name}.pmt`
    /// 2. Embedded fallback
    fn load_template(&self, name: &str) -> Result<String> {
        debug!(%name, "PromptLoader::load_template: called");
        if let Some(ref dir) = self.override_dir {
            let path = dir.join(format!("{}.pmt", name));
            if path.exists() {
                debug!(?path, "PromptLoader::load_template: found in override directory");
                return std::fs::read_to_string(&path)
                    .map_err(|e| eyre!("Failed to read prompt {}: {}", path.display(), e));
            }
        }

        if let Some(content) = embedded::get_embedded(name) {
            debug!(%name, "PromptLoader::load_template: found in embedded");
            return Ok(content.to_string());
        }

        Err(eyre!("Prompt template not found: {}", name))
    }

    /// Render a template with the given context
    pub fn render<C: Serialize>(&self, template_name: &str, context: &C) -> Result<String> {
        debug!(%template_name, "PromptLoader::render: called");
        let template = self.load_template(template_name)?;
        self.hbs
            .render_template(&template, context)
            .map_err(|e| eyre!("Failed to render template {}: {}", template_name, e))
    }

    pub fn journey_prompt(&self, context: &JourneyPromptContext) -> Result<String> {
        self.render("journey", context)
    }

    pub fn guidance_prompt(&self, context: &GuidancePromptContext) -> Result<String> {
        self.render("guidance", context)
    }
}
