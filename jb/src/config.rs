//! Journey builder configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::JourneyDocument;
use crate::intent::DEFAULT_AMBIGUITY_PATTERNS;
use crate::llm::LlmError;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default log level, overridden by --log-level
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// HTTP server settings
    pub server: ServerConfig,

    /// LLM provider configuration
    pub llm: LlmConfig,

    /// Turn processing behaviour
    pub conversation: ConversationConfig,

    /// Component catalog source
    pub catalog: CatalogConfig,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Fails fast when the LLM API key is not available.
    pub fn validate(&self) -> Result<()> {
        if std::env::var(&self.llm.api_key_env).is_err() {
            return Err(eyre::eyre!(
                "LLM API key not found. Set the {} environment variable.",
                self.llm.api_key_env
            ));
        }
        if self.llm.provider_kind().is_none() {
            return Err(eyre::eyre!(
                "Unknown LLM provider '{}'. Supported: gemini, anthropic, openai",
                self.llm.provider
            ));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Project-local config: .journey-builder.yml
        let local_config = PathBuf::from(".journey-builder.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // User config: ~/.config/journey-builder/journey-builder.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("journey-builder").join("journey-builder.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,

    pub port: u16,

    /// Prefix every route is mounted under; empty or "/" mounts at the root
    #[serde(rename = "base-path")]
    pub base_path: String,

    /// Permit any origin, method and header
    #[serde(rename = "cors-allow-any")]
    pub cors_allow_any: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5001,
            base_path: "/journey/api".to_string(),
            cors_allow_any: true,
        }
    }
}

impl ServerConfig {
    /// `host:port` for binding
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Supported LLM backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Gemini,
    Anthropic,
    OpenAI,
}

impl ProviderKind {
    pub fn default_base_url(self) -> &'static str {
        match self {
            ProviderKind::Gemini => "https://generativelanguage.googleapis.com",
            ProviderKind::Anthropic => "https://api.anthropic.com",
            ProviderKind::OpenAI => "https://api.openai.com",
        }
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// gemini, anthropic or openai
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL; the provider's public endpoint when unset
    #[serde(rename = "base-url")]
    pub base_url: Option<String>,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Nucleus sampling cutoff (Gemini only)
    #[serde(rename = "top-p")]
    pub top_p: Option<f32>,

    /// Top-k sampling cutoff (Gemini only)
    #[serde(rename = "top-k")]
    pub top_k: Option<u32>,

    /// Harm-category thresholds sent with every Gemini request
    #[serde(rename = "safety-settings")]
    pub safety_settings: Vec<SafetySetting>,
}

/// One Gemini harm category and the threshold it blocks at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetySetting {
    pub category: String,
    pub threshold: String,
}

impl SafetySetting {
    fn new(category: &str, threshold: &str) -> Self {
        Self {
            category: category.to_string(),
            threshold: threshold.to_string(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "gemini-1.5-pro".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            base_url: None,
            max_tokens: 8192,
            temperature: 0.7,
            timeout_ms: 60_000,
            top_p: Some(0.95),
            top_k: Some(40),
            safety_settings: vec![
                SafetySetting::new("HARM_CATEGORY_DANGEROUS_CONTENT", "BLOCK_NONE"),
                SafetySetting::new("HARM_CATEGORY_HARASSMENT", "BLOCK_ONLY_HIGH"),
                SafetySetting::new("HARM_CATEGORY_HATE_SPEECH", "BLOCK_ONLY_HIGH"),
                SafetySetting::new("HARM_CATEGORY_SEXUALLY_EXPLICIT", "BLOCK_ONLY_HIGH"),
            ],
        }
    }
}

impl LlmConfig {
    pub fn provider_kind(&self) -> Option<ProviderKind> {
        match self.provider.trim().to_lowercase().as_str() {
            "gemini" | "google" => Some(ProviderKind::Gemini),
            "anthropic" | "claude" => Some(ProviderKind::Anthropic),
            "openai" => Some(ProviderKind::OpenAI),
            _ => None,
        }
    }

    /// Configured base URL without a trailing slash, or the provider default
    pub fn resolved_base_url(&self, kind: ProviderKind) -> String {
        self.base_url
            .as_deref()
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| kind.default_base_url().to_string())
    }

    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Result<String, LlmError> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| LlmError::MissingApiKey(self.api_key_env.clone()))
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_ms)
    }
}

/// When the ambiguity guard rejects under-specified messages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AmbiguityPolicy {
    /// Never reject; every message reaches the model
    Off,
    /// Only while the journey has no screens yet
    FirstScreenOnly,
    #[default]
    EveryTurn,
}

impl AmbiguityPolicy {
    /// Whether the guard is active for this document
    pub fn applies_to(self, doc: &JourneyDocument) -> bool {
        match self {
            AmbiguityPolicy::Off => false,
            AmbiguityPolicy::FirstScreenOnly => doc.screens.is_empty(),
            AmbiguityPolicy::EveryTurn => true,
        }
    }
}

/// Turn processing behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
    #[serde(rename = "ambiguity-policy")]
    pub ambiguity_policy: AmbiguityPolicy,

    /// Regexes matched case-insensitively against the whole trimmed message
    #[serde(rename = "ambiguity-patterns")]
    pub ambiguity_patterns: Vec<String>,

    /// Ask the model to phrase the next prompt after each update
    pub guidance: bool,

    /// Directory whose .pmt files override the embedded templates
    #[serde(rename = "prompts-dir")]
    pub prompts_dir: Option<PathBuf>,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            ambiguity_policy: AmbiguityPolicy::default(),
            ambiguity_patterns: DEFAULT_AMBIGUITY_PATTERNS.iter().map(|p| p.to_string()).collect(),
            guidance: true,
            prompts_dir: None,
        }
    }
}

/// Component catalog source
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// JSON or YAML file replacing the built-in catalog
    pub path: Option<PathBuf>,
}
