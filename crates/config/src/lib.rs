//! Configuration loading, validation, and management for CareTutor.
//!
//! Loads configuration from `~/.caretutor/config.toml` with environment
//! variable overrides. Validates all settings at startup. Every secret,
//! folder id, and token budget the pipeline needs is carried here and
//! injected at construction — nothing reads ambient state at call time.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.caretutor/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Anthropic API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Answering model
    #[serde(default = "default_model")]
    pub model: String,

    /// Token budget for the final answer call
    #[serde(default = "default_answer_max_tokens")]
    pub answer_max_tokens: u32,

    /// Token budget for the guideline-selection sub-call
    #[serde(default = "default_selection_max_tokens")]
    pub selection_max_tokens: u32,

    /// Context assembly strategy: "all" or "filtered"
    #[serde(default = "default_context_strategy")]
    pub context_strategy: String,

    /// Document store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".into()
}
fn default_answer_max_tokens() -> u32 {
    1500
}
fn default_selection_max_tokens() -> u32 {
    512
}
fn default_context_strategy() -> String {
    "all".into()
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("answer_max_tokens", &self.answer_max_tokens)
            .field("selection_max_tokens", &self.selection_max_tokens)
            .field("context_strategy", &self.context_strategy)
            .field("store", &self.store)
            .field("gateway", &self.gateway)
            .finish()
    }
}

/// Document store (Drive) configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the Drive-style REST API
    #[serde(default = "default_store_base_url")]
    pub base_url: String,

    /// API key sent as the `key` query parameter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// OAuth access token sent as a Bearer header
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// The three well-known folder ids
    #[serde(default)]
    pub folders: FolderConfig,
}

fn default_store_base_url() -> String {
    "https://www.googleapis.com/drive/v3".into()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: default_store_base_url(),
            api_key: None,
            access_token: None,
            folders: FolderConfig::default(),
        }
    }
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &redact(&self.api_key))
            .field("access_token", &redact(&self.access_token))
            .field("folders", &self.folders)
            .finish()
    }
}

/// The well-known folder identifiers. Configuration constants, never
/// discovered at runtime.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FolderConfig {
    /// Patient-data folder id
    #[serde(default)]
    pub patient_data: String,

    /// Clinical-guidelines folder id
    #[serde(default)]
    pub guidelines: String,

    /// Prompt-framework folder id
    #[serde(default)]
    pub prompt_framework: String,
}

impl FolderConfig {
    /// True once all three well-known folders are configured.
    pub fn is_complete(&self) -> bool {
        !self.patient_data.is_empty()
            && !self.guidelines.is_empty()
            && !self.prompt_framework.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    8787
}
fn default_host() -> String {
    "127.0.0.1".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.caretutor/config.toml).
    ///
    /// Also checks environment variables:
    /// - `CARETUTOR_API_KEY` / `ANTHROPIC_API_KEY` for the model key
    /// - `CARETUTOR_DRIVE_API_KEY` / `CARETUTOR_DRIVE_ACCESS_TOKEN` for the store
    /// - `CARETUTOR_MODEL` and `CARETUTOR_STRATEGY` overrides
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        // Environment variable overrides (highest priority)
        if config.api_key.is_none() {
            config.api_key = std::env::var("CARETUTOR_API_KEY")
                .ok()
                .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok());
        }

        if config.store.api_key.is_none() {
            config.store.api_key = std::env::var("CARETUTOR_DRIVE_API_KEY").ok();
        }

        if config.store.access_token.is_none() {
            config.store.access_token = std::env::var("CARETUTOR_DRIVE_ACCESS_TOKEN").ok();
        }

        if let Ok(model) = std::env::var("CARETUTOR_MODEL") {
            config.model = model;
        }

        if let Ok(strategy) = std::env::var("CARETUTOR_STRATEGY") {
            config.context_strategy = strategy;
            config.validate()?;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".caretutor")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.answer_max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "answer_max_tokens must be greater than zero".into(),
            ));
        }

        if self.selection_max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "selection_max_tokens must be greater than zero".into(),
            ));
        }

        if self.answer_max_tokens <= self.selection_max_tokens {
            return Err(ConfigError::ValidationError(
                "answer_max_tokens must exceed selection_max_tokens".into(),
            ));
        }

        if self.context_strategy != "all" && self.context_strategy != "filtered" {
            return Err(ConfigError::ValidationError(format!(
                "context_strategy must be \"all\" or \"filtered\", got \"{}\"",
                self.context_strategy
            )));
        }

        Ok(())
    }

    /// Check if a model API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string (for the `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            answer_max_tokens: default_answer_max_tokens(),
            selection_max_tokens: default_selection_max_tokens(),
            context_strategy: default_context_strategy(),
            store: StoreConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.model, "claude-sonnet-4-20250514");
        assert_eq!(config.answer_max_tokens, 1500);
        assert_eq!(config.context_strategy, "all");
        assert_eq!(config.gateway.port, 8787);
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.model, config.model);
        assert_eq!(parsed.selection_max_tokens, config.selection_max_tokens);
        assert_eq!(parsed.store.base_url, config.store.base_url);
    }

    #[test]
    fn unknown_strategy_rejected() {
        let config = AppConfig {
            context_strategy: "hybrid".into(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_budget_rejected() {
        let config = AppConfig {
            answer_max_tokens: 0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn selection_budget_must_stay_below_answer_budget() {
        let config = AppConfig {
            answer_max_tokens: 256,
            selection_max_tokens: 512,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_ok());
        assert_eq!(result.unwrap().answer_max_tokens, 1500);
    }

    #[test]
    fn config_file_parsing() {
        let toml_str = r#"
api_key = "sk-ant-test"
model = "claude-sonnet-4-20250514"
context_strategy = "filtered"

[store]
base_url = "https://drive.example.com/v3"
access_token = "ya29.test"

[store.folders]
patient_data = "folder-patient"
guidelines = "folder-guidelines"
prompt_framework = "folder-frameworks"

[gateway]
port = 9000
"#;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(toml_str.as_bytes()).unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.context_strategy, "filtered");
        assert_eq!(config.store.folders.guidelines, "folder-guidelines");
        assert!(config.store.folders.is_complete());
        assert_eq!(config.gateway.port, 9000);
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"answer_max_tokens = \"lots\"").unwrap();

        let result = AppConfig::load_from(file.path());
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let config = AppConfig {
            api_key: Some("sk-ant-secret".into()),
            store: StoreConfig {
                access_token: Some("ya29.secret".into()),
                ..StoreConfig::default()
            },
            ..AppConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("claude-sonnet-4-20250514"));
        assert!(toml_str.contains("8787"));
        assert!(toml_str.contains("prompt_framework"));
    }

    #[test]
    fn incomplete_folders_detected() {
        let folders = FolderConfig {
            patient_data: "p".into(),
            guidelines: String::new(),
            prompt_framework: "f".into(),
        };
        assert!(!folders.is_complete());
    }
}
