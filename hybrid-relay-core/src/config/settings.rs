//! Settings configuration loaded from an optional TOML file.
//!
//! This module handles non-sensitive configuration stored in TOML format
//! in the XDG config directory (~/.config/hybrid-relay/config.toml).
//! Unlike secrets, every setting has a default, so the file may be absent.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::env_value;

/// Environment variable overriding the OpenAI model id.
pub const OPENAI_MODEL_VAR: &str = "OPENAI_MODEL";
/// Environment variable overriding the Gemini model id.
pub const GEMINI_MODEL_VAR: &str = "GEMINI_MODEL";
/// Environment variable overriding the configuration directory.
pub const CONFIG_DIR_VAR: &str = "HYBRID_RELAY_CONFIG_DIR";

/// Settings loaded from TOML configuration file.
///
/// These are non-sensitive configuration values that can be safely
/// stored on disk.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    /// Telegram transport settings
    #[serde(default)]
    pub telegram: TelegramSettings,

    /// Provider endpoints and models
    #[serde(default)]
    pub providers: ProvidersSettings,

    /// HTTP client settings shared by provider clients
    #[serde(default)]
    pub http: HttpSettings,

    /// Fixed user-facing replies
    #[serde(default)]
    pub replies: RepliesSettings,
}

/// Telegram Bot API settings
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramSettings {
    /// Bot API base URL
    #[serde(default = "default_telegram_api_base_url")]
    pub api_base_url: String,

    /// Long-polling timeout passed to `getUpdates`
    #[serde(default = "default_poll_timeout_seconds")]
    pub poll_timeout_seconds: u64,

    /// Discard updates that queued up while the bot was offline
    #[serde(default = "default_true")]
    pub drop_pending_updates: bool,
}

/// Settings for every provider, in priority order
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProvidersSettings {
    #[serde(default)]
    pub openai: OpenAiSettings,

    #[serde(default)]
    pub gemini: GeminiSettings,
}

/// OpenAI-compatible provider settings
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiSettings {
    /// API base URL (`/v1` is appended when missing)
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,

    /// Model id (env override: OPENAI_MODEL)
    #[serde(default = "default_openai_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_openai_temperature")]
    pub temperature: Option<f32>,
}

/// Gemini provider settings
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiSettings {
    /// API base URL
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,

    /// Model id (env override: GEMINI_MODEL)
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// Sampling temperature (API default when unset)
    #[serde(default)]
    pub temperature: Option<f32>,
}

/// HTTP client settings
#[derive(Debug, Clone, Deserialize)]
pub struct HttpSettings {
    /// Per-request timeout for provider calls
    #[serde(default = "default_http_timeout_seconds")]
    pub timeout_seconds: u64,
}

/// Deterministic replies sent without consulting a provider
#[derive(Debug, Clone, Deserialize)]
pub struct RepliesSettings {
    /// Prefix of the echo fallback; the trimmed prompt follows verbatim
    #[serde(default = "default_echo_prefix")]
    pub echo_prefix: String,

    /// Reply to `/start`
    #[serde(default = "default_welcome")]
    pub welcome: String,
}

fn default_true() -> bool {
    true
}

fn default_telegram_api_base_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_poll_timeout_seconds() -> u64 {
    30
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_openai_temperature() -> Option<f32> {
    Some(0.2)
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_gemini_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_http_timeout_seconds() -> u64 {
    120
}

fn default_echo_prefix() -> String {
    "You said: ".to_string()
}

fn default_welcome() -> String {
    "Hybrid AI bot online. Talk to me!".to_string()
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self {
            api_base_url: default_telegram_api_base_url(),
            poll_timeout_seconds: default_poll_timeout_seconds(),
            drop_pending_updates: true,
        }
    }
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            base_url: default_openai_base_url(),
            model: default_openai_model(),
            temperature: default_openai_temperature(),
        }
    }
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            base_url: default_gemini_base_url(),
            model: default_gemini_model(),
            temperature: None,
        }
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_seconds: default_http_timeout_seconds(),
        }
    }
}

impl Default for RepliesSettings {
    fn default() -> Self {
        Self {
            echo_prefix: default_echo_prefix(),
            welcome: default_welcome(),
        }
    }
}

/// Errors that can occur when loading settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config directory not found")]
    ConfigDirNotFound,
}

impl Settings {
    /// Load settings from the TOML configuration file.
    ///
    /// A missing file is not an error: defaults are used and nothing is
    /// written to disk.
    pub fn load() -> Result<Self, SettingsError> {
        let config_path = Self::config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load settings from a specific file path, falling back to defaults
    /// when the file does not exist.
    pub fn load_from_path(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            tracing::debug!("No settings file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        tracing::info!("Loading settings from {:?}", path);
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse settings from TOML content.
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(content)?;
        Ok(settings)
    }

    /// Get the configuration file path.
    ///
    /// Uses XDG config directory: `~/.config/hybrid-relay/config.toml`
    pub fn config_path() -> Result<PathBuf, SettingsError> {
        if let Ok(override_dir) = std::env::var(CONFIG_DIR_VAR) {
            let dir = PathBuf::from(override_dir);
            return Ok(dir.join("config.toml"));
        }

        let config_dir = dirs::config_dir()
            .ok_or(SettingsError::ConfigDirNotFound)?
            .join("hybrid-relay");

        Ok(config_dir.join("config.toml"))
    }

    /// Apply `OPENAI_MODEL` / `GEMINI_MODEL` on top of the file values.
    pub fn apply_env_overrides(&mut self) {
        if let Some(model) = env_value(OPENAI_MODEL_VAR) {
            self.providers.openai.model = model;
        }
        if let Some(model) = env_value(GEMINI_MODEL_VAR) {
            self.providers.gemini.model = model;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_env::{ENV_MUTEX, clear_env};
    use std::env;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();

        assert_eq!(settings.telegram.api_base_url, "https://api.telegram.org");
        assert_eq!(settings.telegram.poll_timeout_seconds, 30);
        assert!(settings.telegram.drop_pending_updates);

        assert_eq!(settings.providers.openai.model, "gpt-4o-mini");
        assert_eq!(settings.providers.openai.temperature, Some(0.2));
        assert_eq!(settings.providers.gemini.model, "gemini-1.5-flash");
        assert!(settings.providers.gemini.temperature.is_none());

        assert_eq!(settings.http.timeout_seconds, 120);
        assert_eq!(settings.replies.echo_prefix, "You said: ");
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings.providers.openai.base_url, "https://api.openai.com/v1");
        assert_eq!(
            settings.providers.gemini.base_url,
            "https://generativelanguage.googleapis.com/v1beta"
        );
    }

    #[test]
    fn test_partial_toml() {
        let toml_content = r#"
[providers.openai]
base_url = "http://127.0.0.1:8080"
model = "llama3.1"

[replies]
echo_prefix = "Tu as dit : "
"#;

        let settings = Settings::from_toml(toml_content).unwrap();
        assert_eq!(settings.providers.openai.base_url, "http://127.0.0.1:8080");
        assert_eq!(settings.providers.openai.model, "llama3.1");
        // Unspecified keys inside a present table still default
        assert_eq!(settings.providers.openai.temperature, Some(0.2));
        assert_eq!(settings.replies.echo_prefix, "Tu as dit : ");
        assert_eq!(settings.replies.welcome, "Hybrid AI bot online. Talk to me!");
        assert_eq!(settings.telegram.poll_timeout_seconds, 30);
    }

    #[test]
    fn test_invalid_toml() {
        let result = Settings::from_toml("[telegram\npoll_timeout_seconds = 1");
        assert!(matches!(result, Err(SettingsError::Parse(_))));
    }

    #[test]
    fn test_optional_values_from_toml() {
        let toml_content = r#"
[telegram]
drop_pending_updates = false

[providers.gemini]
temperature = 0.7
"#;

        let parsed = Settings::from_toml(toml_content).unwrap();
        assert_eq!(parsed.providers.gemini.temperature, Some(0.7));
        assert!(!parsed.telegram.drop_pending_updates);
        assert_eq!(parsed.telegram.poll_timeout_seconds, 30);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from_path(&dir.path().join("config.toml")).unwrap();
        assert_eq!(settings.providers.openai.model, "gpt-4o-mini");
        assert!(!dir.path().join("config.toml").exists());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[http]\ntimeout_seconds = 5\n").unwrap();

        let settings = Settings::load_from_path(&path).unwrap();
        assert_eq!(settings.http.timeout_seconds, 5);
    }

    #[test]
    fn test_config_path_override() {
        let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        unsafe {
            env::set_var(CONFIG_DIR_VAR, "/tmp/hybrid-relay-test");
        }

        let path = Settings::config_path().unwrap();
        assert_eq!(path, PathBuf::from("/tmp/hybrid-relay-test/config.toml"));

        unsafe {
            env::remove_var(CONFIG_DIR_VAR);
        }
    }

    #[test]
    fn test_env_model_overrides() {
        let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        unsafe {
            env::set_var(OPENAI_MODEL_VAR, "gpt-4.1-mini");
            env::set_var(GEMINI_MODEL_VAR, "  ");
        }

        let mut settings = Settings::default();
        settings.apply_env_overrides();
        assert_eq!(settings.providers.openai.model, "gpt-4.1-mini");
        // Blank overrides are ignored
        assert_eq!(settings.providers.gemini.model, "gemini-1.5-flash");

        clear_env();
    }
}
