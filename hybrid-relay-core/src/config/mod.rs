//! Configuration management for hybrid-relay.
//!
//! Secrets come from environment variables (a `.env` file is loaded first
//! when present); non-sensitive settings come from an optional TOML file.
//!
//! # Configuration Sources
//!
//! ## Secrets (Environment Variables)
//! - `TELEGRAM_TOKEN` - Telegram bot token (required)
//! - `OPENAI_API_KEY` - OpenAI API key (optional)
//! - `GEMINI_API_KEY` - Gemini API key (optional)
//!
//! ## Model overrides (Environment Variables)
//! - `OPENAI_MODEL` - default `gpt-4o-mini`
//! - `GEMINI_MODEL` - default `gemini-1.5-flash`
//!
//! ## Settings (TOML File)
//! Located at `~/.config/hybrid-relay/config.toml` (never created automatically):
//! ```toml
//! [telegram]
//! poll_timeout_seconds = 30
//! drop_pending_updates = true
//!
//! [providers.openai]
//! base_url = "https://api.openai.com/v1"
//! temperature = 0.2
//!
//! [replies]
//! echo_prefix = "You said: "
//! ```

mod secrets;
mod settings;

pub use secrets::{
    GEMINI_API_KEY_VAR, OPENAI_API_KEY_VAR, Secrets, SecretsError, TELEGRAM_TOKEN_VAR,
};
pub use settings::{
    CONFIG_DIR_VAR, GEMINI_MODEL_VAR, GeminiSettings, HttpSettings, OPENAI_MODEL_VAR,
    OpenAiSettings, ProvidersSettings, RepliesSettings, Settings, SettingsError,
    TelegramSettings,
};

/// Load .env file if it exists
pub fn load_dotenv() {
    // Silently ignore errors (file might not exist)
    let _ = dotenvy::dotenv();
}

/// Read an environment variable, treating blank values as unset.
pub(crate) fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Combined configuration containing both secrets and settings.
///
/// Loaded once at startup and handed to the gateway by value; nothing
/// reads the environment after that.
#[derive(Debug, Clone)]
pub struct Config {
    /// Secrets loaded from environment variables
    pub secrets: Secrets,
    /// Settings loaded from the TOML file (or defaults)
    pub settings: Settings,
}

/// Errors that can occur when loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Secrets error: {0}")]
    Secrets(#[from] SecretsError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `TELEGRAM_TOKEN` is missing or blank
    /// - The TOML file exists but cannot be read or parsed
    pub fn load() -> Result<Self, ConfigError> {
        load_dotenv();
        Self::load_inner()
    }

    fn load_inner() -> Result<Self, ConfigError> {
        let secrets = Secrets::from_env()?;
        let mut settings = Settings::load()?;
        settings.apply_env_overrides();

        Ok(Self { secrets, settings })
    }

    /// Assemble a configuration from parts (tests, embedding).
    pub fn new(secrets: Secrets, settings: Settings) -> Self {
        Self { secrets, settings }
    }

    pub fn telegram_token(&self) -> &str {
        &self.secrets.telegram_token
    }

    pub fn openai_api_key(&self) -> Option<&str> {
        self.secrets.openai_api_key.as_deref()
    }

    pub fn gemini_api_key(&self) -> Option<&str> {
        self.secrets.gemini_api_key.as_deref()
    }

    pub fn openai_model(&self) -> &str {
        &self.settings.providers.openai.model
    }

    pub fn gemini_model(&self) -> &str {
        &self.settings.providers.gemini.model
    }
}
