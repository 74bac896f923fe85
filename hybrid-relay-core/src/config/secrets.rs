//! Secrets configuration loaded from environment variables only.
//!
//! The Telegram token is the only required value. Provider API keys are
//! optional: a missing key disables that provider for the life of the process.

use std::fmt;

use super::env_value;

/// Environment variable holding the Telegram bot token.
pub const TELEGRAM_TOKEN_VAR: &str = "TELEGRAM_TOKEN";
/// Environment variable holding the OpenAI API key.
pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";
/// Environment variable holding the Gemini API key.
pub const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Secrets loaded exclusively from environment variables.
///
/// These are sensitive values that should never be written to disk
/// or committed to version control.
#[derive(Clone)]
pub struct Secrets {
    /// Telegram bot token (env: TELEGRAM_TOKEN)
    pub telegram_token: String,

    /// OpenAI API key (env: OPENAI_API_KEY)
    pub openai_api_key: Option<String>,

    /// Gemini API key (env: GEMINI_API_KEY)
    pub gemini_api_key: Option<String>,
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn redact(value: &Option<String>) -> &'static str {
            if value.is_some() { "<set>" } else { "<unset>" }
        }

        f.debug_struct("Secrets")
            .field("telegram_token", &"<set>")
            .field("openai_api_key", &redact(&self.openai_api_key))
            .field("gemini_api_key", &redact(&self.gemini_api_key))
            .finish()
    }
}

/// Errors that can occur when loading secrets
#[derive(Debug, thiserror::Error)]
pub enum SecretsError {
    #[error("Missing required secret: {0} (set it in the environment or in .env)")]
    MissingSecret(String),
}

impl Secrets {
    /// Load secrets from the process environment.
    ///
    /// Does not read `.env`; call [`crate::load_dotenv`] first for that.
    pub fn from_env() -> Result<Self, SecretsError> {
        let telegram_token = env_value(TELEGRAM_TOKEN_VAR)
            .ok_or_else(|| SecretsError::MissingSecret(TELEGRAM_TOKEN_VAR.to_string()))?;

        Ok(Self {
            telegram_token,
            openai_api_key: env_value(OPENAI_API_KEY_VAR),
            gemini_api_key: env_value(GEMINI_API_KEY_VAR),
        })
    }
}
