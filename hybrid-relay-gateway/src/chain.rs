//! Fallback chain over the configured providers.
//!
//! Providers are tried one at a time in registration order. The first
//! non-empty reply wins; when every provider is absent the user's own
//! prompt is echoed back behind a fixed prefix. Nothing here ever fails
//! outward and no state survives between calls.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use hybrid_relay_core::{Config, RepliesSettings};
use tracing::{debug, info};

use crate::prompt::Prompt;
use crate::providers::gemini::GeminiClient;
use crate::providers::openai_compatible::OpenAiCompatibleClient;
use crate::providers::{ProviderAdapter, ProviderFailure};

/// Where a reply came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplySource {
    Provider(String),
    Echo,
}

/// Final answer for one prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    text: String,
    source: ReplySource,
}

impl Reply {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn source(&self) -> &ReplySource {
        &self.source
    }

    pub fn is_echo(&self) -> bool {
        self.source == ReplySource::Echo
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Ordered providers plus the terminal echo.
#[derive(Debug, Clone)]
pub struct ResponderChain {
    adapters: Vec<ProviderAdapter>,
    echo_prefix: String,
}

impl ResponderChain {
    /// Chain over `adapters`, highest priority first.
    pub fn new(adapters: Vec<ProviderAdapter>) -> Self {
        Self {
            adapters,
            echo_prefix: RepliesSettings::default().echo_prefix,
        }
    }

    pub fn with_echo_prefix(mut self, echo_prefix: impl Into<String>) -> Self {
        self.echo_prefix = echo_prefix.into();
        self
    }

    /// Build the OpenAI -> Gemini chain from startup configuration.
    ///
    /// A provider without an API key is registered as disabled so its
    /// position in the chain stays visible in logs.
    pub fn from_config(config: &Config) -> Self {
        let settings = &config.settings;
        let timeout = Duration::from_secs(settings.http.timeout_seconds);

        let openai = match config.openai_api_key() {
            Some(api_key) => {
                let client = OpenAiCompatibleClient::new(
                    &settings.providers.openai.base_url,
                    Some(api_key.to_string()),
                    config.openai_model(),
                    "openai",
                )
                .with_temperature(settings.providers.openai.temperature)
                .with_timeout(timeout);
                info!("OpenAI client ready (model: {})", config.openai_model());
                ProviderAdapter::ready(Arc::new(client))
            }
            None => {
                info!("Skipping provider 'openai' - no OPENAI_API_KEY configured");
                ProviderAdapter::disabled("openai")
            }
        };

        let gemini = match config.gemini_api_key() {
            Some(api_key) => {
                let client = GeminiClient::new(api_key, config.gemini_model())
                    .with_base_url(&settings.providers.gemini.base_url)
                    .with_temperature(settings.providers.gemini.temperature)
                    .with_timeout(timeout);
                info!("Gemini client ready (model: {})", config.gemini_model());
                ProviderAdapter::ready(Arc::new(client))
            }
            None => {
                info!("Skipping provider 'gemini' - no GEMINI_API_KEY configured");
                ProviderAdapter::disabled("gemini")
            }
        };

        Self::new(vec![openai, gemini]).with_echo_prefix(&settings.replies.echo_prefix)
    }

    pub fn adapters(&self) -> &[ProviderAdapter] {
        &self.adapters
    }

    /// Names of providers that had credentials at startup, in priority order.
    pub fn enabled_providers(&self) -> Vec<&str> {
        self.adapters
            .iter()
            .filter(|adapter| adapter.is_enabled())
            .map(ProviderAdapter::name)
            .collect()
    }

    /// Trim `text` and respond; blank input yields `None` and touches no provider.
    pub async fn respond_to_text(&self, text: &str) -> Option<Reply> {
        let prompt = Prompt::parse(text)?;
        Some(self.respond(&prompt).await)
    }

    /// First non-empty provider reply, or the echo fallback.
    pub async fn respond(&self, prompt: &Prompt) -> Reply {
        for adapter in &self.adapters {
            match adapter.generate(prompt).await {
                Ok(text) => {
                    info!(provider = adapter.name(), "Reply produced by provider");
                    return Reply {
                        text,
                        source: ReplySource::Provider(adapter.name().to_string()),
                    };
                }
                Err(ProviderFailure::NotConfigured) => {
                    debug!(provider = adapter.name(), "Provider not configured, skipping");
                }
                Err(failure) => {
                    debug!(provider = adapter.name(), "Falling through after: {failure}");
                }
            }
        }

        info!("No provider produced a reply, echoing the prompt");
        self.echo(prompt)
    }

    /// The always-available fallback: prefix followed by the verbatim prompt.
    pub fn echo(&self, prompt: &Prompt) -> Reply {
        Reply {
            text: format!("{}{}", self.echo_prefix, prompt),
            source: ReplySource::Echo,
        }
    }
}
