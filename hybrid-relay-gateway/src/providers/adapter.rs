//! Provider adapters: one named, optionally-configured slot per provider.
//!
//! An adapter is decided once at startup. A `Disabled` slot never touches
//! the network; a `Ready` slot makes exactly one request per `generate`.
//! Every failure is logged here and handed back as a [`ProviderFailure`],
//! which the chain treats as "try the next provider".

use std::error::Error as _;
use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::prompt::Prompt;
use crate::providers::provider::{Provider, ProviderError, extract_text};

/// Whether a provider had credentials at startup.
#[derive(Clone)]
pub enum ProviderSlot {
    Disabled,
    Ready(Arc<dyn Provider>),
}

/// Why an adapter produced no usable reply.
#[derive(Debug, thiserror::Error)]
pub enum ProviderFailure {
    #[error("provider is not configured")]
    NotConfigured,
    #[error("provider returned an empty reply")]
    Empty,
    #[error(transparent)]
    Request(#[from] ProviderError),
}

/// A named provider slot in the fallback chain.
#[derive(Clone)]
pub struct ProviderAdapter {
    name: String,
    slot: ProviderSlot,
}

impl ProviderAdapter {
    /// An adapter that always reports [`ProviderFailure::NotConfigured`].
    pub fn disabled(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slot: ProviderSlot::Disabled,
        }
    }

    /// An adapter backed by a live client; the name comes from the client.
    pub fn ready(client: Arc<dyn Provider>) -> Self {
        Self {
            name: client.name().to_string(),
            slot: ProviderSlot::Ready(client),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self.slot, ProviderSlot::Ready(_))
    }

    pub fn model(&self) -> Option<&str> {
        match &self.slot {
            ProviderSlot::Disabled => None,
            ProviderSlot::Ready(client) => Some(client.model()),
        }
    }

    /// Ask the provider for a reply to `prompt`. One attempt, no retry.
    pub async fn generate(&self, prompt: &Prompt) -> Result<String, ProviderFailure> {
        let client = match &self.slot {
            ProviderSlot::Disabled => return Err(ProviderFailure::NotConfigured),
            ProviderSlot::Ready(client) => client,
        };

        match client.send_message(prompt.as_str()).await {
            Ok(response) => match extract_text(&response) {
                Some(text) => {
                    debug!(
                        provider = %self.name,
                        model = %response.model,
                        output_tokens = response.usage.as_ref().map(|u| u.output_tokens),
                        "Provider replied"
                    );
                    Ok(text)
                }
                None => {
                    warn!(
                        provider = %self.name,
                        model = %client.model(),
                        stop_reason = ?response.stop_reason,
                        "Provider returned an empty reply"
                    );
                    Err(ProviderFailure::Empty)
                }
            },
            Err(err) => {
                self.log_request_failure(client.model(), &err);
                Err(ProviderFailure::Request(err))
            }
        }
    }

    fn log_request_failure(&self, model: &str, err: &ProviderError) {
        let sources = source_chain(err);
        if err.is_transient() {
            warn!(
                provider = %self.name,
                model = %model,
                kind = err.kind(),
                sources = %sources,
                "Provider call failed: {err}"
            );
        } else {
            error!(
                provider = %self.name,
                model = %model,
                kind = err.kind(),
                sources = %sources,
                "Provider call failed unexpectedly: {err}"
            );
        }
    }
}

impl std::fmt::Debug for ProviderAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderAdapter")
            .field("name", &self.name)
            .field("enabled", &self.is_enabled())
            .field("model", &self.model())
            .finish()
    }
}

/// Render the `source()` chain below `err`, innermost last.
fn source_chain(err: &ProviderError) -> String {
    let mut causes = Vec::new();
    let mut current = err.source();
    while let Some(cause) = current {
        causes.push(cause.to_string());
        current = cause.source();
    }
    causes.join(" <- ")
}
