use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use hybrid_relay_core::TelegramSettings;
use tracing::{debug, info, warn};

use super::api::{Message, TelegramClient, Update};
use super::router::{Inbound, classify};
use super::send::send_reply;
use crate::chain::ResponderChain;

/// Pause before polling again after a failed `getUpdates`.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(3);

/// Telegram bot handler
///
/// Owns the transport; all reply logic is delegated to the shared
/// [`ResponderChain`].
pub struct Bot {
    client: TelegramClient,
    chain: Arc<ResponderChain>,
    welcome: String,
    poll_timeout_seconds: u64,
    username: Option<String>,
}

impl Bot {
    pub fn new(
        client: TelegramClient,
        chain: Arc<ResponderChain>,
        settings: &TelegramSettings,
        welcome: impl Into<String>,
    ) -> Self {
        Self {
            client,
            chain,
            welcome: welcome.into(),
            poll_timeout_seconds: settings.poll_timeout_seconds,
            username: None,
        }
    }

    /// Set the bot's own username so `/start@other_bot` is not answered.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Text to send back for `message`, if any.
    ///
    /// `/start` gets the welcome text; plain text goes through the chain;
    /// blank text, other commands and non-text messages get nothing.
    pub async fn handle_message(&self, message: &Message) -> Option<String> {
        match classify(message, self.username.as_deref()) {
            Inbound::Start => Some(self.welcome.clone()),
            Inbound::Text(text) => {
                let reply = self.chain.respond_to_text(&text).await?;
                debug!(
                    chat_id = message.chat.id,
                    source = ?reply.source(),
                    "Replying: {}",
                    reply.text()
                );
                Some(reply.into_text())
            }
            Inbound::Command(name) => {
                debug!(chat_id = message.chat.id, command = %name, "Ignoring command");
                None
            }
            Inbound::Ignored => None,
        }
    }

    /// Handle one update end to end, sending the reply if there is one.
    pub async fn process_update(&self, update: Update) {
        let Some(message) = update.message else {
            return;
        };

        debug!(
            update_id = update.update_id,
            chat_id = message.chat.id,
            user = message.from.as_ref().map(|u| u.id),
            "Message received"
        );

        if let Some(reply) = self.handle_message(&message).await {
            send_reply(&self.client, message.chat.id, message.message_id, &reply).await;
        }
    }

    /// Poll for updates until `shutdown` resolves.
    ///
    /// Each update is handled on its own task so a slow provider for one
    /// chat does not hold up the others.
    pub async fn run_until<F>(self: Arc<Self>, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut offset: Option<i64> = None;

        loop {
            let result = tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping Telegram polling");
                    return;
                }
                result = self.client.get_updates(offset, self.poll_timeout_seconds) => result,
            };

            match result {
                Ok(updates) => {
                    for update in updates {
                        offset = Some(update.update_id + 1);
                        let bot = Arc::clone(&self);
                        tokio::spawn(async move {
                            bot.process_update(update).await;
                        });
                    }
                }
                Err(e) => {
                    warn!("Telegram getUpdates failed: {e}; retrying in {POLL_RETRY_DELAY:?}");
                    tokio::select! {
                        _ = &mut shutdown => {
                            info!("Shutdown requested, stopping Telegram polling");
                            return;
                        }
                        _ = tokio::time::sleep(POLL_RETRY_DELAY) => {}
                    }
                }
            }
        }
    }

    /// Poll until Ctrl+C.
    pub async fn run(self: Arc<Self>) {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl+C: {e}");
                std::future::pending::<()>().await;
            }
        })
        .await;
    }
}
