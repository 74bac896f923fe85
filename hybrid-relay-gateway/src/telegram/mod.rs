mod api;
mod bot;
mod router;
mod send;

use std::sync::Arc;

use hybrid_relay_core::Config;
use tracing::info;

use crate::chain::ResponderChain;

pub use api::{Chat, Message, MessageEntity, TelegramClient, Update, User};
pub use bot::Bot;
pub use router::{Inbound, classify};
pub use send::{TELEGRAM_MESSAGE_LIMIT, send_reply, split_telegram_message};

/// Authenticate against the Bot API and prepare the polling bot.
///
/// Fails when the token is rejected; the receive loop never starts in
/// that case.
pub async fn start_telegram_bot(
    config: &Config,
    chain: Arc<ResponderChain>,
) -> Result<Bot, TelegramError> {
    let settings = &config.settings.telegram;
    let client = TelegramClient::new(config.telegram_token(), &settings.api_base_url);

    let me = client.get_me().await?;
    info!(
        "Telegram bot authenticated as @{}",
        me.username.as_deref().unwrap_or(&me.first_name)
    );

    client.delete_webhook(settings.drop_pending_updates).await?;
    if settings.drop_pending_updates {
        info!("Dropped pending Telegram updates");
    }

    let bot = Bot::new(client, chain, settings, &config.settings.replies.welcome);
    Ok(match me.username {
        Some(username) => bot.with_username(username),
        None => bot,
    })
}

/// Telegram-related errors
#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    #[error("Telegram request failed: {0}")]
    Http(#[source] reqwest::Error),

    #[error("Telegram API error {code}: {description}")]
    Api { code: i64, description: String },

    #[error("Invalid Telegram response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for TelegramError {
    fn from(err: reqwest::Error) -> Self {
        // Bot API URLs embed the token
        Self::Http(err.without_url())
    }
}
