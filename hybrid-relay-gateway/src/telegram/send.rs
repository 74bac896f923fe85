use tracing::{error, info};

use super::api::TelegramClient;

/// Telegram rejects messages longer than this many UTF-16 code units.
pub const TELEGRAM_MESSAGE_LIMIT: usize = 4096;

fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Split `content` into sendable chunks, preferring line boundaries and
/// cutting inside a line only when the line alone exceeds the limit.
pub fn split_telegram_message(content: &str) -> Vec<String> {
    if utf16_len(content) <= TELEGRAM_MESSAGE_LIMIT {
        return vec![content.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for line in content.split_inclusive('\n') {
        let line_len = utf16_len(line);
        if current_len + line_len > TELEGRAM_MESSAGE_LIMIT && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if line_len <= TELEGRAM_MESSAGE_LIMIT {
            current.push_str(line);
            current_len += line_len;
            continue;
        }

        for ch in line.chars() {
            let ch_len = ch.len_utf16();
            if current_len + ch_len > TELEGRAM_MESSAGE_LIMIT {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            current.push(ch);
            current_len += ch_len;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    // Telegram refuses whitespace-only messages
    chunks.retain(|chunk| !chunk.trim().is_empty());
    chunks
}

/// Send a reply, split as needed. The first chunk quotes the user's message.
///
/// Send failures are logged and the remaining chunks are dropped.
pub async fn send_reply(client: &TelegramClient, chat_id: i64, reply_to: i64, text: &str) {
    let chunks = split_telegram_message(text);
    let total = chunks.len();

    for (index, chunk) in chunks.iter().enumerate() {
        let quote = (index == 0).then_some(reply_to);
        if let Err(e) = client.send_message(chat_id, chunk, quote).await {
            error!(chat_id, chunk = index + 1, total, "Failed to send Telegram reply: {e}");
            return;
        }
    }

    if total > 1 {
        info!(chat_id, total, "Sent reply in multiple parts");
    }
}
