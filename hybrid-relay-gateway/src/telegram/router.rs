use super::api::Message;

/// Entity type Telegram assigns to `/command` spans.
const BOT_COMMAND: &str = "bot_command";

/// What an incoming message asks the bot to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// `/start`: answer with the welcome text
    Start,
    /// Any other `/command`, or one addressed to another bot; ignored
    Command(String),
    /// Plain text for the responder chain
    Text(String),
    /// No text at all (stickers, photos, service messages)
    Ignored,
}

/// Classify a message by its text and entities.
///
/// A message is a command only when Telegram marked a `bot_command` entity
/// at offset 0, so `/` alone or `/ hello` is plain text. A command carrying
/// a mention (`/start@name`) counts as ours only when `name` matches
/// `bot_username`; when the username is unknown every mention is accepted.
pub fn classify(message: &Message, bot_username: Option<&str>) -> Inbound {
    let Some(text) = message.text.as_deref() else {
        return Inbound::Ignored;
    };

    let command = message
        .entities
        .first()
        .filter(|entity| entity.kind == BOT_COMMAND && entity.offset == 0)
        .map(|entity| utf16_prefix(text, entity.length));

    let Some(command) = command else {
        return Inbound::Text(text.to_string());
    };

    let command = command.strip_prefix('/').unwrap_or(command);
    let (name, mention) = match command.split_once('@') {
        Some((name, mention)) => (name, Some(mention)),
        None => (command, None),
    };
    let name = name.to_lowercase();

    let addressed_to_us = match (mention, bot_username) {
        (Some(mention), Some(username)) => mention.eq_ignore_ascii_case(username),
        _ => true,
    };

    if name == "start" && addressed_to_us {
        Inbound::Start
    } else {
        Inbound::Command(name)
    }
}

/// The leading `units` UTF-16 code units of `text`, cut on a char boundary.
fn utf16_prefix(text: &str, units: usize) -> &str {
    let mut count = 0;
    for (index, ch) in text.char_indices() {
        if count >= units {
            return &text[..index];
        }
        count += ch.len_utf16();
    }
    text
}
