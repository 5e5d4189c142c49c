//! Telegram update handlers.
//!
//! Each handler validates access, decides whether the message is addressed
//! to the bot, builds a `GenerateRequest`, and runs it through the shared
//! prompt path.

use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{Chat, Message},
};

use tracing::debug;

use james_core::{addressing::ChatScope, domain::UserId, security::is_authorized};

use crate::router::AppState;

mod commands;
mod photo;
mod prompt;
mod text;

pub async fn handle_message(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(user) = msg.from() else {
        // Channel posts and service messages carry no sender.
        return Ok(());
    };

    if !is_authorized(Some(UserId(user.id.0 as i64)), &state.cfg.allowed_users) {
        debug!(user_id = user.id.0, "dropping message from unlisted user");
        return Ok(());
    }

    if let Some(text) = msg.text() {
        if text.starts_with('/') {
            return commands::handle_command(bot, msg, state).await;
        }
        return text::handle_text(bot, msg, state).await;
    }

    if msg.photo().is_some() {
        return photo::handle_photo(bot, msg, state).await;
    }

    // Stickers, voice, documents etc: not served.
    Ok(())
}

/// Map a Telegram chat onto the gating policy's scope. `None` means the chat
/// kind is not served at all (channels).
pub(crate) fn chat_scope(chat: &Chat) -> Option<ChatScope> {
    if chat.is_private() {
        return Some(ChatScope::Private);
    }
    if chat.is_group() || chat.is_supergroup() {
        return Some(ChatScope::Group);
    }
    None
}

pub(crate) fn replied_to_bot(msg: &Message, bot_id: teloxide::types::UserId) -> bool {
    msg.reply_to_message()
        .and_then(|m| m.from())
        .map(|u| u.id == bot_id)
        .unwrap_or(false)
}
