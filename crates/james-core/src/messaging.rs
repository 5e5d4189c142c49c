//! Outbound messaging port.
//!
//! Telegram is the only implementation today; the trait keeps the handlers
//! testable and leaves room for other messengers behind the same seam.

use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageRef},
    Result,
};

#[async_trait]
pub trait MessengerPort: Send + Sync {
    /// Send a message in Telegram HTML parse mode.
    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<MessageRef>;

    /// Send a message without any parse mode. Used as a fallback when the
    /// HTML rendering is rejected by the API.
    async fn send_plain(&self, chat_id: ChatId, text: &str) -> Result<MessageRef>;

    /// Show a "typing..." indicator in the chat (best-effort).
    async fn send_typing(&self, chat_id: ChatId) -> Result<()>;
}
