use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageRef},
    messaging::types::LinkButton,
    Result,
};

/// Cross-messenger port.
///
/// Every outbound message the bot produces goes through here, so the core can
/// be driven by a fake in tests and by teloxide in production.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    /// Send plain text (no parse mode).
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef>;

    /// Send plain text with a single URL button underneath.
    async fn send_with_link(
        &self,
        chat_id: ChatId,
        text: &str,
        button: LinkButton,
    ) -> Result<MessageRef>;
}
