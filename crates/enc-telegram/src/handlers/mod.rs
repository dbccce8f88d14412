//! Telegram update handlers.
//!
//! The adapter only translates: a teloxide `Message` becomes a core
//! `IncomingUpdate`, the core decides what to do. Anything that is neither a
//! command nor plain text (photos, stickers, service messages) is dropped here.

use std::sync::Arc;

use teloxide::{prelude::*, types::Message};

use enc_core::{
    domain::{ChatId, UserId},
    messaging::types::{parse_command, Command, IncomingUpdate, Sender, TextMessage},
};

use crate::router::AppState;

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(update) = to_incoming(&msg) else {
        return Ok(());
    };

    // Process-wide error hook: log the offending update, never reply, never crash.
    if let Err(e) = state.service.handle(update.clone()).await {
        tracing::error!(update = ?update, error = %e, "update caused error");
    }
    Ok(())
}

pub fn to_incoming(msg: &Message) -> Option<IncomingUpdate> {
    let user = msg.from()?;
    let text = msg.text()?;

    let sender = Sender {
        user_id: UserId(user.id.0 as i64),
        username: user.username.clone(),
        first_name: Some(user.first_name.clone()).filter(|s| !s.is_empty()),
    };
    let chat_id = ChatId(msg.chat.id.0);

    Some(match parse_command(text) {
        Some(name) => IncomingUpdate::Command(Command {
            chat_id,
            sender,
            name,
        }),
        None => IncomingUpdate::Text(TextMessage {
            chat_id,
            sender,
            text: text.to_string(),
        }),
    })
}
