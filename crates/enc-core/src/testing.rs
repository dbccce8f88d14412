//! Test doubles shared by the core's unit tests.

use std::{collections::HashSet, sync::Mutex};

use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageId, MessageRef},
    errors::Error,
    messaging::{port::MessagingPort, types::LinkButton},
    Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sent {
    pub chat_id: ChatId,
    pub text: String,
    pub button: Option<LinkButton>,
}

/// Records every send; chats listed in `unreachable` fail like a blocked bot.
#[derive(Default)]
pub struct FakeMessenger {
    next_id: Mutex<i32>,
    unreachable: HashSet<i64>,
    attempts: Mutex<Vec<ChatId>>,
    sent: Mutex<Vec<Sent>>,
}

impl FakeMessenger {
    pub fn failing_for(chat_ids: &[i64]) -> Self {
        Self {
            unreachable: chat_ids.iter().copied().collect(),
            ..Self::default()
        }
    }

    /// Every chat a send was attempted to, in order, including failures.
    pub fn attempts(&self) -> Vec<ChatId> {
        self.attempts.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts_to(&self, chat_id: ChatId) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter(|s| s.chat_id == chat_id)
            .map(|s| s.text)
            .collect()
    }

    fn record(&self, chat_id: ChatId, text: &str, button: Option<LinkButton>) -> Result<MessageRef> {
        self.attempts.lock().unwrap().push(chat_id);
        if self.unreachable.contains(&chat_id.0) {
            return Err(Error::External(
                "telegram error: Forbidden: bot was blocked by the user".to_string(),
            ));
        }
        self.sent.lock().unwrap().push(Sent {
            chat_id,
            text: text.to_string(),
            button,
        });

        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        Ok(MessageRef {
            chat_id,
            message_id: MessageId(*next),
        })
    }
}

#[async_trait]
impl MessagingPort for FakeMessenger {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef> {
        self.record(chat_id, text, None)
    }

    async fn send_with_link(
        &self,
        chat_id: ChatId,
        text: &str,
        button: LinkButton,
    ) -> Result<MessageRef> {
        self.record(chat_id, text, Some(button))
    }
}
