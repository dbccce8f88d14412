//! Update routing: `/start`, `/broadcast`, `/cancel` and broadcast payload text.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    broadcast::BroadcastEngine,
    config::Config,
    conversation::{Conversations, SessionKey},
    dispatch::{Delivery, Dispatcher},
    domain::{ChatId, UserId},
    messaging::{
        port::MessagingPort,
        types::{Command, IncomingUpdate, LinkButton, TextMessage},
    },
    store::UserStore,
    texts, Result,
};

#[derive(Clone, Debug)]
pub struct BotSettings {
    pub admin_id: UserId,
    pub mini_app_url: String,
    pub session_timeout: Option<std::time::Duration>,
    pub broadcast_concurrency: usize,
}

impl From<&Config> for BotSettings {
    fn from(cfg: &Config) -> Self {
        Self {
            admin_id: cfg.admin_id,
            mini_app_url: cfg.mini_app_url.clone(),
            session_timeout: cfg.broadcast_session_timeout,
            broadcast_concurrency: cfg.broadcast_concurrency,
        }
    }
}

pub struct BotService {
    settings: BotSettings,
    store: Arc<dyn UserStore>,
    dispatcher: Dispatcher,
    engine: BroadcastEngine,
    conversations: Mutex<Conversations>,
}

impl BotService {
    pub fn new(
        settings: BotSettings,
        store: Arc<dyn UserStore>,
        messenger: Arc<dyn MessagingPort>,
    ) -> Self {
        let dispatcher = Dispatcher::new(messenger);
        let engine = BroadcastEngine::new(
            store.clone(),
            dispatcher.clone(),
            settings.broadcast_concurrency,
        );
        let conversations = Mutex::new(Conversations::new(settings.session_timeout));
        Self {
            settings,
            store,
            dispatcher,
            engine,
            conversations,
        }
    }

    pub fn is_admin(&self, user_id: UserId) -> bool {
        user_id == self.settings.admin_id
    }

    /// Route one update. Errors are replies that could not be sent.
    pub async fn handle(&self, update: IncomingUpdate) -> Result<()> {
        match update {
            IncomingUpdate::Command(cmd) => match cmd.name.as_str() {
                "start" => self.start(&cmd).await,
                "broadcast" => self.open_broadcast(&cmd).await,
                "cancel" => self.cancel_broadcast(&cmd).await,
                other => {
                    tracing::debug!(command = other, "ignoring unknown command");
                    Ok(())
                }
            },
            IncomingUpdate::Text(msg) => self.text(&msg).await,
        }
    }

    async fn start(&self, cmd: &Command) -> Result<()> {
        let sender = &cmd.sender;
        let record = self.store.upsert(
            sender.user_id,
            sender.username.as_deref(),
            sender.first_name.as_deref(),
        );
        tracing::info!(user_id = sender.user_id.0, username = %record.username, "user started bot");

        self.reply_with_link(
            cmd.chat_id,
            texts::WELCOME,
            LinkButton::new(texts::LAUNCH_BUTTON, self.settings.mini_app_url.clone()),
        )
        .await?;

        if !self.is_admin(sender.user_id) {
            let notice =
                texts::new_user_notification(&record.first_name, &record.username, sender.user_id);
            if self
                .dispatcher
                .notify(self.settings.admin_id.into(), &notice)
                .await
                == Delivery::Unreachable
            {
                tracing::error!(user_id = sender.user_id.0, "failed to notify admin");
            }
        }
        Ok(())
    }

    async fn open_broadcast(&self, cmd: &Command) -> Result<()> {
        if !self.is_admin(cmd.sender.user_id) {
            tracing::warn!(user_id = cmd.sender.user_id.0, "unauthorized /broadcast");
            return self.reply(cmd.chat_id, texts::PERMISSION_DENIED).await;
        }

        self.conversations
            .lock()
            .await
            .open(SessionKey::new(cmd.chat_id, cmd.sender.user_id));
        self.reply(cmd.chat_id, texts::BROADCAST_PROMPT).await
    }

    async fn cancel_broadcast(&self, cmd: &Command) -> Result<()> {
        let key = SessionKey::new(cmd.chat_id, cmd.sender.user_id);
        if !self.conversations.lock().await.cancel(key) {
            return Ok(());
        }
        self.reply(cmd.chat_id, texts::BROADCAST_CANCELLED).await
    }

    async fn text(&self, msg: &TextMessage) -> Result<()> {
        let key = SessionKey::new(msg.chat_id, msg.sender.user_id);
        // The lock is released before any network call.
        let pending = self.conversations.lock().await.take_pending(key);
        if !pending {
            return Ok(());
        }

        // The engine already reported the summary to this chat.
        let summary = self.engine.broadcast(msg.chat_id, &msg.text).await;
        tracing::debug!(?summary, chat_id = msg.chat_id.0, "broadcast session closed");
        Ok(())
    }

    async fn reply(&self, chat_id: ChatId, text: &str) -> Result<()> {
        self.dispatcher.messenger().send_text(chat_id, text).await?;
        Ok(())
    }

    async fn reply_with_link(&self, chat_id: ChatId, text: &str, button: LinkButton) -> Result<()> {
        self.dispatcher
            .messenger()
            .send_with_link(chat_id, text, button)
            .await?;
        Ok(())
    }
}
