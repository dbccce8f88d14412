use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*, types::BotCommand};

use enc_core::{bot::BotService, messaging::port::MessagingPort};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<BotService>,
}

/// Messenger bound to a bot token. The core service is built on top of it.
pub fn messenger(token: &str) -> (Bot, Arc<dyn MessagingPort>) {
    let bot = Bot::new(token);
    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    (bot, messenger)
}

/// Long-poll for updates until Ctrl-C.
///
/// Teloxide runs updates of one chat in order and different chats concurrently,
/// so a running broadcast only holds up the admin's own chat.
pub async fn run_polling(bot: Bot, service: Arc<BotService>) -> anyhow::Result<()> {
    match bot.get_me().await {
        Ok(me) => tracing::info!(username = %me.username(), "bot starting"),
        Err(e) => tracing::warn!(error = %e, "get_me failed; polling anyway"),
    }

    if let Err(e) = bot.set_my_commands(command_menu()).await {
        tracing::warn!(error = %e, "failed to register command menu");
    }

    let state = Arc::new(AppState { service });

    let handler = dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .default_handler(|upd| async move {
            tracing::trace!(update = ?upd, "unhandled update");
        })
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

fn command_menu() -> Vec<BotCommand> {
    vec![
        BotCommand::new("start", "Launch Encryptonite"),
        BotCommand::new("broadcast", "Message all users (admin only)"),
        BotCommand::new("cancel", "Cancel a pending broadcast"),
    ]
}
