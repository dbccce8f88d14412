use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use enc_core::{
    bot::{BotService, BotSettings},
    config::{self, Config},
    store::JsonFileStore,
};

#[tokio::main]
async fn main() -> Result<(), enc_core::Error> {
    // `.env` may carry RUST_LOG, so it is applied before the subscriber reads the filter.
    config::load_dotenv();
    enc_core::logging::init("enc")?;

    let cfg = Arc::new(Config::load()?);

    // The liveness server runs independently of the bot and outlives a failed bot startup.
    let shutdown = CancellationToken::new();
    let health = {
        let addr = cfg.health_addr();
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) = enc_health::serve(addr, shutdown).await {
                error!(error = %e, "liveness server failed");
            }
        })
    };

    match cfg.bot_token.as_deref() {
        Some(token) => run_bot(&cfg, token).await,
        None => {
            error!("BOT_TOKEN not found! Bot startup skipped; liveness server keeps running");
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "failed to wait for ctrl-c");
            }
        }
    }

    shutdown.cancel();
    if let Err(e) = health.await {
        error!(error = %e, "liveness server task panicked");
    }

    Ok(())
}

async fn run_bot(cfg: &Config, token: &str) {
    let store = Arc::new(JsonFileStore::new(cfg.users_file.clone()));
    info!(users_file = %store.path().display(), admin_id = cfg.admin_id.0, "user store ready");

    let (bot, messenger) = enc_telegram::router::messenger(token);
    let service = Arc::new(BotService::new(BotSettings::from(cfg), store, messenger));

    if let Err(e) = enc_telegram::router::run_polling(bot, service).await {
        error!(error = %e, "telegram bot failed");
    }
}
