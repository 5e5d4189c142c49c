use std::sync::Arc;

use teloxide::{
    dispatching::Dispatcher, dptree, error_handlers::LoggingErrorHandler, prelude::*,
    update_listeners::Polling,
};

use tokio::sync::Mutex;
use tracing::info;

use james_core::{
    config::Config, messaging::MessengerPort, model::ChatModel, prompt::PromptStack,
    security::RateLimiter,
};

use crate::handlers;
use crate::TelegramMessenger;

/// Shared state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub prompts: Arc<PromptStack>,
    pub model: Arc<dyn ChatModel>,
    pub messenger: Arc<dyn MessengerPort>,
    pub rate_limiter: Arc<Mutex<RateLimiter>>,
    pub bot_username: String,
    pub bot_id: teloxide::types::UserId,
}

/// Run the bot in long-polling mode until the process is stopped.
pub async fn run_polling(cfg: Arc<Config>, model: Arc<dyn ChatModel>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_token.clone());

    // The bot's own identity is needed for group gating (mentions and
    // reply-to checks), so a failing getMe is fatal.
    let me = bot
        .get_me()
        .await
        .map_err(|e| anyhow::anyhow!("getMe failed: {e}"))?;
    let bot_username = me.username().to_string();
    let bot_id = me.user.id;

    let prompts = Arc::new(PromptStack::load(&cfg));
    info!(
        bot = %bot_username,
        model = %model.model_name(),
        prompt_layers = prompts.layer_count(),
        "james bot started"
    );
    if !cfg.allowed_users.is_empty() {
        info!(allowed_users = cfg.allowed_users.len(), "allowlist enabled");
    }

    let messenger: Arc<dyn MessengerPort> = Arc::new(TelegramMessenger::new(bot.clone()));

    let state = Arc::new(AppState {
        cfg: cfg.clone(),
        prompts,
        model,
        messenger,
        rate_limiter: Arc::new(Mutex::new(RateLimiter::new(
            cfg.rate_limit_enabled,
            cfg.rate_limit_requests,
            cfg.rate_limit_window,
        ))),
        bot_username,
        bot_id,
    });

    let handler = dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_message));

    let listener = Polling::builder(bot.clone())
        .timeout(cfg.poll_timeout)
        .build();

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("update listener error"),
        )
        .await;

    Ok(())
}
