//! Shared prompt run path: rate limiting, typing indicator, model call,
//! SKIP suppression, and reply delivery.

use std::sync::Arc;

use teloxide::prelude::ResponseResult;

use tracing::{debug, warn};

use james_core::{
    domain::{ChatId, UserId},
    formatting::markdown_to_html,
    model::GenerateRequest,
    prompt::is_skip,
    security::RateDecision,
    utils::split_message,
};

use crate::router::AppState;

pub struct PromptContext {
    pub state: Arc<AppState>,
    pub chat_id: i64,
    pub user_id: i64,
    pub username: String,
}

#[derive(Clone, Copy, Debug)]
pub struct PromptOptions {
    /// Set when the caller already charged the rate limiter (photo handler
    /// checks before downloading).
    pub skip_rate_limit: bool,
}

pub async fn run_prompt(
    ctx: PromptContext,
    message_type: &str,
    request: GenerateRequest,
    opts: PromptOptions,
) -> ResponseResult<()> {
    let PromptContext {
        state,
        chat_id,
        user_id,
        username,
    } = ctx;
    let chat = ChatId(chat_id);

    if !opts.skip_rate_limit {
        let mut rl = state.rate_limiter.lock().await;
        if let RateDecision::Limited { retry_after } = rl.check(UserId(user_id)) {
            let retry = retry_after.as_secs_f64();
            warn!(user_id, %username, retry, "rate limited");
            let _ = state
                .messenger
                .send_plain(
                    chat,
                    &format!("\u{23f3} Rate limited. Please wait {retry:.1} seconds."),
                )
                .await;
            return Ok(());
        }
    }

    // Typing indicator while the model call is in flight (best-effort).
    let (stop_tx, mut stop_rx) = tokio::sync::oneshot::channel::<()>();
    let typing_state = state.clone();
    let typing_task = tokio::spawn(async move {
        let mut tick = tokio::time::interval(std::time::Duration::from_secs(4));
        loop {
            tokio::select! {
                _ = tick.tick() => {
                    let _ = typing_state.messenger.send_typing(chat).await;
                }
                _ = &mut stop_rx => break,
            }
        }
    });

    let outcome = state.model.generate(&request).await;

    let _ = stop_tx.send(());
    let _ = typing_task.await;

    let reply = match outcome {
        Ok(reply) => reply,
        Err(err) => {
            // The user gets no error spam for a flaky model call; it only
            // shows up in the logs.
            warn!(user_id, kind = message_type, error = %err, "model call failed");
            return Ok(());
        }
    };

    if reply.is_empty() || is_skip(&reply) {
        debug!(user_id, kind = message_type, "model skipped the message");
        return Ok(());
    }

    for chunk in split_message(&reply, state.cfg.telegram_safe_limit) {
        let html = markdown_to_html(&chunk);
        if let Err(err) = state.messenger.send_html(chat, &html).await {
            // Bad entity markup or over-length after escaping: retry the raw
            // markdown without a parse mode rather than dropping the reply.
            warn!(chat_id, error = %err, "html send failed, falling back to plain text");
            if let Err(err) = state.messenger.send_plain(chat, &chunk).await {
                warn!(chat_id, error = %err, "plain send failed, dropping chunk");
            }
        }
    }

    Ok(())
}
