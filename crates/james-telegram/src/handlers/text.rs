use std::sync::Arc;

use teloxide::prelude::*;

use james_core::{
    addressing::should_respond,
    model::{GenerateRequest, Part},
    prompt::{user_line, SPEAKER_CUE, TEXT_GUIDANCE},
};

use crate::handlers::{chat_scope, replied_to_bot};
use crate::handlers::prompt::{run_prompt, PromptContext, PromptOptions};
use crate::router::AppState;

pub async fn handle_text(_bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let Some(text) = msg.text().map(|s| s.to_string()) else {
        return Ok(());
    };
    if text.trim().is_empty() {
        return Ok(());
    }

    let Some(scope) = chat_scope(&msg.chat) else {
        return Ok(());
    };
    let replied = replied_to_bot(&msg, state.bot_id);
    if !should_respond(scope, &text, &state.bot_username, replied) {
        return Ok(());
    }

    let username = user.username.clone().unwrap_or_default();
    let first_name = user.first_name.clone();

    let request = GenerateRequest {
        system: state.prompts.system_text(),
        parts: vec![
            Part::text(TEXT_GUIDANCE),
            Part::text(user_line(&username, &first_name, &text)),
            Part::text(SPEAKER_CUE),
        ],
        temperature: state.cfg.temperature,
    };

    run_prompt(
        PromptContext {
            state,
            chat_id: msg.chat.id.0,
            user_id: user.id.0 as i64,
            username,
        },
        "TEXT",
        request,
        PromptOptions {
            skip_rate_limit: false,
        },
    )
    .await
}
