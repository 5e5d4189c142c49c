use std::sync::Arc;

use teloxide::{net::Download, prelude::*};

use tracing::warn;

use james_core::{
    addressing::should_respond,
    domain::{ChatId, UserId},
    model::{GenerateRequest, Part},
    prompt::{user_line, PHOTO_GUIDANCE, SPEAKER_CUE},
    security::RateDecision,
    utils::truncate_text,
};

use crate::handlers::{chat_scope, replied_to_bot};
use crate::handlers::prompt::{run_prompt, PromptContext, PromptOptions};
use crate::router::AppState;

/// Download the largest available size of the photo into memory. Telegram
/// photos are always JPEG.
async fn download_photo(
    bot: &Bot,
    photos: &[teloxide::types::PhotoSize],
) -> anyhow::Result<Vec<u8>> {
    let best = photos
        .last()
        .ok_or_else(|| anyhow::anyhow!("no photo sizes"))?;
    let file = bot.get_file(best.file.id.clone()).await?;

    let mut buf = std::io::Cursor::new(Vec::new());
    bot.download_file(&file.path, &mut buf).await?;
    Ok(buf.into_inner())
}

pub async fn handle_photo(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let Some(photos) = msg.photo() else {
        return Ok(());
    };

    let caption = msg.caption().unwrap_or("").to_string();
    let Some(scope) = chat_scope(&msg.chat) else {
        return Ok(());
    };
    let replied = replied_to_bot(&msg, state.bot_id);
    if !should_respond(scope, &caption, &state.bot_username, replied) {
        return Ok(());
    }

    let user_id = user.id.0 as i64;
    let username = user.username.clone().unwrap_or_default();
    let chat_id = msg.chat.id.0;

    // Rate limit before the download, not after.
    {
        let mut rl = state.rate_limiter.lock().await;
        if let RateDecision::Limited { retry_after } = rl.check(UserId(user_id)) {
            let _ = state
                .messenger
                .send_plain(
                    ChatId(chat_id),
                    &format!(
                        "\u{23f3} Rate limited. Please wait {:.1} seconds.",
                        retry_after.as_secs_f64()
                    ),
                )
                .await;
            return Ok(());
        }
    }

    let image = match download_photo(&bot, photos).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(chat_id, error = %e, "photo download failed");
            let _ = state
                .messenger
                .send_plain(
                    ChatId(chat_id),
                    &format!(
                        "\u{274c} Failed to download photo: {}",
                        truncate_text(&e.to_string(), 100)
                    ),
                )
                .await;
            return Ok(());
        }
    };

    let request = GenerateRequest {
        system: state.prompts.system_text(),
        parts: vec![
            Part::text(PHOTO_GUIDANCE),
            Part::text(user_line(&username, &user.first_name, &caption)),
            Part::jpeg(image),
            Part::text(SPEAKER_CUE),
        ],
        temperature: state.cfg.temperature,
    };

    run_prompt(
        PromptContext {
            state,
            chat_id,
            user_id,
            username,
        },
        "PHOTO",
        request,
        PromptOptions {
            skip_rate_limit: true,
        },
    )
    .await
}
