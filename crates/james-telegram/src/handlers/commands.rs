use std::sync::Arc;

use teloxide::prelude::*;

use crate::router::AppState;

const START_TEXT: &str = "Hi! I\u{2019}m James Makonian \u{2014} your SAT Reading & Writing helper.\n\
Try: /help or just ask a question. In groups, mention \u{201c}James\u{201d} to talk to me.";

const HELP_TEXT: &str = "/help \u{2014} this message\n\
In groups: say \u{201c}James \u{2026}\u{201d} or reply to me.\n\
I focus on SAT Reading & Writing (I skip math).";

/// Split `/cmd@botname args` into a lowercase command name and its argument
/// string. Telegram appends `@botname` in group chats.
fn parse_command(text: &str) -> (String, String) {
    let mut parts = text.trim().splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    let rest = parts.next().unwrap_or("").trim().to_string();

    let cmd = first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();

    (cmd, rest)
}

pub async fn handle_command(bot: Bot, msg: Message, _state: Arc<AppState>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let (cmd, _args) = parse_command(text);

    match cmd.as_str() {
        "start" => {
            bot.send_message(msg.chat.id, START_TEXT).await?;
        }
        "help" => {
            bot.send_message(msg.chat.id, HELP_TEXT).await?;
        }
        // No handler registered for anything else.
        _ => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_command() {
        assert_eq!(parse_command("/start"), ("start".to_string(), String::new()));
    }

    #[test]
    fn strips_bot_suffix_and_keeps_args() {
        let (cmd, args) = parse_command("/help@JamesBot tell me more");
        assert_eq!(cmd, "help");
        assert_eq!(args, "tell me more");
    }

    #[test]
    fn lowercases_command_name() {
        assert_eq!(parse_command("/HELP").0, "help");
    }
}
