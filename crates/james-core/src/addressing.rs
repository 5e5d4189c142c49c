//! Group-chat gating: when is a message addressed to the bot?

/// Where a message arrived. Channels are not served at all, so the enum only
/// distinguishes the two cases the policy cares about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChatScope {
    Private,
    Group,
}

/// Decide whether a (non-command) message is addressed to the bot.
///
/// Private chats: always. Groups and supergroups: only when the text or
/// caption mentions "james" (any case) or the bot's @username, or when the
/// message is a reply to one of the bot's own messages.
pub fn should_respond(
    scope: ChatScope,
    text: &str,
    bot_username: &str,
    replied_to_bot: bool,
) -> bool {
    if scope == ChatScope::Private {
        return true;
    }
    if replied_to_bot {
        return true;
    }

    let lower = text.to_lowercase();
    if lower.contains("james") {
        return true;
    }

    let uname = bot_username.trim_start_matches('@').to_lowercase();
    !uname.is_empty() && lower.contains(&format!("@{uname}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn private_always_responds() {
        assert!(should_respond(ChatScope::Private, "anything", "jamesbot", false));
        assert!(should_respond(ChatScope::Private, "", "jamesbot", false));
    }

    #[test]
    fn group_requires_mention() {
        assert!(!should_respond(ChatScope::Group, "what is 2+2", "jamesbot", false));
        assert!(should_respond(ChatScope::Group, "hey James, help", "jamesbot", false));
        assert!(should_respond(ChatScope::Group, "JAMES?", "jamesbot", false));
    }

    #[test]
    fn group_matches_bot_username() {
        assert!(should_respond(ChatScope::Group, "ping @JamesBot", "JamesBot", false));
        assert!(!should_respond(ChatScope::Group, "ping @otherbot", "JamesBot", false));
    }

    #[test]
    fn group_reply_to_bot_counts() {
        assert!(should_respond(ChatScope::Group, "and this one?", "jamesbot", true));
    }

    #[test]
    fn empty_username_never_matches_bare_at() {
        assert!(!should_respond(ChatScope::Group, "hello @", "", false));
    }
}
