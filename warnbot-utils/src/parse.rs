use poise::serenity_prelude as serenity;

/// Split raw command input into whitespace separated arguments.
///
/// Empty or whitespace-only input yields no arguments.
pub fn split_args(raw: Option<&str>) -> Vec<&str> {
    raw.map(|value| value.split_whitespace().collect())
        .unwrap_or_default()
}

/// Render a user id as the chat identifier used for warn records.
pub fn user_jid(user_id: serenity::UserId) -> String {
    user_id.get().to_string()
}

/// Parse a chat identifier back into a user id.
pub fn jid_user_id(jid: &str) -> Option<serenity::UserId> {
    jid.trim()
        .parse::<u64>()
        .ok()
        .filter(|value| *value > 0)
        .map(serenity::UserId::new)
}
