pub const LIMIT_REACHED: &str =
    "This user has reached the limit of warnings, so they will be kicked out.";
pub const RESET_DONE: &str = "Warn count has been reset for this user.";
pub const WARN_USAGE: &str =
    "Reply to a user with \".warn\" or \".warn reset\" to warn or reset the warn count.";
pub const REMOVAL_FAILED: &str =
    "I couldn't kick that user. Check role hierarchy and permissions.";
pub const KICK_REASON: &str = "Reached the warning limit";

pub fn warned_message(remaining: u32) -> String {
    format!("This user has been warned. Warnings left before kick: {remaining}")
}

pub fn guild_only_message() -> &'static str {
    "This command only works in servers."
}

pub fn permission_denied_message() -> &'static str {
    "You don't have permission to use this command."
}
