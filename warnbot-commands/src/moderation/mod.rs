pub mod chat;
pub(crate) mod messages;
pub mod warn;

pub use chat::{GuildChat, ModerationChat};
pub use warn::{WARN_LIMIT, WarnOutcome, run_warn};
