use poise::serenity_prelude as serenity;
use tracing::{debug, error, info};

use crate::moderation::chat::{GuildChat, ModerationChat};
use crate::moderation::messages::{
    LIMIT_REACHED, REMOVAL_FAILED, RESET_DONE, WARN_USAGE, guild_only_message,
    permission_denied_message, warned_message,
};
use warnbot_core::{Context, Error};
use warnbot_database::WarnStore;
use warnbot_utils::parse::{split_args, user_jid};
use warnbot_utils::permissions::has_user_permission;

/// Warnings after which the target is removed.
pub const WARN_LIMIT: u32 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WarnOutcome {
    Warned { count: u32, remaining: u32 },
    Removed { count: u32 },
    RemovalFailed { count: u32 },
    Reset,
    Usage,
    /// The store could not be read or written. Nothing was sent to the chat.
    StorageFailed,
}

/// Reply-based targets take precedence over the invoking author.
pub fn select_target(
    author: serenity::UserId,
    quoted_author: Option<serenity::UserId>,
) -> serenity::UserId {
    quoted_author.unwrap_or(author)
}

/// Warn the author of the replied message, kicking them at the warning limit.
#[poise::command(prefix_command, category = "Moderation")]
pub async fn warn(
    ctx: Context<'_>,
    #[description = "Leave empty to warn, or `reset` to clear the count"]
    #[rest]
    args: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    if !has_user_permission(
        ctx.http(),
        guild_id,
        ctx.author().id,
        serenity::Permissions::KICK_MEMBERS,
    )
    .await?
    {
        ctx.say(permission_denied_message()).await?;
        return Ok(());
    }

    let quoted_author = match ctx {
        poise::Context::Prefix(prefix) => prefix
            .msg
            .referenced_message
            .as_ref()
            .map(|message| message.author.id),
        poise::Context::Application(_) => None,
    };
    let target = user_jid(select_target(ctx.author().id, quoted_author));
    let args = split_args(args.as_deref());

    let chat = GuildChat::new(ctx, guild_id);
    let outcome = run_warn(&ctx.data().store, &chat, &target, &args).await?;
    debug!(?outcome, jid = %target, "warn command handled");

    Ok(())
}

/// Apply the warn command for `target`.
///
/// With no arguments the target gains a warning and is removed once the count
/// reaches [`WARN_LIMIT`]. `reset` zeroes the count. Anything else replies with
/// usage and leaves the store untouched. Storage failures are logged and never
/// shown in the chat.
pub async fn run_warn<S, C>(
    store: &S,
    chat: &C,
    target: &str,
    args: &[&str],
) -> anyhow::Result<WarnOutcome>
where
    S: WarnStore,
    C: ModerationChat,
{
    match args.first().copied() {
        None => warn_target(store, chat, target).await,
        Some("reset") => reset_target(store, chat, target).await,
        Some(_) => {
            chat.reply(WARN_USAGE).await?;
            Ok(WarnOutcome::Usage)
        }
    }
}

async fn warn_target<S, C>(store: &S, chat: &C, target: &str) -> anyhow::Result<WarnOutcome>
where
    S: WarnStore,
    C: ModerationChat,
{
    if let Err(source) = store.increment_warn_count(target).await {
        error!(?source, jid = target, "failed to increment warn count");
        return Ok(WarnOutcome::StorageFailed);
    }

    let count = match store.warn_count(target).await {
        Ok(count) => count,
        Err(source) => {
            error!(?source, jid = target, "failed to read warn count");
            return Ok(WarnOutcome::StorageFailed);
        }
    };

    if count < WARN_LIMIT {
        let remaining = WARN_LIMIT - count;
        info!(jid = target, warn_count = count, remaining, "user warned");
        chat.reply(&warned_message(remaining)).await?;
        return Ok(WarnOutcome::Warned { count, remaining });
    }

    info!(jid = target, warn_count = count, "warn limit reached; removing user");
    chat.reply(LIMIT_REACHED).await?;

    if let Err(source) = chat.remove_member(target).await {
        error!(?source, jid = target, "failed to remove warned user");
        chat.reply(REMOVAL_FAILED).await?;
        return Ok(WarnOutcome::RemovalFailed { count });
    }

    Ok(WarnOutcome::Removed { count })
}

async fn reset_target<S, C>(store: &S, chat: &C, target: &str) -> anyhow::Result<WarnOutcome>
where
    S: WarnStore,
    C: ModerationChat,
{
    match store.reset_warn_count(target).await {
        Ok(existed) => {
            info!(jid = target, existed, "warn count reset");
            chat.reply(RESET_DONE).await?;
            Ok(WarnOutcome::Reset)
        }
        Err(source) => {
            error!(?source, jid = target, "failed to reset warn count");
            Ok(WarnOutcome::StorageFailed)
        }
    }
}
