use std::future::Future;

use poise::serenity_prelude as serenity;

use crate::moderation::messages::KICK_REASON;
use warnbot_core::Context;
use warnbot_utils::parse::jid_user_id;

/// Platform actions the moderation handlers need.
pub trait ModerationChat: Send + Sync {
    /// Reply to the invoking message.
    fn reply(&self, text: &str) -> impl Future<Output = anyhow::Result<()>> + Send;

    /// Remove `jid` from the conversation the command was invoked in.
    fn remove_member(&self, jid: &str) -> impl Future<Output = anyhow::Result<()>> + Send;
}

/// [`ModerationChat`] bound to the guild a command was invoked in.
pub struct GuildChat<'a> {
    ctx: Context<'a>,
    guild_id: serenity::GuildId,
}

impl<'a> GuildChat<'a> {
    pub fn new(ctx: Context<'a>, guild_id: serenity::GuildId) -> Self {
        Self { ctx, guild_id }
    }
}

impl ModerationChat for GuildChat<'_> {
    async fn reply(&self, text: &str) -> anyhow::Result<()> {
        self.ctx.reply(text).await?;
        Ok(())
    }

    async fn remove_member(&self, jid: &str) -> anyhow::Result<()> {
        let user_id =
            jid_user_id(jid).ok_or_else(|| anyhow::anyhow!("`{jid}` is not a user id"))?;

        self.guild_id
            .kick_with_reason(self.ctx.http(), user_id, KICK_REASON)
            .await?;

        Ok(())
    }
}
