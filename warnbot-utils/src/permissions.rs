use poise::serenity_prelude as serenity;
use tracing::debug;

/// Resolve a member's effective guild-level permissions from their roles.
///
/// The guild owner implicitly holds every permission.
pub async fn resolve_user_permissions(
    http: &serenity::Http,
    guild_id: serenity::GuildId,
    user_id: serenity::UserId,
) -> anyhow::Result<serenity::Permissions> {
    let guild = guild_id.to_partial_guild(http).await?;
    if guild.owner_id == user_id {
        return Ok(serenity::Permissions::all());
    }

    let member = guild_id.member(http, user_id).await?;
    let roles = guild_id.roles(http).await?;

    let everyone_role_id = serenity::RoleId::new(guild_id.get());
    let resolved = roles
        .values()
        .filter(|role| role.id == everyone_role_id || member.roles.contains(&role.id))
        .fold(serenity::Permissions::empty(), |acc, role| acc | role.permissions);

    Ok(resolved)
}

/// Whether `user_id` may perform actions guarded by `required`.
pub async fn has_user_permission(
    http: &serenity::Http,
    guild_id: serenity::GuildId,
    user_id: serenity::UserId,
    required: serenity::Permissions,
) -> anyhow::Result<bool> {
    let perms = resolve_user_permissions(http, guild_id, user_id).await?;
    let allowed = grants(perms, required);

    debug!(%user_id, %guild_id, allowed, "resolved moderator permission");
    Ok(allowed)
}

/// `ADMINISTRATOR` grants everything.
pub fn grants(perms: serenity::Permissions, required: serenity::Permissions) -> bool {
    perms.contains(serenity::Permissions::ADMINISTRATOR) || perms.contains(required)
}

#[cfg(test)]
mod tests {
    use poise::serenity_prelude as serenity;

    use super::grants;

    #[test]
    fn administrator_grants_everything() {
        assert!(grants(
            serenity::Permissions::ADMINISTRATOR,
            serenity::Permissions::KICK_MEMBERS
        ));
    }

    #[test]
    fn requires_the_exact_permission_otherwise() {
        let moderator =
            serenity::Permissions::KICK_MEMBERS | serenity::Permissions::MANAGE_MESSAGES;
        assert!(grants(moderator, serenity::Permissions::KICK_MEMBERS));
        assert!(!grants(
            serenity::Permissions::MANAGE_MESSAGES,
            serenity::Permissions::KICK_MEMBERS
        ));
        assert!(!grants(
            serenity::Permissions::empty(),
            serenity::Permissions::KICK_MEMBERS
        ));
    }
}
