use crate::services::store::GuildSetup;
use poise::serenity_prelude as serenity;

/// The member issuing an administrative request.
#[derive(Debug, Clone)]
pub struct Actor {
    pub user_id: serenity::UserId,
    pub roles: Vec<serenity::RoleId>,
    pub origin_channel_id: serenity::ChannelId,
}

pub struct AuthorizationGate;

impl AuthorizationGate {
    /// Admins and moderators may manage joinable channels, but only from the
    /// configured admin channel.
    pub fn allows(setup: &GuildSetup, actor: &Actor) -> bool {
        let holds = |role: Option<serenity::RoleId>| role.is_some_and(|r| actor.roles.contains(&r));

        let privileged = holds(setup.admin_role_id) || holds(setup.moderator_role_id);
        privileged && setup.admin_channel_id == Some(actor.origin_channel_id)
    }
}
