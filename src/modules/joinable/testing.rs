//! Shared fixture for the joinable channel tests.

use super::authorization::Actor;
use super::config::GuildConfigResolver;
use super::provisioner::ChannelProvisioner;
use super::reactions::{MembershipReactionRouter, ReactionEvent};
use crate::services::platform::memory::MemoryGuild;
use crate::services::store::GuildConfig;
use crate::services::store::memory::MemoryStore;
use poise::serenity_prelude as serenity;
use std::sync::Arc;

pub struct Fixture {
    pub guild_id: serenity::GuildId,
    pub bot_user: serenity::UserId,
    pub guild: Arc<MemoryGuild>,
    pub store: Arc<MemoryStore>,
    pub provisioner: ChannelProvisioner,
    pub router: MembershipReactionRouter,

    pub join_channel: serenity::ChannelId,
    pub admin_channel: serenity::ChannelId,
    pub category: serenity::ChannelId,
    pub anyone_role: serenity::RoleId,
    pub admin_role: serenity::RoleId,
    pub moderator_role: serenity::RoleId,

    pub initial_roles: usize,
    pub initial_channels: usize,
}

impl Fixture {
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Same guild layout, but the store holds `config` instead of a complete setup.
    pub fn with_config(config: GuildConfig) -> Self {
        Self::build(Some(config))
    }

    fn build(config: Option<GuildConfig>) -> Self {
        let guild_id = serenity::GuildId::new(1);
        let guild = Arc::new(MemoryGuild::new());

        let join_channel = guild.add_channel("join-here");
        let admin_channel = guild.add_channel("admin");
        let category = guild.add_channel("joinables");
        let anyone_role = guild.add_role("@everyone");
        let admin_role = guild.add_role("admin");
        let moderator_role = guild.add_role("moderator");

        let config = config.unwrap_or(GuildConfig {
            guild_id,
            join_channel_id: Some(join_channel),
            admin_channel_id: Some(admin_channel),
            joinable_category_id: Some(category),
            anyone_role_id: Some(anyone_role),
            admin_role_id: Some(admin_role),
            moderator_role_id: Some(moderator_role),
        });

        let store = Arc::new(MemoryStore::with_config(config));
        let resolver = Arc::new(GuildConfigResolver::new(store.clone()));
        let bot_user = serenity::UserId::new(7);

        let provisioner = ChannelProvisioner::new(resolver.clone(), guild.clone(), store.clone());
        let router =
            MembershipReactionRouter::new(resolver, guild.clone(), store.clone(), bot_user);

        let (initial_roles, initial_channels) =
            guild.with_state(|s| (s.roles.len(), s.channels.len()));

        Self {
            guild_id,
            bot_user,
            guild,
            store,
            provisioner,
            router,
            join_channel,
            admin_channel,
            category,
            anyone_role,
            admin_role,
            moderator_role,
            initial_roles,
            initial_channels,
        }
    }

    pub fn actor(&self, roles: &[serenity::RoleId], origin: serenity::ChannelId) -> Actor {
        Actor {
            user_id: serenity::UserId::new(500),
            roles: roles.to_vec(),
            origin_channel_id: origin,
        }
    }

    pub fn admin(&self) -> Actor {
        self.actor(&[self.admin_role], self.admin_channel)
    }

    pub fn reaction(
        &self,
        message_id: serenity::MessageId,
        user_id: serenity::UserId,
        emoji: &str,
    ) -> ReactionEvent {
        ReactionEvent {
            guild_id: self.guild_id,
            channel_id: self.join_channel,
            message_id,
            user_id,
            emoji: emoji.to_string(),
        }
    }

    /// The id of the newest announcement in the join channel.
    pub fn latest_announcement(&self) -> serenity::MessageId {
        self.guild.with_state(|s| {
            s.messages
                .iter()
                .filter(|m| m.channel_id == self.join_channel && !m.embeds.is_empty())
                .map(|m| m.id)
                .max()
                .expect("an announcement was posted")
        })
    }
}
