pub mod db;
#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use sea_orm::DbErr;
use std::num::NonZeroU64;

pub use db::DbStore;

/// Per-guild configuration written by the setup command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildConfig {
    pub guild_id: serenity::GuildId,
    pub join_channel_id: Option<serenity::ChannelId>,
    pub admin_channel_id: Option<serenity::ChannelId>,
    pub joinable_category_id: Option<serenity::ChannelId>,
    pub anyone_role_id: Option<serenity::RoleId>,
    pub admin_role_id: Option<serenity::RoleId>,
    pub moderator_role_id: Option<serenity::RoleId>,
}

/// A configuration that has the fields joinable channels cannot work without.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildSetup {
    pub guild_id: serenity::GuildId,
    pub join_channel_id: serenity::ChannelId,
    pub joinable_category_id: serenity::ChannelId,
    pub admin_channel_id: Option<serenity::ChannelId>,
    pub anyone_role_id: Option<serenity::RoleId>,
    pub admin_role_id: Option<serenity::RoleId>,
    pub moderator_role_id: Option<serenity::RoleId>,
}

impl GuildConfig {
    pub fn empty(guild_id: serenity::GuildId) -> Self {
        Self {
            guild_id,
            join_channel_id: None,
            admin_channel_id: None,
            joinable_category_id: None,
            anyone_role_id: None,
            admin_role_id: None,
            moderator_role_id: None,
        }
    }

    pub fn into_setup(self) -> Option<GuildSetup> {
        Some(GuildSetup {
            guild_id: self.guild_id,
            join_channel_id: self.join_channel_id?,
            joinable_category_id: self.joinable_category_id?,
            admin_channel_id: self.admin_channel_id,
            anyone_role_id: self.anyone_role_id,
            admin_role_id: self.admin_role_id,
            moderator_role_id: self.moderator_role_id,
        })
    }
}

/// Stored link between the three resources of one joinable channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinableLink {
    pub guild_id: serenity::GuildId,
    pub channel_id: serenity::ChannelId,
    pub role_id: serenity::RoleId,
    pub message_id: Option<serenity::MessageId>,
    pub name: String,
}

#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn get(&self, guild_id: serenity::GuildId) -> Result<Option<GuildConfig>, DbErr>;

    /// Inserts or fully replaces the guild's configuration.
    async fn put(&self, config: GuildConfig) -> Result<(), DbErr>;

    async fn delete(&self, guild_id: serenity::GuildId) -> Result<(), DbErr>;
}

#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Stores the link, replacing any earlier link with the same guild and name.
    async fn record(&self, link: JoinableLink) -> Result<(), DbErr>;

    async fn by_name(
        &self,
        guild_id: serenity::GuildId,
        name: &str,
    ) -> Result<Option<JoinableLink>, DbErr>;

    async fn by_message(
        &self,
        guild_id: serenity::GuildId,
        message_id: serenity::MessageId,
    ) -> Result<Option<JoinableLink>, DbErr>;

    async fn remove(&self, guild_id: serenity::GuildId, name: &str) -> Result<(), DbErr>;
}

/// Converts a stored column back into a Discord id. Zero is never a valid id.
pub(crate) fn snowflake<T: From<NonZeroU64>>(raw: i64) -> Option<T> {
    NonZeroU64::new(raw as u64).map(T::from)
}
