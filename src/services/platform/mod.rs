//! Chat platform collaborators.
//!
//! Everything the joinable-channel services need from Discord goes through the
//! traits in this module, so the provisioning and reaction logic can run against
//! the real HTTP client or an in-memory guild.

pub mod discord;
#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use thiserror::Error;

pub use discord::DiscordPlatform;

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error(transparent)]
    Discord(#[from] serenity::Error),
    #[error("{0}")]
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRef {
    pub id: serenity::ChannelId,
    pub name: String,
    pub topic: Option<String>,
    pub parent_id: Option<serenity::ChannelId>,
}

impl ChannelRef {
    pub fn mention(&self) -> String {
        format!("<#{}>", self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleRef {
    pub id: serenity::RoleId,
    pub name: String,
}

/// A role-scoped permission overwrite on a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overwrite {
    pub role_id: serenity::RoleId,
    pub allow: serenity::Permissions,
    pub deny: serenity::Permissions,
}

#[derive(Debug, Clone)]
pub struct ChannelSpec {
    pub name: String,
    pub topic: String,
    pub parent_id: serenity::ChannelId,
    pub overwrites: Vec<Overwrite>,
}

#[derive(Debug, Clone)]
pub struct RoleSpec {
    pub name: String,
    pub hoist: bool,
    pub mentionable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Embed {
    pub title: Option<String>,
    pub description: Option<String>,
    pub fields: Vec<EmbedField>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedMessage {
    pub id: serenity::MessageId,
    pub channel_id: serenity::ChannelId,
    pub embeds: Vec<Embed>,
}

#[async_trait]
pub trait ChannelService: Send + Sync {
    async fn create_channel(
        &self,
        guild_id: serenity::GuildId,
        spec: ChannelSpec,
    ) -> Result<ChannelRef, PlatformError>;

    async fn delete_channel(&self, channel_id: serenity::ChannelId) -> Result<(), PlatformError>;

    async fn list_channels(
        &self,
        guild_id: serenity::GuildId,
    ) -> Result<Vec<ChannelRef>, PlatformError>;

    async fn get_channel(&self, channel_id: serenity::ChannelId)
    -> Result<ChannelRef, PlatformError>;
}

#[async_trait]
pub trait RoleService: Send + Sync {
    async fn create_role(
        &self,
        guild_id: serenity::GuildId,
        spec: RoleSpec,
    ) -> Result<RoleRef, PlatformError>;

    async fn delete_role(
        &self,
        guild_id: serenity::GuildId,
        role_id: serenity::RoleId,
    ) -> Result<(), PlatformError>;

    async fn list_roles(&self, guild_id: serenity::GuildId) -> Result<Vec<RoleRef>, PlatformError>;
}

#[async_trait]
pub trait MessageService: Send + Sync {
    async fn send_embed(
        &self,
        channel_id: serenity::ChannelId,
        embed: Embed,
    ) -> Result<PostedMessage, PlatformError>;

    async fn send_text(
        &self,
        channel_id: serenity::ChannelId,
        content: String,
    ) -> Result<(), PlatformError>;

    async fn add_reaction(
        &self,
        channel_id: serenity::ChannelId,
        message_id: serenity::MessageId,
        emoji: &str,
    ) -> Result<(), PlatformError>;

    async fn remove_reaction(
        &self,
        channel_id: serenity::ChannelId,
        message_id: serenity::MessageId,
        emoji: &str,
        user_id: serenity::UserId,
    ) -> Result<(), PlatformError>;

    /// Returns up to `page_size` messages older than `before`, newest first.
    async fn list_before(
        &self,
        channel_id: serenity::ChannelId,
        before: Option<serenity::MessageId>,
        page_size: u8,
    ) -> Result<Vec<PostedMessage>, PlatformError>;

    async fn get_message(
        &self,
        channel_id: serenity::ChannelId,
        message_id: serenity::MessageId,
    ) -> Result<PostedMessage, PlatformError>;

    async fn delete_message(
        &self,
        channel_id: serenity::ChannelId,
        message_id: serenity::MessageId,
    ) -> Result<(), PlatformError>;
}

#[async_trait]
pub trait MemberRoleService: Send + Sync {
    async fn add_role(
        &self,
        guild_id: serenity::GuildId,
        user_id: serenity::UserId,
        role_id: serenity::RoleId,
    ) -> Result<(), PlatformError>;

    async fn remove_role(
        &self,
        guild_id: serenity::GuildId,
        user_id: serenity::UserId,
        role_id: serenity::RoleId,
    ) -> Result<(), PlatformError>;

    async fn member_roles(
        &self,
        guild_id: serenity::GuildId,
        user_id: serenity::UserId,
    ) -> Result<Vec<serenity::RoleId>, PlatformError>;
}

/// The full set of platform operations, usable as a single trait object.
pub trait Platform: ChannelService + RoleService + MessageService + MemberRoleService {}

impl<T> Platform for T where T: ChannelService + RoleService + MessageService + MemberRoleService {}
