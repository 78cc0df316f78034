use super::{
    ChannelRef, ChannelService, ChannelSpec, Embed, EmbedField, MemberRoleService, MessageService,
    PlatformError, PostedMessage, RoleRef, RoleService, RoleSpec,
};
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use std::sync::Arc;

/// Platform implementation backed by the serenity HTTP client.
pub struct DiscordPlatform {
    http: Arc<serenity::Http>,
}

impl DiscordPlatform {
    pub fn new(http: Arc<serenity::Http>) -> Self {
        Self { http }
    }

    fn http(&self) -> &serenity::Http {
        &self.http
    }
}

fn channel_ref(channel: serenity::GuildChannel) -> ChannelRef {
    ChannelRef {
        id: channel.id,
        name: channel.name,
        topic: channel.topic,
        parent_id: channel.parent_id,
    }
}

fn posted_message(message: serenity::Message) -> PostedMessage {
    PostedMessage {
        id: message.id,
        channel_id: message.channel_id,
        embeds: message
            .embeds
            .into_iter()
            .map(|embed| Embed {
                title: embed.title,
                description: embed.description,
                fields: embed
                    .fields
                    .into_iter()
                    .map(|field| EmbedField {
                        name: field.name,
                        value: field.value,
                        inline: field.inline,
                    })
                    .collect(),
            })
            .collect(),
    }
}

fn reaction_type(emoji: &str) -> Result<serenity::ReactionType, PlatformError> {
    serenity::ReactionType::try_from(emoji)
        .map_err(|e| PlatformError::Rejected(format!("invalid emoji `{}`: {:?}", emoji, e)))
}

#[async_trait]
impl ChannelService for DiscordPlatform {
    async fn create_channel(
        &self,
        guild_id: serenity::GuildId,
        spec: ChannelSpec,
    ) -> Result<ChannelRef, PlatformError> {
        let permissions: Vec<serenity::PermissionOverwrite> = spec
            .overwrites
            .iter()
            .map(|o| serenity::PermissionOverwrite {
                allow: o.allow,
                deny: o.deny,
                kind: serenity::PermissionOverwriteType::Role(o.role_id),
            })
            .collect();

        let builder = serenity::CreateChannel::new(spec.name)
            .kind(serenity::ChannelType::Text)
            .topic(spec.topic)
            .category(spec.parent_id)
            .permissions(permissions);

        let channel = guild_id.create_channel(self.http(), builder).await?;
        Ok(channel_ref(channel))
    }

    async fn delete_channel(&self, channel_id: serenity::ChannelId) -> Result<(), PlatformError> {
        channel_id.delete(self.http()).await?;
        Ok(())
    }

    async fn list_channels(
        &self,
        guild_id: serenity::GuildId,
    ) -> Result<Vec<ChannelRef>, PlatformError> {
        let channels = guild_id.channels(self.http()).await?;
        Ok(channels.into_values().map(channel_ref).collect())
    }

    async fn get_channel(
        &self,
        channel_id: serenity::ChannelId,
    ) -> Result<ChannelRef, PlatformError> {
        let channel = channel_id.to_channel(self.http()).await?;
        channel.guild().map(channel_ref).ok_or_else(|| {
            PlatformError::Rejected(format!("channel {} is not a guild channel", channel_id))
        })
    }
}

#[async_trait]
impl RoleService for DiscordPlatform {
    async fn create_role(
        &self,
        guild_id: serenity::GuildId,
        spec: RoleSpec,
    ) -> Result<RoleRef, PlatformError> {
        let builder = serenity::EditRole::new()
            .name(spec.name)
            .hoist(spec.hoist)
            .mentionable(spec.mentionable);

        let role = guild_id.create_role(self.http(), builder).await?;
        Ok(RoleRef {
            id: role.id,
            name: role.name,
        })
    }

    async fn delete_role(
        &self,
        guild_id: serenity::GuildId,
        role_id: serenity::RoleId,
    ) -> Result<(), PlatformError> {
        guild_id.delete_role(self.http(), role_id).await?;
        Ok(())
    }

    async fn list_roles(&self, guild_id: serenity::GuildId) -> Result<Vec<RoleRef>, PlatformError> {
        let roles = guild_id.roles(self.http()).await?;
        Ok(roles
            .into_values()
            .map(|role| RoleRef {
                id: role.id,
                name: role.name,
            })
            .collect())
    }
}

#[async_trait]
impl MessageService for DiscordPlatform {
    async fn send_embed(
        &self,
        channel_id: serenity::ChannelId,
        embed: Embed,
    ) -> Result<PostedMessage, PlatformError> {
        let mut builder = serenity::CreateEmbed::new();
        if let Some(title) = embed.title {
            builder = builder.title(title);
        }
        if let Some(description) = embed.description {
            builder = builder.description(description);
        }
        for field in embed.fields {
            builder = builder.field(field.name, field.value, field.inline);
        }

        let message = channel_id
            .send_message(self.http(), serenity::CreateMessage::new().embed(builder))
            .await?;
        Ok(posted_message(message))
    }

    async fn send_text(
        &self,
        channel_id: serenity::ChannelId,
        content: String,
    ) -> Result<(), PlatformError> {
        channel_id.say(self.http(), content).await?;
        Ok(())
    }

    async fn add_reaction(
        &self,
        channel_id: serenity::ChannelId,
        message_id: serenity::MessageId,
        emoji: &str,
    ) -> Result<(), PlatformError> {
        channel_id
            .create_reaction(self.http(), message_id, reaction_type(emoji)?)
            .await?;
        Ok(())
    }

    async fn remove_reaction(
        &self,
        channel_id: serenity::ChannelId,
        message_id: serenity::MessageId,
        emoji: &str,
        user_id: serenity::UserId,
    ) -> Result<(), PlatformError> {
        channel_id
            .delete_reaction(self.http(), message_id, Some(user_id), reaction_type(emoji)?)
            .await?;
        Ok(())
    }

    async fn list_before(
        &self,
        channel_id: serenity::ChannelId,
        before: Option<serenity::MessageId>,
        page_size: u8,
    ) -> Result<Vec<PostedMessage>, PlatformError> {
        let mut query = serenity::GetMessages::new().limit(page_size);
        if let Some(cursor) = before {
            query = query.before(cursor);
        }

        let messages = channel_id.messages(self.http(), query).await?;
        Ok(messages.into_iter().map(posted_message).collect())
    }

    async fn get_message(
        &self,
        channel_id: serenity::ChannelId,
        message_id: serenity::MessageId,
    ) -> Result<PostedMessage, PlatformError> {
        let message = channel_id.message(self.http(), message_id).await?;
        Ok(posted_message(message))
    }

    async fn delete_message(
        &self,
        channel_id: serenity::ChannelId,
        message_id: serenity::MessageId,
    ) -> Result<(), PlatformError> {
        channel_id.delete_message(self.http(), message_id).await?;
        Ok(())
    }
}

#[async_trait]
impl MemberRoleService for DiscordPlatform {
    async fn add_role(
        &self,
        guild_id: serenity::GuildId,
        user_id: serenity::UserId,
        role_id: serenity::RoleId,
    ) -> Result<(), PlatformError> {
        self.http()
            .add_member_role(guild_id, user_id, role_id, Some("Joined via reaction"))
            .await?;
        Ok(())
    }

    async fn remove_role(
        &self,
        guild_id: serenity::GuildId,
        user_id: serenity::UserId,
        role_id: serenity::RoleId,
    ) -> Result<(), PlatformError> {
        self.http()
            .remove_member_role(guild_id, user_id, role_id, Some("Left via reaction"))
            .await?;
        Ok(())
    }

    async fn member_roles(
        &self,
        guild_id: serenity::GuildId,
        user_id: serenity::UserId,
    ) -> Result<Vec<serenity::RoleId>, PlatformError> {
        let member = guild_id.member(self.http(), user_id).await?;
        Ok(member.roles)
    }
}
