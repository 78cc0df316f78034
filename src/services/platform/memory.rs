//! In-memory guild used by unit tests.

use super::{
    ChannelRef, ChannelService, ChannelSpec, Embed, MemberRoleService, MessageService, Overwrite,
    PlatformError, PostedMessage, RoleRef, RoleService, RoleSpec,
};
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub struct StoredChannel {
    pub channel: ChannelRef,
    pub overwrites: Vec<Overwrite>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredReaction {
    pub message_id: serenity::MessageId,
    pub emoji: String,
    pub user_id: Option<serenity::UserId>,
}

#[derive(Debug, Default)]
pub struct GuildState {
    next_id: u64,
    pub roles: Vec<RoleRef>,
    pub channels: Vec<StoredChannel>,
    pub messages: Vec<PostedMessage>,
    pub reactions: Vec<StoredReaction>,
    pub member_roles: HashMap<serenity::UserId, Vec<serenity::RoleId>>,
    pub texts: Vec<(serenity::ChannelId, String)>,
    pub role_grants: usize,
    pub role_revokes: usize,
    pub list_calls: usize,

    pub fail_channel_create: bool,
    pub fail_role_delete: bool,
    pub fail_add_reaction: bool,
    pub fail_remove_reaction: bool,
}

/// A single fake guild. Ids are allocated from one increasing counter, so a
/// later message always has a larger id than an earlier one.
pub struct MemoryGuild {
    pub state: Mutex<GuildState>,
}

impl MemoryGuild {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(GuildState {
                next_id: 1000,
                ..Default::default()
            }),
        }
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&mut GuildState) -> R) -> R {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }

    pub fn add_channel(&self, name: &str) -> serenity::ChannelId {
        self.with_state(|s| {
            let id = serenity::ChannelId::new(s.allocate());
            s.channels.push(StoredChannel {
                channel: ChannelRef {
                    id,
                    name: name.to_string(),
                    topic: None,
                    parent_id: None,
                },
                overwrites: vec![],
            });
            id
        })
    }

    pub fn add_role(&self, name: &str) -> serenity::RoleId {
        self.with_state(|s| {
            let id = serenity::RoleId::new(s.allocate());
            s.roles.push(RoleRef {
                id,
                name: name.to_string(),
            });
            id
        })
    }

    /// Posts a plain message without embeds.
    pub fn add_message(&self, channel_id: serenity::ChannelId) -> serenity::MessageId {
        self.with_state(|s| {
            let id = serenity::MessageId::new(s.allocate());
            s.messages.push(PostedMessage {
                id,
                channel_id,
                embeds: vec![],
            });
            id
        })
    }

    pub fn messages_in(&self, channel_id: serenity::ChannelId) -> usize {
        self.with_state(|s| {
            s.messages
                .iter()
                .filter(|m| m.channel_id == channel_id)
                .count()
        })
    }

    pub fn role_named(&self, name: &str) -> Option<RoleRef> {
        self.with_state(|s| s.roles.iter().find(|r| r.name == name).cloned())
    }

    pub fn channel_named(&self, name: &str) -> Option<StoredChannel> {
        self.with_state(|s| s.channels.iter().find(|c| c.channel.name == name).cloned())
    }
}

impl GuildState {
    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

fn rejected(what: &str) -> PlatformError {
    PlatformError::Rejected(what.to_string())
}

#[async_trait]
impl ChannelService for MemoryGuild {
    async fn create_channel(
        &self,
        _guild_id: serenity::GuildId,
        spec: ChannelSpec,
    ) -> Result<ChannelRef, PlatformError> {
        self.with_state(|s| {
            if s.fail_channel_create {
                return Err(rejected("channel creation refused"));
            }
            let channel = ChannelRef {
                id: serenity::ChannelId::new(s.allocate()),
                name: spec.name,
                topic: Some(spec.topic),
                parent_id: Some(spec.parent_id),
            };
            s.channels.push(StoredChannel {
                channel: channel.clone(),
                overwrites: spec.overwrites,
            });
            Ok(channel)
        })
    }

    async fn delete_channel(&self, channel_id: serenity::ChannelId) -> Result<(), PlatformError> {
        self.with_state(|s| {
            let before = s.channels.len();
            s.channels.retain(|c| c.channel.id != channel_id);
            if s.channels.len() == before {
                return Err(rejected("unknown channel"));
            }
            Ok(())
        })
    }

    async fn list_channels(
        &self,
        _guild_id: serenity::GuildId,
    ) -> Result<Vec<ChannelRef>, PlatformError> {
        Ok(self.with_state(|s| s.channels.iter().map(|c| c.channel.clone()).collect()))
    }

    async fn get_channel(
        &self,
        channel_id: serenity::ChannelId,
    ) -> Result<ChannelRef, PlatformError> {
        self.with_state(|s| {
            s.channels
                .iter()
                .find(|c| c.channel.id == channel_id)
                .map(|c| c.channel.clone())
                .ok_or_else(|| rejected("unknown channel"))
        })
    }
}

#[async_trait]
impl RoleService for MemoryGuild {
    async fn create_role(
        &self,
        _guild_id: serenity::GuildId,
        spec: RoleSpec,
    ) -> Result<RoleRef, PlatformError> {
        Ok(self.with_state(|s| {
            let role = RoleRef {
                id: serenity::RoleId::new(s.allocate()),
                name: spec.name,
            };
            s.roles.push(role.clone());
            role
        }))
    }

    async fn delete_role(
        &self,
        _guild_id: serenity::GuildId,
        role_id: serenity::RoleId,
    ) -> Result<(), PlatformError> {
        self.with_state(|s| {
            if s.fail_role_delete {
                return Err(rejected("role deletion refused"));
            }
            let before = s.roles.len();
            s.roles.retain(|r| r.id != role_id);
            if s.roles.len() == before {
                return Err(rejected("unknown role"));
            }
            Ok(())
        })
    }

    async fn list_roles(&self, _guild_id: serenity::GuildId) -> Result<Vec<RoleRef>, PlatformError> {
        Ok(self.with_state(|s| s.roles.clone()))
    }
}

#[async_trait]
impl MessageService for MemoryGuild {
    async fn send_embed(
        &self,
        channel_id: serenity::ChannelId,
        embed: Embed,
    ) -> Result<PostedMessage, PlatformError> {
        Ok(self.with_state(|s| {
            let message = PostedMessage {
                id: serenity::MessageId::new(s.allocate()),
                channel_id,
                embeds: vec![embed],
            };
            s.messages.push(message.clone());
            message
        }))
    }

    async fn send_text(
        &self,
        channel_id: serenity::ChannelId,
        content: String,
    ) -> Result<(), PlatformError> {
        self.with_state(|s| s.texts.push((channel_id, content)));
        Ok(())
    }

    async fn add_reaction(
        &self,
        _channel_id: serenity::ChannelId,
        message_id: serenity::MessageId,
        emoji: &str,
    ) -> Result<(), PlatformError> {
        self.with_state(|s| {
            if s.fail_add_reaction {
                return Err(rejected("reaction refused"));
            }
            s.reactions.push(StoredReaction {
                message_id,
                emoji: emoji.to_string(),
                user_id: None,
            });
            Ok(())
        })
    }

    async fn remove_reaction(
        &self,
        _channel_id: serenity::ChannelId,
        message_id: serenity::MessageId,
        emoji: &str,
        user_id: serenity::UserId,
    ) -> Result<(), PlatformError> {
        self.with_state(|s| {
            if s.fail_remove_reaction {
                return Err(rejected("reaction removal refused"));
            }
            s.reactions.retain(|r| {
                !(r.message_id == message_id && r.emoji == emoji && r.user_id == Some(user_id))
            });
            Ok(())
        })
    }

    async fn list_before(
        &self,
        channel_id: serenity::ChannelId,
        before: Option<serenity::MessageId>,
        page_size: u8,
    ) -> Result<Vec<PostedMessage>, PlatformError> {
        Ok(self.with_state(|s| {
            s.list_calls += 1;
            let mut page: Vec<PostedMessage> = s
                .messages
                .iter()
                .filter(|m| m.channel_id == channel_id)
                .filter(|m| before.is_none_or(|cursor| m.id < cursor))
                .cloned()
                .collect();
            page.sort_by(|a, b| b.id.cmp(&a.id));
            page.truncate(page_size as usize);
            page
        }))
    }

    async fn get_message(
        &self,
        channel_id: serenity::ChannelId,
        message_id: serenity::MessageId,
    ) -> Result<PostedMessage, PlatformError> {
        self.with_state(|s| {
            s.messages
                .iter()
                .find(|m| m.channel_id == channel_id && m.id == message_id)
                .cloned()
                .ok_or_else(|| rejected("unknown message"))
        })
    }

    async fn delete_message(
        &self,
        channel_id: serenity::ChannelId,
        message_id: serenity::MessageId,
    ) -> Result<(), PlatformError> {
        self.with_state(|s| {
            let before = s.messages.len();
            s.messages
                .retain(|m| !(m.channel_id == channel_id && m.id == message_id));
            if s.messages.len() == before {
                return Err(rejected("unknown message"));
            }
            s.reactions.retain(|r| r.message_id != message_id);
            Ok(())
        })
    }
}

#[async_trait]
impl MemberRoleService for MemoryGuild {
    async fn add_role(
        &self,
        _guild_id: serenity::GuildId,
        user_id: serenity::UserId,
        role_id: serenity::RoleId,
    ) -> Result<(), PlatformError> {
        self.with_state(|s| {
            s.role_grants += 1;
            let roles = s.member_roles.entry(user_id).or_default();
            if !roles.contains(&role_id) {
                roles.push(role_id);
            }
        });
        Ok(())
    }

    async fn remove_role(
        &self,
        _guild_id: serenity::GuildId,
        user_id: serenity::UserId,
        role_id: serenity::RoleId,
    ) -> Result<(), PlatformError> {
        self.with_state(|s| {
            s.role_revokes += 1;
            if let Some(roles) = s.member_roles.get_mut(&user_id) {
                roles.retain(|r| *r != role_id);
            }
        });
        Ok(())
    }

    async fn member_roles(
        &self,
        _guild_id: serenity::GuildId,
        user_id: serenity::UserId,
    ) -> Result<Vec<serenity::RoleId>, PlatformError> {
        Ok(self.with_state(|s| s.member_roles.get(&user_id).cloned().unwrap_or_default()))
    }
}
