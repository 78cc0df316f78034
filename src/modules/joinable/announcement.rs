use super::error::{JoinableError, Resource};
use crate::services::platform::{
    ChannelRef, Embed, EmbedField, Platform, PlatformError, PostedMessage,
};
use poise::serenity_prelude as serenity;
use regex::Regex;
use std::num::NonZeroU64;
use std::sync::{Arc, LazyLock};
use thiserror::Error;
use tracing::debug;

pub const JOIN_EMOJI: &str = "▶️";
pub const LEAVE_EMOJI: &str = "🚮";

/// Discord's maximum page size for message history.
pub const PAGE_SIZE: u8 = 100;

// The quoted name must start with an ASCII word character.
static TITLE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""((?-u:\w).*)"$"#).expect("title pattern is valid"));
static MENTION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<#([0-9]+)>").expect("mention pattern is valid"));

/// The announcement failed after the message may already have been posted.
#[derive(Debug, Error)]
#[error("failed to announce joinable channel: {source}")]
pub struct AnnounceError {
    pub message_id: Option<serenity::MessageId>,
    #[source]
    pub source: PlatformError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipAction {
    Join,
    Leave,
}

impl MembershipAction {
    pub fn from_emoji(emoji: &str) -> Option<Self> {
        // Clients disagree on whether the variation selector is sent.
        match emoji.trim_end_matches('\u{fe0f}') {
            "▶" => Some(MembershipAction::Join),
            "🚮" => Some(MembershipAction::Leave),
            _ => None,
        }
    }
}

pub fn join_embed_title(name: &str) -> String {
    format!("Joinable channel \"{}\"", name)
}

pub fn render_join_embed(channel: &ChannelRef) -> Embed {
    Embed {
        title: Some(join_embed_title(&channel.name)),
        description: channel.topic.clone(),
        fields: vec![
            EmbedField {
                name: "Channel link".to_string(),
                value: channel.mention(),
                inline: false,
            },
            EmbedField {
                name: "Use the reactions below to join or leave the channel".to_string(),
                value: format!("{} join · {} leave", JOIN_EMOJI, LEAVE_EMOJI),
                inline: false,
            },
        ],
    }
}

/// Finds the first message carrying an embed titled for `name`.
pub fn find_by_name<'a>(
    messages: &'a [PostedMessage],
    name: &str,
) -> Result<&'a PostedMessage, JoinableError> {
    messages
        .iter()
        .find(|message| {
            message.embeds.iter().any(|embed| {
                embed
                    .title
                    .as_deref()
                    .and_then(|title| TITLE_PATTERN.captures(title))
                    .is_some_and(|caps| &caps[1] == name)
            })
        })
        .ok_or(JoinableError::NotFound(Resource::Announcement))
}

/// Reads the channel mention out of the first field of the first embed.
pub fn channel_from_embed(message: &PostedMessage) -> Option<serenity::ChannelId> {
    let field = message.embeds.first()?.fields.first()?;
    let caps = MENTION_PATTERN.captures(&field.value)?;
    let raw: u64 = caps[1].parse().ok()?;
    NonZeroU64::new(raw).map(serenity::ChannelId::from)
}

/// Renders and removes announcements in a guild's join channel.
#[derive(Clone)]
pub struct AnnouncementManager {
    platform: Arc<dyn Platform>,
}

impl AnnouncementManager {
    pub fn new(platform: Arc<dyn Platform>) -> Self {
        Self { platform }
    }

    /// Posts the join embed and its two reactions, join first. A failed
    /// reaction leaves the message in place.
    pub async fn post_join_embed(
        &self,
        join_channel_id: serenity::ChannelId,
        channel: &ChannelRef,
    ) -> Result<serenity::MessageId, AnnounceError> {
        let message = self
            .platform
            .send_embed(join_channel_id, render_join_embed(channel))
            .await
            .map_err(|source| AnnounceError {
                message_id: None,
                source,
            })?;

        for emoji in [JOIN_EMOJI, LEAVE_EMOJI] {
            self.platform
                .add_reaction(join_channel_id, message.id, emoji)
                .await
                .map_err(|source| AnnounceError {
                    message_id: Some(message.id),
                    source,
                })?;
        }

        Ok(message.id)
    }

    /// Walks the whole history of the join channel, newest first.
    pub async fn list_join_channel(
        &self,
        join_channel_id: serenity::ChannelId,
    ) -> Result<Vec<PostedMessage>, PlatformError> {
        let mut history = Vec::new();
        let mut cursor = None;

        loop {
            let page = self
                .platform
                .list_before(join_channel_id, cursor, PAGE_SIZE)
                .await?;
            let full = page.len() == PAGE_SIZE as usize;
            cursor = page.last().map(|m| m.id);
            history.extend(page);

            if !full {
                break;
            }
        }

        debug!(
            "Fetched {} messages from join channel {}",
            history.len(),
            join_channel_id
        );
        Ok(history)
    }

    pub async fn find_announcement(
        &self,
        join_channel_id: serenity::ChannelId,
        name: &str,
    ) -> Result<serenity::MessageId, JoinableError> {
        let history = self.list_join_channel(join_channel_id).await?;
        find_by_name(&history, name).map(|message| message.id)
    }

    pub async fn remove(
        &self,
        join_channel_id: serenity::ChannelId,
        message_id: serenity::MessageId,
    ) -> Result<(), PlatformError> {
        self.platform
            .delete_message(join_channel_id, message_id)
            .await
    }

    pub async fn announce_membership(
        &self,
        channel_id: serenity::ChannelId,
        user_id: serenity::UserId,
        action: MembershipAction,
    ) -> Result<(), PlatformError> {
        let content = match action {
            MembershipAction::Join => format!("{} User <@{}> joined the channel!", JOIN_EMOJI, user_id),
            MembershipAction::Leave => format!("{} User <@{}> left the channel!", LEAVE_EMOJI, user_id),
        };
        self.platform.send_text(channel_id, content).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::platform::memory::MemoryGuild;

    fn channel(id: u64, name: &str) -> ChannelRef {
        ChannelRef {
            id: serenity::ChannelId::new(id),
            name: name.to_string(),
            topic: Some("talk about things".to_string()),
            parent_id: None,
        }
    }

    fn announcement(id: u64, embed: Embed) -> PostedMessage {
        PostedMessage {
            id: serenity::MessageId::new(id),
            channel_id: serenity::ChannelId::new(1),
            embeds: vec![embed],
        }
    }

    #[test]
    fn embed_carries_title_topic_and_mention() {
        let embed = render_join_embed(&channel(55, "team-x"));
        assert_eq!(embed.title.as_deref(), Some("Joinable channel \"team-x\""));
        assert_eq!(embed.description.as_deref(), Some("talk about things"));
        assert_eq!(embed.fields.len(), 2);
        assert_eq!(embed.fields[0].value, "<#55>");
    }

    #[test]
    fn find_by_name_matches_the_quoted_title_exactly() {
        let messages = vec![
            PostedMessage {
                id: serenity::MessageId::new(1),
                channel_id: serenity::ChannelId::new(1),
                embeds: vec![],
            },
            announcement(2, render_join_embed(&channel(10, "team-xy"))),
            announcement(3, render_join_embed(&channel(11, "team-x"))),
        ];

        assert_eq!(
            find_by_name(&messages, "team-x").unwrap().id,
            serenity::MessageId::new(3)
        );
        assert!(matches!(
            find_by_name(&messages, "team"),
            Err(JoinableError::NotFound(Resource::Announcement))
        ));
    }

    #[test]
    fn titled_names_must_start_with_an_ascii_word_character() {
        let messages = vec![
            announcement(1, render_join_embed(&channel(10, "écoute"))),
            announcement(2, render_join_embed(&channel(11, "café-talk"))),
        ];

        assert!(find_by_name(&messages, "écoute").is_err());
        assert_eq!(
            find_by_name(&messages, "café-talk").unwrap().id,
            serenity::MessageId::new(2)
        );
    }

    #[test]
    fn channel_mention_is_recovered_from_the_first_field() {
        let message = announcement(1, render_join_embed(&channel(77, "games")));
        assert_eq!(
            channel_from_embed(&message),
            Some(serenity::ChannelId::new(77))
        );

        let mut broken = render_join_embed(&channel(77, "games"));
        broken.fields[0].value = "see #games".to_string();
        assert_eq!(channel_from_embed(&announcement(2, broken)), None);
        assert_eq!(channel_from_embed(&announcement(3, Embed::default())), None);
    }

    #[test]
    fn emoji_maps_to_actions() {
        assert_eq!(MembershipAction::from_emoji("▶️"), Some(MembershipAction::Join));
        assert_eq!(MembershipAction::from_emoji("▶"), Some(MembershipAction::Join));
        assert_eq!(MembershipAction::from_emoji("🚮"), Some(MembershipAction::Leave));
        assert_eq!(MembershipAction::from_emoji("👍"), None);
    }

    #[tokio::test]
    async fn history_is_paginated_until_a_short_page() {
        let guild = Arc::new(MemoryGuild::new());
        let join = guild.add_channel("join-here");
        for _ in 0..250 {
            guild.add_message(join);
        }

        let manager = AnnouncementManager::new(guild.clone());
        let history = manager.list_join_channel(join).await.unwrap();

        assert_eq!(history.len(), 250);
        assert_eq!(guild.with_state(|s| s.list_calls), 3);
        assert!(history.windows(2).all(|w| w[0].id > w[1].id));
    }

    #[tokio::test]
    async fn exact_page_multiple_needs_one_empty_page() {
        let guild = Arc::new(MemoryGuild::new());
        let join = guild.add_channel("join-here");
        for _ in 0..200 {
            guild.add_message(join);
        }

        let manager = AnnouncementManager::new(guild.clone());
        assert_eq!(manager.list_join_channel(join).await.unwrap().len(), 200);
        assert_eq!(guild.with_state(|s| s.list_calls), 3);
    }

    #[tokio::test]
    async fn failed_reaction_keeps_the_message() {
        let guild = Arc::new(MemoryGuild::new());
        let join = guild.add_channel("join-here");
        guild.with_state(|s| s.fail_add_reaction = true);

        let manager = AnnouncementManager::new(guild.clone());
        let err = manager
            .post_join_embed(join, &channel(5, "team-x"))
            .await
            .unwrap_err();

        assert!(err.message_id.is_some());
        assert_eq!(guild.messages_in(join), 1);
    }
}
