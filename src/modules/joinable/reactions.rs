use super::announcement::{AnnouncementManager, MembershipAction, channel_from_embed};
use super::config::GuildConfigResolver;
use super::error::{JoinableError, Resource};
use crate::services::platform::Platform;
use crate::services::store::LinkStore;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// A reaction added to some message in a guild.
#[derive(Debug, Clone)]
pub struct ReactionEvent {
    pub guild_id: serenity::GuildId,
    pub channel_id: serenity::ChannelId,
    pub message_id: serenity::MessageId,
    pub user_id: serenity::UserId,
    pub emoji: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionOutcome {
    /// Not an event for this router.
    Ignored,
    /// Handled, but membership did not change.
    Unchanged,
    Joined(serenity::RoleId),
    Left(serenity::RoleId),
    /// Processing stopped on an error, which has been logged.
    Aborted,
}

#[derive(Debug, Clone, Copy)]
struct Target {
    channel_id: serenity::ChannelId,
    role_id: serenity::RoleId,
}

/// Turns reactions on announcements into role grants and revokes.
///
/// Reactions act as buttons: they are removed as soon as they arrive and the
/// only lasting state is the member's role list.
pub struct MembershipReactionRouter {
    resolver: Arc<GuildConfigResolver>,
    platform: Arc<dyn Platform>,
    links: Arc<dyn LinkStore>,
    announcements: AnnouncementManager,
    bot_user_id: serenity::UserId,
}

impl MembershipReactionRouter {
    pub fn new(
        resolver: Arc<GuildConfigResolver>,
        platform: Arc<dyn Platform>,
        links: Arc<dyn LinkStore>,
        bot_user_id: serenity::UserId,
    ) -> Self {
        Self {
            resolver,
            announcements: AnnouncementManager::new(platform.clone()),
            platform,
            links,
            bot_user_id,
        }
    }

    pub async fn handle(&self, event: ReactionEvent) -> ReactionOutcome {
        let setup = match self.resolver.resolve(event.guild_id).await {
            Ok(setup) => setup,
            Err(JoinableError::NotSetUp) => return ReactionOutcome::Ignored,
            Err(e) => {
                error!(
                    "Failed to load configuration for guild {}: {}",
                    event.guild_id, e
                );
                return ReactionOutcome::Aborted;
            }
        };

        if event.channel_id != setup.join_channel_id || event.user_id == self.bot_user_id {
            return ReactionOutcome::Ignored;
        }

        if let Err(e) = self
            .platform
            .remove_reaction(event.channel_id, event.message_id, &event.emoji, event.user_id)
            .await
        {
            error!(
                "Error removing reaction from user {} on message {}: {}",
                event.user_id, event.message_id, e
            );
            return ReactionOutcome::Aborted;
        }

        let Some(action) = MembershipAction::from_emoji(&event.emoji) else {
            debug!("Ignoring reaction {} on message {}", event.emoji, event.message_id);
            return ReactionOutcome::Unchanged;
        };

        match self.apply(&event, action).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(
                    "Failed to apply {:?} for user {} on message {}: {}",
                    action, event.user_id, event.message_id, e
                );
                ReactionOutcome::Aborted
            }
        }
    }

    async fn apply(
        &self,
        event: &ReactionEvent,
        action: MembershipAction,
    ) -> Result<ReactionOutcome, JoinableError> {
        let target = self.resolve_target(event).await?;
        let roles = self
            .platform
            .member_roles(event.guild_id, event.user_id)
            .await?;
        let holds_role = roles.contains(&target.role_id);

        match action {
            MembershipAction::Join if holds_role => Ok(ReactionOutcome::Unchanged),
            MembershipAction::Leave if !holds_role => Ok(ReactionOutcome::Unchanged),
            MembershipAction::Join => {
                self.platform
                    .add_role(event.guild_id, event.user_id, target.role_id)
                    .await?;
                info!(
                    "User {} joined channel {} in guild {}",
                    event.user_id, target.channel_id, event.guild_id
                );
                self.notify(target, event.user_id, action).await;
                Ok(ReactionOutcome::Joined(target.role_id))
            }
            MembershipAction::Leave => {
                self.platform
                    .remove_role(event.guild_id, event.user_id, target.role_id)
                    .await?;
                info!(
                    "User {} left channel {} in guild {}",
                    event.user_id, target.channel_id, event.guild_id
                );
                self.notify(target, event.user_id, action).await;
                Ok(ReactionOutcome::Left(target.role_id))
            }
        }
    }

    async fn notify(&self, target: Target, user_id: serenity::UserId, action: MembershipAction) {
        if let Err(e) = self
            .announcements
            .announce_membership(target.channel_id, user_id, action)
            .await
        {
            warn!(
                "Failed to post membership notice in channel {}: {}",
                target.channel_id, e
            );
        }
    }

    /// Finds the channel and role an announcement belongs to, preferring the
    /// stored link over the embed text.
    async fn resolve_target(&self, event: &ReactionEvent) -> Result<Target, JoinableError> {
        match self.links.by_message(event.guild_id, event.message_id).await {
            Ok(Some(link)) => {
                return Ok(Target {
                    channel_id: link.channel_id,
                    role_id: link.role_id,
                });
            }
            Ok(None) => {}
            Err(e) => warn!(
                "Failed to read link for message {}, falling back to embed: {}",
                event.message_id, e
            ),
        }

        let message = self
            .platform
            .get_message(event.channel_id, event.message_id)
            .await?;
        let channel_id =
            channel_from_embed(&message).ok_or(JoinableError::NotFound(Resource::ChannelMention))?;
        let channel = self.platform.get_channel(channel_id).await?;

        let role = self
            .platform
            .list_roles(event.guild_id)
            .await?
            .into_iter()
            .find(|r| r.name == channel.name)
            .ok_or(JoinableError::NotFound(Resource::Role))?;

        Ok(Target {
            channel_id: channel.id,
            role_id: role.id,
        })
    }
}
