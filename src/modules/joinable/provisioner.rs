use super::announcement::AnnouncementManager;
use super::authorization::{Actor, AuthorizationGate};
use super::config::GuildConfigResolver;
use super::error::{JoinableError, Resource};
use super::saga::Saga;
use crate::services::platform::{ChannelRef, ChannelSpec, Overwrite, Platform, RoleSpec};
use crate::services::store::{GuildSetup, JoinableLink, LinkStore};
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub const MIN_LENGTH: usize = 2;
pub const MAX_LENGTH: usize = 100;

/// Channel names are lower-case and use hyphens instead of spaces.
pub fn normalize_name(raw: &str) -> String {
    raw.to_lowercase().replace(' ', "-")
}

fn check_length(value: &str) -> Result<(), usize> {
    let len = value.chars().count();
    if (MIN_LENGTH..=MAX_LENGTH).contains(&len) {
        Ok(())
    } else {
        Err(len)
    }
}

fn member_access() -> serenity::Permissions {
    serenity::Permissions::VIEW_CHANNEL
        | serenity::Permissions::SEND_MESSAGES
        | serenity::Permissions::READ_MESSAGE_HISTORY
}

/// Overwrites for a new joinable channel: its own role may talk, the anyone
/// role may not see it, and staff keep full access.
pub fn joinable_overwrites(setup: &GuildSetup, role_id: serenity::RoleId) -> Vec<Overwrite> {
    let staff_access = member_access() | serenity::Permissions::MANAGE_MESSAGES;

    let mut overwrites = vec![Overwrite {
        role_id,
        allow: member_access(),
        deny: serenity::Permissions::empty(),
    }];

    if let Some(anyone) = setup.anyone_role_id {
        overwrites.push(Overwrite {
            role_id: anyone,
            allow: serenity::Permissions::empty(),
            deny: serenity::Permissions::VIEW_CHANNEL,
        });
    }

    for staff in [setup.admin_role_id, setup.moderator_role_id]
        .into_iter()
        .flatten()
    {
        overwrites.push(Overwrite {
            role_id: staff,
            allow: staff_access,
            deny: serenity::Permissions::empty(),
        });
    }

    overwrites
}

/// What a deletion left behind. Warnings are failures of the steps that run
/// before the channel itself is deleted.
#[derive(Debug, Default)]
pub struct DeleteReport {
    pub warnings: Vec<JoinableError>,
}

impl DeleteReport {
    fn warn(&mut self, step: &str, err: JoinableError) {
        warn!("delete joinable channel: {} failed: {}", step, err);
        self.warnings.push(err);
    }
}

/// Creates and deletes the role, channel and announcement of joinable channels.
pub struct ChannelProvisioner {
    resolver: Arc<GuildConfigResolver>,
    platform: Arc<dyn Platform>,
    links: Arc<dyn LinkStore>,
    announcements: AnnouncementManager,
}

impl ChannelProvisioner {
    pub fn new(
        resolver: Arc<GuildConfigResolver>,
        platform: Arc<dyn Platform>,
        links: Arc<dyn LinkStore>,
    ) -> Self {
        Self {
            resolver,
            announcements: AnnouncementManager::new(platform.clone()),
            platform,
            links,
        }
    }

    async fn authorize(
        &self,
        guild_id: serenity::GuildId,
        actor: &Actor,
    ) -> Result<GuildSetup, JoinableError> {
        let setup = self.resolver.resolve(guild_id).await?;
        if !AuthorizationGate::allows(&setup, actor) {
            info!(
                "User {} denied joinable channel management in guild {}",
                actor.user_id, guild_id
            );
            return Err(JoinableError::Unauthorized);
        }
        Ok(setup)
    }

    pub async fn create_joinable(
        &self,
        guild_id: serenity::GuildId,
        name: &str,
        topic: &str,
        actor: &Actor,
    ) -> Result<ChannelRef, JoinableError> {
        let setup = self.authorize(guild_id, actor).await?;

        let name = normalize_name(name);
        check_length(&name).map_err(JoinableError::InvalidName)?;
        check_length(topic).map_err(JoinableError::InvalidTopic)?;

        let existing = self.platform.list_channels(guild_id).await?;
        if existing.iter().any(|c| c.name == name) {
            return Err(JoinableError::DuplicateName(name));
        }

        let mut saga = Saga::new("create joinable channel");

        let role = saga
            .run(
                "create role",
                self.platform.create_role(
                    guild_id,
                    RoleSpec {
                        name: name.clone(),
                        hoist: false,
                        mentionable: false,
                    },
                ),
            )
            .await?;
        {
            let platform = self.platform.clone();
            let role_id = role.id;
            saga.compensate(
                "create role",
                Box::pin(async move { platform.delete_role(guild_id, role_id).await }),
            );
        }

        let spec = ChannelSpec {
            name: name.clone(),
            topic: topic.to_string(),
            parent_id: setup.joinable_category_id,
            overwrites: joinable_overwrites(&setup, role.id),
        };
        let channel = saga
            .run("create channel", self.platform.create_channel(guild_id, spec))
            .await?;
        saga.commit();

        info!(
            "Created joinable channel {} ({}) with role {} in guild {}",
            channel.name, channel.id, role.id, guild_id
        );

        // Role and channel stay even if the announcement fails.
        let announced = self
            .announcements
            .post_join_embed(setup.join_channel_id, &channel)
            .await;
        let message_id = match &announced {
            Ok(id) => Some(*id),
            Err(e) => e.message_id,
        };

        let link = JoinableLink {
            guild_id,
            channel_id: channel.id,
            role_id: role.id,
            message_id,
            name,
        };
        if let Err(e) = self.links.record(link).await {
            warn!(
                "Failed to record link for joinable channel {} in guild {}: {}",
                channel.id, guild_id, e
            );
        }

        announced?;
        Ok(channel)
    }

    pub async fn delete_joinable(
        &self,
        guild_id: serenity::GuildId,
        name: &str,
        actor: &Actor,
    ) -> Result<DeleteReport, JoinableError> {
        let setup = self.authorize(guild_id, actor).await?;
        let name = normalize_name(name);
        let mut report = DeleteReport::default();

        let link = match self.links.by_name(guild_id, &name).await {
            Ok(link) => link,
            Err(e) => {
                warn!("Failed to read link for {} in guild {}: {}", name, guild_id, e);
                None
            }
        };

        // The announcement goes first: its text is the last place the name
        // survives once the role is gone.
        if let Err(e) = self.remove_announcement(&setup, &name, link.as_ref()).await {
            report.warn("delete announcement", e);
        }

        match self.locate_role(guild_id, &name, link.as_ref()).await {
            Ok(role_id) => {
                if let Err(e) = self.platform.delete_role(guild_id, role_id).await {
                    report.warn("delete role", e.into());
                }
            }
            Err(e) => report.warn("locate role", e),
        }

        let deleted = match self.locate_channel(guild_id, &name, link.as_ref()).await {
            Ok(channel_id) => self
                .platform
                .delete_channel(channel_id)
                .await
                .map_err(JoinableError::from),
            Err(e) => Err(e),
        };

        // The link goes even when the channel delete failed.
        if let Err(e) = self.links.remove(guild_id, &name).await {
            error!(
                "Could not remove link for joinable channel {} in guild {}: {}",
                name, guild_id, e
            );
        }
        deleted?;

        info!(
            "Deleted joinable channel {} in guild {} with {} warning(s)",
            name,
            guild_id,
            report.warnings.len()
        );
        Ok(report)
    }

    /// Removes the announcement by its linked id, falling back to the title scan
    /// when there is no link or the linked message is gone.
    async fn remove_announcement(
        &self,
        setup: &GuildSetup,
        name: &str,
        link: Option<&JoinableLink>,
    ) -> Result<(), JoinableError> {
        if let Some(message_id) = link.and_then(|l| l.message_id) {
            match self
                .announcements
                .remove(setup.join_channel_id, message_id)
                .await
            {
                Ok(()) => return Ok(()),
                Err(e) => debug!(
                    "Linked announcement {} for {} not removed, scanning instead: {}",
                    message_id, name, e
                ),
            }
        }

        let message_id = self
            .announcements
            .find_announcement(setup.join_channel_id, name)
            .await?;
        self.announcements
            .remove(setup.join_channel_id, message_id)
            .await?;
        Ok(())
    }

    /// The linked role if it still exists, otherwise the role with the name.
    async fn locate_role(
        &self,
        guild_id: serenity::GuildId,
        name: &str,
        link: Option<&JoinableLink>,
    ) -> Result<serenity::RoleId, JoinableError> {
        let roles = self.platform.list_roles(guild_id).await?;
        link.map(|l| l.role_id)
            .filter(|id| roles.iter().any(|r| r.id == *id))
            .or_else(|| roles.iter().find(|r| r.name == name).map(|r| r.id))
            .ok_or(JoinableError::NotFound(Resource::Role))
    }

    /// The linked channel if it still exists, otherwise the channel with the name.
    async fn locate_channel(
        &self,
        guild_id: serenity::GuildId,
        name: &str,
        link: Option<&JoinableLink>,
    ) -> Result<serenity::ChannelId, JoinableError> {
        let channels = self.platform.list_channels(guild_id).await?;
        link.map(|l| l.channel_id)
            .filter(|id| channels.iter().any(|c| c.id == *id))
            .or_else(|| channels.iter().find(|c| c.name == name).map(|c| c.id))
            .ok_or(JoinableError::NotFound(Resource::Channel))
    }
}
