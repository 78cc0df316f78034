use super::authorization::Actor;
use super::error::{JoinableError, Resource};
use crate::services::localization::{ContextL10nExt, L10nProxy};
use crate::{Context, Data, Error};
use anyhow::Context as _;
use fluent::FluentArgs;
use tracing::error;

pub fn commands() -> Vec<poise::Command<Data, Error>> {
    vec![createjoinablechannel(), deletejoinablechannel()]
}

/// The invoking member, as the authorization gate sees them.
pub(crate) async fn invoking_actor(ctx: Context<'_>) -> Result<Actor, Error> {
    let member = ctx
        .author_member()
        .await
        .context("command was not invoked by a guild member")?;

    Ok(Actor {
        user_id: ctx.author().id,
        roles: member.roles.clone(),
        origin_channel_id: ctx.channel_id(),
    })
}

/// Localized reply text for a failed joinable operation.
pub(crate) fn error_reply(l10n: &L10nProxy, err: &JoinableError) -> String {
    let mut args = FluentArgs::new();
    let key = match err {
        JoinableError::InvalidName(length) => {
            args.set("length", *length);
            "joinable-error-invalid-name"
        }
        JoinableError::InvalidTopic(length) => {
            args.set("length", *length);
            "joinable-error-invalid-topic"
        }
        JoinableError::DuplicateName(name) => {
            args.set("name", name.clone());
            "joinable-error-duplicate"
        }
        JoinableError::NotSetUp => "joinable-error-not-set-up",
        JoinableError::Unauthorized => "joinable-error-unauthorized",
        JoinableError::NotFound(Resource::Channel) => "joinable-error-channel-not-found",
        JoinableError::NotFound(_) => "joinable-error-not-found",
        JoinableError::Announcement(_) => "joinable-error-announcement",
        JoinableError::Platform(_) | JoinableError::Store(_) => {
            error!("Joinable channel operation failed: {}", err);
            "joinable-error-internal"
        }
    };
    l10n.t(key, Some(&args))
}

async fn reply_error(ctx: Context<'_>, err: &JoinableError) -> Result<(), Error> {
    let text = error_reply(&ctx.l10n_user(), err);
    ctx.send(poise::CreateReply::default().content(text).ephemeral(true))
        .await?;
    Ok(())
}

/// Create a channel members can join by reacting to its announcement
#[poise::command(slash_command, guild_only)]
pub async fn createjoinablechannel(
    ctx: Context<'_>,
    #[description = "Name of the new channel"]
    #[min_length = 2]
    #[max_length = 100]
    channelname: String,
    #[description = "Topic of the new channel"]
    #[min_length = 2]
    #[max_length = 100]
    topic: String,
) -> Result<(), Error> {
    ctx.defer().await?;
    let guild_id = ctx.guild_id().context("command used outside a guild")?;
    let actor = invoking_actor(ctx).await?;

    match ctx
        .data()
        .provisioner
        .create_joinable(guild_id, &channelname, &topic, &actor)
        .await
    {
        Ok(channel) => {
            let mut args = FluentArgs::new();
            args.set("channel", channel.mention());
            ctx.say(ctx.l10n_user().t("joinable-created", Some(&args)))
                .await?;
        }
        Err(e) => reply_error(ctx, &e).await?,
    }

    Ok(())
}

/// Delete a joinable channel together with its role and announcement
#[poise::command(slash_command, guild_only)]
pub async fn deletejoinablechannel(
    ctx: Context<'_>,
    #[description = "Name of the channel to delete"]
    #[min_length = 2]
    #[max_length = 100]
    channelname: String,
) -> Result<(), Error> {
    ctx.defer().await?;
    let guild_id = ctx.guild_id().context("command used outside a guild")?;
    let actor = invoking_actor(ctx).await?;

    match ctx
        .data()
        .provisioner
        .delete_joinable(guild_id, &channelname, &actor)
        .await
    {
        Ok(report) => {
            let l10n = ctx.l10n_user();
            let mut args = FluentArgs::new();
            args.set("name", channelname);
            args.set("warnings", report.warnings.len());
            ctx.say(l10n.t("joinable-deleted", Some(&args))).await?;
        }
        Err(e) => reply_error(ctx, &e).await?,
    }

    Ok(())
}
