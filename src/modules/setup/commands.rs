use crate::modules::joinable::commands::{error_reply, invoking_actor};
use crate::services::localization::ContextL10nExt;
use crate::services::store::GuildConfig;
use crate::{Context, Data, Error};
use anyhow::Context as _;
use fluent::FluentArgs;
use poise::serenity_prelude as serenity;

pub fn commands() -> Vec<poise::Command<Data, Error>> {
    vec![setup(), teardown()]
}

/// Configure joinable channels for this server
#[poise::command(
    slash_command,
    guild_only,
    default_member_permissions = "ADMINISTRATOR"
)]
pub async fn setup(
    ctx: Context<'_>,
    #[description = "Channel where joinable channels are announced"]
    #[channel_types("Text")]
    joinchannel: serenity::GuildChannel,
    #[description = "Channel where joinable channels are managed"]
    #[channel_types("Text")]
    adminchannel: serenity::GuildChannel,
    #[description = "Category that holds joinable channels"]
    #[channel_types("Category")]
    joinablecategory: serenity::GuildChannel,
    #[description = "Role every member has"] anyonerole: serenity::Role,
    #[description = "Administrator role"] adminrole: serenity::Role,
    #[description = "Moderator role"] moderatorrole: serenity::Role,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().context("command used outside a guild")?;
    let actor = invoking_actor(ctx).await?;
    let l10n = ctx.l10n_user();

    let config = GuildConfig {
        guild_id,
        join_channel_id: Some(joinchannel.id),
        admin_channel_id: Some(adminchannel.id),
        joinable_category_id: Some(joinablecategory.id),
        anyone_role_id: Some(anyonerole.id),
        admin_role_id: Some(adminrole.id),
        moderator_role_id: Some(moderatorrole.id),
    };

    let text = match ctx.data().resolver.configure(config, &actor).await {
        Ok(()) => {
            let mut args = FluentArgs::new();
            args.set("join", format!("<#{}>", joinchannel.id));
            args.set("admin", format!("<#{}>", adminchannel.id));
            args.set("category", joinablecategory.name.clone());
            l10n.t("setup-saved", Some(&args))
        }
        Err(e) => error_reply(&l10n, &e),
    };

    ctx.send(poise::CreateReply::default().content(text).ephemeral(true))
        .await?;
    Ok(())
}

/// Remove the joinable channel configuration of this server
#[poise::command(
    slash_command,
    guild_only,
    default_member_permissions = "ADMINISTRATOR"
)]
pub async fn teardown(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().context("command used outside a guild")?;
    let actor = invoking_actor(ctx).await?;
    let l10n = ctx.l10n_user();

    let text = match ctx.data().resolver.teardown(guild_id, &actor).await {
        Ok(()) => l10n.t("teardown-done", None),
        Err(e) => error_reply(&l10n, &e),
    };

    ctx.send(poise::CreateReply::default().content(text).ephemeral(true))
        .await?;
    Ok(())
}
