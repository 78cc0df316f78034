use crate::services::localization::ContextL10nExt;
use crate::{Context, Data, Error};
use fluent::FluentArgs;
use poise::serenity_prelude as serenity;

pub fn commands() -> Vec<poise::Command<Data, Error>> {
    vec![ping(), source(), help()]
}

/// Check that the bot is responding
#[poise::command(slash_command)]
pub async fn ping(ctx: Context<'_>) -> Result<(), Error> {
    let mut args = FluentArgs::new();
    args.set("latency", ctx.ping().await.as_millis() as u64);
    ctx.say(ctx.l10n_user().t("ping-reply", Some(&args))).await?;
    Ok(())
}

/// Link to the bot's source code
#[poise::command(slash_command)]
pub async fn source(ctx: Context<'_>) -> Result<(), Error> {
    let l10n = ctx.l10n_user();
    let text = match &ctx.data().source_url {
        Some(url) => {
            let mut args = FluentArgs::new();
            args.set("url", url.clone());
            l10n.t("source-reply", Some(&args))
        }
        None => l10n.t("source-unavailable", None),
    };
    ctx.say(text).await?;
    Ok(())
}

/// List the bot's modules and their commands
#[poise::command(slash_command)]
pub async fn help(ctx: Context<'_>) -> Result<(), Error> {
    let l10n = ctx.l10n_user();
    let commands = &ctx.framework().options().commands;

    let mut embed = serenity::CreateEmbed::new()
        .title(l10n.t("help-title", None))
        .description(l10n.t("help-description", None));

    for module in &ctx.data().module_definitions {
        let lines: Vec<String> = commands
            .iter()
            .filter(|c| c.category.as_deref() == Some(module.id))
            .map(|c| {
                format!(
                    "`/{}` {}",
                    c.name,
                    c.description.as_deref().unwrap_or_default()
                )
            })
            .collect();
        if lines.is_empty() {
            continue;
        }

        let title = format!(
            "{}: {}",
            l10n.t(module.name_key, None),
            l10n.t(module.description_key, None)
        );
        embed = embed.field(title, lines.join("\n"), false);
    }

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}
