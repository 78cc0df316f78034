use anyhow::Context as _;
use clap::Parser as _;
use dotenvy::dotenv;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod db;
mod modules;
mod services;

use modules::joinable::config::GuildConfigResolver;
use modules::joinable::provisioner::ChannelProvisioner;
use modules::joinable::reactions::MembershipReactionRouter;
use services::platform::DiscordPlatform;
use services::store::DbStore;

#[derive(clap::Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Publish commands. If no guild ID is provided, publish globally.
    #[arg(long, num_args = 0..)]
    publish: Option<Vec<u64>>,

    /// Clear all commands instead of publishing them.
    #[arg(long)]
    clear: bool,

    /// Rollback the specified number of migrations and run all migrations again.
    #[arg(long, num_args = 0..=1, default_missing_value = "1")]
    refresh_migrations: Option<u32>,

    #[arg(long, env = "DISCORD_TOKEN", hide_env_values = true)]
    discord_token: Option<String>,

    #[arg(long, env = "DATABASE_URL", default_value = db::DEFAULT_DATABASE_URL)]
    database_url: String,

    /// Repository linked by the source command.
    #[arg(long, env = "SOURCE_URL")]
    source_url: Option<String>,
}

// Custom user data passed to all command functions
pub struct Data {
    pub l10n: Arc<services::localization::LocalizationManager>,
    pub resolver: Arc<GuildConfigResolver>,
    pub provisioner: Arc<ChannelProvisioner>,
    pub reactions: Arc<MembershipReactionRouter>,
    pub module_definitions: Vec<modules::ModuleDefinition>,
    pub source_url: Option<String>,
}

pub type Error = anyhow::Error;
pub type Context<'a> = poise::Context<'a, Data, Error>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // Parse CLI arguments
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting joinable channels bot...");

    let db = db::establish_connection(&args.database_url)
        .await
        .context("Failed to connect to database")?;

    // Run migrations
    use sea_orm_migration::MigratorTrait;
    if let Some(depth) = args.refresh_migrations {
        info!("Refreshing migrations (down {}, then up)...", depth);
        db::migrations::Migrator::down(&db, Some(depth))
            .await
            .context("Failed to rollback migration")?;
    }

    db::migrations::Migrator::up(&db, None)
        .await
        .context("Failed to run migrations")?;

    if args.refresh_migrations.is_some() {
        info!("Migrations refreshed successfully.");
        return Ok(());
    }

    let token = args.discord_token.context("missing DISCORD_TOKEN")?;
    // Reactions and guild lifecycle events are both non-privileged.
    let intents = serenity::GatewayIntents::non_privileged();

    let l10n = Arc::new(services::localization::LocalizationManager::new());

    // Load and translate commands
    let mut commands = modules::commands();
    l10n.apply_translations(&mut commands);

    // Handle command registration if requested
    if let Some(publish_args) = args.publish {
        publish(&token, &commands, &publish_args, args.clear).await?;
        return Ok(());
    }

    let store = Arc::new(DbStore::new(db));
    let resolver = Arc::new(GuildConfigResolver::new(store.clone()));
    let source_url = args.source_url;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands,
            event_handler: |ctx, event, framework, data| {
                Box::pin(services::event_manager::handle_event(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, _framework| {
            Box::pin(async move {
                let platform = Arc::new(DiscordPlatform::new(ctx.http.clone()));
                let provisioner = Arc::new(ChannelProvisioner::new(
                    resolver.clone(),
                    platform.clone(),
                    store.clone(),
                ));
                let reactions = Arc::new(MembershipReactionRouter::new(
                    resolver.clone(),
                    platform,
                    store,
                    ready.user.id,
                ));

                info!("Bot is ready as {}", ready.user.name);
                Ok(Data {
                    l10n,
                    resolver,
                    provisioner,
                    reactions,
                    module_definitions: modules::definitions(),
                    source_url,
                })
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await
        .context("Failed to create client")?;

    client.start_autosharded().await.context("Client error")?;

    Ok(())
}

async fn publish(
    token: &str,
    commands: &[poise::Command<Data, Error>],
    guild_ids: &[u64],
    clear: bool,
) -> anyhow::Result<()> {
    let http = serenity::Http::new(token);
    let application = http
        .get_current_application_info()
        .await
        .context("Failed to fetch application info")?;
    http.set_application_id(application.id);

    info!("Fetched Application ID: {}", application.id);

    let commands: &[poise::Command<Data, Error>] = if clear { &[] } else { commands };

    if guild_ids.is_empty() {
        if clear {
            info!("Clearing commands globally...");
        } else {
            info!("Registering commands globally...");
        }

        if let Err(e) = poise::builtins::register_globally(&http, commands).await {
            error!("Failed to register commands globally: {}", e);
        } else {
            info!("Global command operation successful");
        }
    } else {
        for &guild_id in guild_ids {
            if clear {
                info!("Clearing commands in guild {}...", guild_id);
            } else {
                info!("Registering commands in guild {}...", guild_id);
            }

            if let Err(e) =
                poise::builtins::register_in_guild(&http, commands, serenity::GuildId::new(guild_id))
                    .await
            {
                error!("Failed to register commands in guild {}: {}", guild_id, e);
            } else {
                info!("Guild command operation successful for guild {}", guild_id);
            }
        }
    }

    Ok(())
}
