use crate::modules::joinable::reactions::ReactionEvent;
use crate::{Data, Error};
use poise::serenity_prelude as serenity;
use tracing::{debug, info};

/// The gateway events this bot reacts to.
#[derive(Debug, Clone)]
pub enum GuildEvent {
    Ready { user_name: String },
    ReactionAdd(ReactionEvent),
    GuildJoined { guild_id: serenity::GuildId, name: String },
    GuildLeft { guild_id: serenity::GuildId },
}

impl GuildEvent {
    pub fn from_gateway(event: &serenity::FullEvent) -> Option<Self> {
        match event {
            serenity::FullEvent::Ready { data_about_bot, .. } => Some(GuildEvent::Ready {
                user_name: data_about_bot.user.name.clone(),
            }),
            serenity::FullEvent::ReactionAdd { add_reaction, .. } => reaction_event(
                add_reaction.guild_id,
                add_reaction.channel_id,
                add_reaction.message_id,
                add_reaction.user_id,
                &add_reaction.emoji,
            )
            .map(GuildEvent::ReactionAdd),
            serenity::FullEvent::GuildCreate { guild, is_new, .. } if is_new.unwrap_or(false) => {
                Some(GuildEvent::GuildJoined {
                    guild_id: guild.id,
                    name: guild.name.clone(),
                })
            }
            serenity::FullEvent::GuildDelete { incomplete, .. } => Some(GuildEvent::GuildLeft {
                guild_id: incomplete.id,
            }),
            _ => None,
        }
    }
}

/// Reactions outside guilds, or without a known user, are not for us.
fn reaction_event(
    guild_id: Option<serenity::GuildId>,
    channel_id: serenity::ChannelId,
    message_id: serenity::MessageId,
    user_id: Option<serenity::UserId>,
    emoji: &serenity::ReactionType,
) -> Option<ReactionEvent> {
    Some(ReactionEvent {
        guild_id: guild_id?,
        channel_id,
        message_id,
        user_id: user_id?,
        emoji: emoji.to_string(),
    })
}

pub async fn handle_event(
    _ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    let Some(event) = GuildEvent::from_gateway(event) else {
        return Ok(());
    };

    match event {
        GuildEvent::Ready { user_name } => {
            info!("Logged in as {}", user_name);
        }
        GuildEvent::ReactionAdd(reaction) => {
            let router = data.reactions.clone();
            tokio::spawn(async move {
                let message_id = reaction.message_id;
                let outcome = router.handle(reaction).await;
                debug!("Reaction on message {} handled: {:?}", message_id, outcome);
            });
        }
        GuildEvent::GuildJoined { guild_id, name } => {
            info!("Joined new guild: {} ({})", name, guild_id);
        }
        GuildEvent::GuildLeft { guild_id } => {
            info!("Left guild: {}", guild_id);
        }
    }

    Ok(())
}
