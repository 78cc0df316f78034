use super::authorization::{Actor, AuthorizationGate};
use super::error::JoinableError;
use crate::services::store::{ConfigStore, GuildConfig, GuildSetup};
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::info;

/// Loads guild configuration and turns incomplete setups into `NotSetUp`.
pub struct GuildConfigResolver {
    store: Arc<dyn ConfigStore>,
}

impl GuildConfigResolver {
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self { store }
    }

    pub async fn resolve(&self, guild_id: serenity::GuildId) -> Result<GuildSetup, JoinableError> {
        self.store
            .get(guild_id)
            .await?
            .and_then(GuildConfig::into_setup)
            .ok_or(JoinableError::NotSetUp)
    }

    pub async fn save(&self, config: GuildConfig) -> Result<(), JoinableError> {
        self.store.put(config).await?;
        Ok(())
    }

    pub async fn remove(&self, guild_id: serenity::GuildId) -> Result<(), JoinableError> {
        self.store.delete(guild_id).await?;
        Ok(())
    }

    /// Stores a new configuration. Once a guild is set up, only members the
    /// current configuration authorizes may replace it.
    pub async fn configure(&self, config: GuildConfig, actor: &Actor) -> Result<(), JoinableError> {
        match self.resolve(config.guild_id).await {
            Ok(current) if !AuthorizationGate::allows(&current, actor) => {
                return Err(JoinableError::Unauthorized);
            }
            Ok(_) | Err(JoinableError::NotSetUp) => {}
            Err(e) => return Err(e),
        }

        let guild_id = config.guild_id;
        self.save(config).await?;
        info!("User {} updated configuration of guild {}", actor.user_id, guild_id);
        Ok(())
    }

    pub async fn teardown(&self, guild_id: serenity::GuildId, actor: &Actor) -> Result<(), JoinableError> {
        let current = self.resolve(guild_id).await?;
        if !AuthorizationGate::allows(&current, actor) {
            return Err(JoinableError::Unauthorized);
        }

        self.remove(guild_id).await?;
        info!("User {} removed configuration of guild {}", actor.user_id, guild_id);
        Ok(())
    }
}
