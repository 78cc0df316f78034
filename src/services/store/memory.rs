//! In-memory stores used by unit tests.

use super::{ConfigStore, GuildConfig, JoinableLink, LinkStore};
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use sea_orm::DbErr;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct MemoryStore {
    pub configs: Mutex<HashMap<serenity::GuildId, GuildConfig>>,
    pub links: Mutex<Vec<JoinableLink>>,
}

impl MemoryStore {
    pub fn with_config(config: GuildConfig) -> Self {
        let store = Self::default();
        store
            .configs
            .lock()
            .unwrap()
            .insert(config.guild_id, config);
        store
    }

    pub fn link_count(&self) -> usize {
        self.links.lock().unwrap().len()
    }

    /// Forgets every link, as if the channels predate link tracking.
    pub fn clear_links(&self) {
        self.links.lock().unwrap().clear();
    }
}

#[async_trait]
impl ConfigStore for MemoryStore {
    async fn get(&self, guild_id: serenity::GuildId) -> Result<Option<GuildConfig>, DbErr> {
        Ok(self.configs.lock().unwrap().get(&guild_id).cloned())
    }

    async fn put(&self, config: GuildConfig) -> Result<(), DbErr> {
        self.configs.lock().unwrap().insert(config.guild_id, config);
        Ok(())
    }

    async fn delete(&self, guild_id: serenity::GuildId) -> Result<(), DbErr> {
        self.configs.lock().unwrap().remove(&guild_id);
        Ok(())
    }
}

#[async_trait]
impl LinkStore for MemoryStore {
    async fn record(&self, link: JoinableLink) -> Result<(), DbErr> {
        let mut links = self.links.lock().unwrap();
        links.retain(|l| {
            l.channel_id != link.channel_id && !(l.guild_id == link.guild_id && l.name == link.name)
        });
        links.push(link);
        Ok(())
    }

    async fn by_name(
        &self,
        guild_id: serenity::GuildId,
        name: &str,
    ) -> Result<Option<JoinableLink>, DbErr> {
        Ok(self
            .links
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.guild_id == guild_id && l.name == name)
            .cloned())
    }

    async fn by_message(
        &self,
        guild_id: serenity::GuildId,
        message_id: serenity::MessageId,
    ) -> Result<Option<JoinableLink>, DbErr> {
        Ok(self
            .links
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.guild_id == guild_id && l.message_id == Some(message_id))
            .cloned())
    }

    async fn remove(&self, guild_id: serenity::GuildId, name: &str) -> Result<(), DbErr> {
        self.links
            .lock()
            .unwrap()
            .retain(|l| !(l.guild_id == guild_id && l.name == name));
        Ok(())
    }
}
