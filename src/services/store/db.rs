use super::{ConfigStore, GuildConfig, JoinableLink, LinkStore, snowflake};
use crate::db::entities::prelude::{GuildConfigs, JoinableLinks};
use crate::db::entities::{guild_configs, joinable_links};
use async_trait::async_trait;
use chrono::Utc;
use poise::serenity_prelude as serenity;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set};

/// sea-orm backed store for guild configuration and joinable links.
pub struct DbStore {
    db: DatabaseConnection,
}

impl DbStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl From<guild_configs::Model> for GuildConfig {
    fn from(model: guild_configs::Model) -> Self {
        Self {
            guild_id: serenity::GuildId::new(model.guild_id as u64),
            join_channel_id: model.join_channel_id.and_then(snowflake),
            admin_channel_id: model.admin_channel_id.and_then(snowflake),
            joinable_category_id: model.joinable_category_id.and_then(snowflake),
            anyone_role_id: model.anyone_role_id.and_then(snowflake),
            admin_role_id: model.admin_role_id.and_then(snowflake),
            moderator_role_id: model.moderator_role_id.and_then(snowflake),
        }
    }
}

impl From<GuildConfig> for guild_configs::ActiveModel {
    fn from(config: GuildConfig) -> Self {
        Self {
            guild_id: Set(config.guild_id.get() as i64),
            join_channel_id: Set(config.join_channel_id.map(|id| id.get() as i64)),
            admin_channel_id: Set(config.admin_channel_id.map(|id| id.get() as i64)),
            joinable_category_id: Set(config.joinable_category_id.map(|id| id.get() as i64)),
            anyone_role_id: Set(config.anyone_role_id.map(|id| id.get() as i64)),
            admin_role_id: Set(config.admin_role_id.map(|id| id.get() as i64)),
            moderator_role_id: Set(config.moderator_role_id.map(|id| id.get() as i64)),
        }
    }
}

fn link_from_model(model: joinable_links::Model) -> Option<JoinableLink> {
    Some(JoinableLink {
        guild_id: snowflake(model.guild_id)?,
        channel_id: snowflake(model.channel_id)?,
        role_id: snowflake(model.role_id)?,
        message_id: model.message_id.and_then(snowflake),
        name: model.name,
    })
}

#[async_trait]
impl ConfigStore for DbStore {
    async fn get(&self, guild_id: serenity::GuildId) -> Result<Option<GuildConfig>, DbErr> {
        let model = GuildConfigs::find_by_id(guild_id.get() as i64)
            .one(&self.db)
            .await?;

        Ok(model.map(GuildConfig::from))
    }

    async fn put(&self, config: GuildConfig) -> Result<(), DbErr> {
        let model = guild_configs::ActiveModel::from(config);

        GuildConfigs::insert(model)
            .on_conflict(
                OnConflict::column(guild_configs::Column::GuildId)
                    .update_columns([
                        guild_configs::Column::JoinChannelId,
                        guild_configs::Column::AdminChannelId,
                        guild_configs::Column::JoinableCategoryId,
                        guild_configs::Column::AnyoneRoleId,
                        guild_configs::Column::AdminRoleId,
                        guild_configs::Column::ModeratorRoleId,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;

        Ok(())
    }

    async fn delete(&self, guild_id: serenity::GuildId) -> Result<(), DbErr> {
        GuildConfigs::delete_by_id(guild_id.get() as i64)
            .exec(&self.db)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl LinkStore for DbStore {
    async fn record(&self, link: JoinableLink) -> Result<(), DbErr> {
        let model = joinable_links::ActiveModel {
            channel_id: Set(link.channel_id.get() as i64),
            guild_id: Set(link.guild_id.get() as i64),
            role_id: Set(link.role_id.get() as i64),
            message_id: Set(link.message_id.map(|id| id.get() as i64)),
            name: Set(link.name),
            created_at: Set(Utc::now()),
        };

        // A name has one link per guild. A recreated channel replaces the old row.
        JoinableLinks::insert(model)
            .on_conflict(
                OnConflict::columns([
                    joinable_links::Column::GuildId,
                    joinable_links::Column::Name,
                ])
                .update_columns([
                    joinable_links::Column::ChannelId,
                    joinable_links::Column::RoleId,
                    joinable_links::Column::MessageId,
                    joinable_links::Column::CreatedAt,
                ])
                .to_owned(),
            )
            .exec(&self.db)
            .await?;

        Ok(())
    }

    async fn by_name(
        &self,
        guild_id: serenity::GuildId,
        name: &str,
    ) -> Result<Option<JoinableLink>, DbErr> {
        let model = JoinableLinks::find()
            .filter(joinable_links::Column::GuildId.eq(guild_id.get() as i64))
            .filter(joinable_links::Column::Name.eq(name))
            .one(&self.db)
            .await?;

        Ok(model.and_then(link_from_model))
    }

    async fn by_message(
        &self,
        guild_id: serenity::GuildId,
        message_id: serenity::MessageId,
    ) -> Result<Option<JoinableLink>, DbErr> {
        let model = JoinableLinks::find()
            .filter(joinable_links::Column::GuildId.eq(guild_id.get() as i64))
            .filter(joinable_links::Column::MessageId.eq(message_id.get() as i64))
            .one(&self.db)
            .await?;

        Ok(model.and_then(link_from_model))
    }

    async fn remove(&self, guild_id: serenity::GuildId, name: &str) -> Result<(), DbErr> {
        JoinableLinks::delete_many()
            .filter(joinable_links::Column::GuildId.eq(guild_id.get() as i64))
            .filter(joinable_links::Column::Name.eq(name))
            .exec(&self.db)
            .await?;
        Ok(())
    }
}
