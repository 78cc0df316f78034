use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "guild_configs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub guild_id: i64,
    pub join_channel_id: Option<i64>,
    pub admin_channel_id: Option<i64>,
    pub joinable_category_id: Option<i64>,
    pub anyone_role_id: Option<i64>,
    pub admin_role_id: Option<i64>,
    pub moderator_role_id: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
