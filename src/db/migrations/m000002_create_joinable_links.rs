use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(JoinableLinks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(JoinableLinks::ChannelId)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(JoinableLinks::GuildId).big_integer().not_null())
                    .col(ColumnDef::new(JoinableLinks::RoleId).big_integer().not_null())
                    .col(ColumnDef::new(JoinableLinks::MessageId).big_integer().null())
                    .col(ColumnDef::new(JoinableLinks::Name).string().not_null())
                    .col(
                        ColumnDef::new(JoinableLinks::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // One link per name, looked up on delete
        manager
            .create_index(
                Index::create()
                    .name("idx-joinable-links-guild-name")
                    .table(JoinableLinks::Table)
                    .col(JoinableLinks::GuildId)
                    .col(JoinableLinks::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Lookups by announcement on every reaction
        manager
            .create_index(
                Index::create()
                    .name("idx-joinable-links-guild-message")
                    .table(JoinableLinks::Table)
                    .col(JoinableLinks::GuildId)
                    .col(JoinableLinks::MessageId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(JoinableLinks::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum JoinableLinks {
    Table,
    ChannelId,
    GuildId,
    RoleId,
    MessageId,
    Name,
    CreatedAt,
}
