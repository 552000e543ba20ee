use sea_orm_migration::prelude::*;

/// Creates the `zone` table. Islands are stored by their canonical name.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Zone {
    Table,
    Id,
    Name,
    Slug,
    Island,
    CreatedAt,
    UpdatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Zone::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Zone::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Zone::Name).string_len(100).not_null())
                    .col(
                        ColumnDef::new(Zone::Slug)
                            .string_len(120)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Zone::Island).string_len(20).not_null())
                    .col(
                        ColumnDef::new(Zone::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Zone::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_zone_island")
                    .table(Zone::Table)
                    .col(Zone::Island)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Zone::Table).to_owned())
            .await
    }
}
