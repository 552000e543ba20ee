use sea_orm_migration::prelude::*;

/// Creates the `user` table. Credentials live with the identity provider;
/// this table only mirrors the marketplace profile.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum User {
    Table,
    Id,
    Name,
    Email,
    PhoneNumber,
    Role,
    Island,
    City,
    Address,
    ReferenceZoneId,
    ReferentAccountApproval,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Zone {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(User::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(User::Name).string_len(200).not_null())
                    .col(
                        ColumnDef::new(User::Email)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(User::PhoneNumber).string_len(50).not_null())
                    .col(
                        ColumnDef::new(User::Role)
                            .string_len(20)
                            .not_null()
                            .default("customer"),
                    )
                    .col(ColumnDef::new(User::Island).string_len(20).not_null())
                    .col(ColumnDef::new(User::City).string_len(100).not_null())
                    .col(ColumnDef::new(User::Address).string_len(500).not_null())
                    .col(ColumnDef::new(User::ReferenceZoneId).uuid().null())
                    .col(
                        ColumnDef::new(User::ReferentAccountApproval)
                            .string_len(20)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(User::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(User::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_reference_zone_id")
                            .from(User::Table, User::ReferenceZoneId)
                            .to(Zone::Table, Zone::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_role")
                    .table(User::Table)
                    .col(User::Role)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await
    }
}
