use sea_orm_migration::prelude::*;

/// Creates `item` with its sub-category links, ratings, and the user wishlist.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Item {
    Table,
    Id,
    Title,
    Slug,
    ReferentEmail,
    Description,
    CategoryId,
    Images,
    ProviderName,
    ProviderPhoneNumber,
    ProviderAddress,
    ZoneIsland,
    ZoneName,
    ReferenceZoneId,
    ItemApprovalStatus,
    ItemType,
    IsRecommended,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ItemSub {
    Table,
    ItemId,
    SubId,
}

#[derive(DeriveIden)]
enum ItemRating {
    Table,
    Id,
    ItemId,
    PostedBy,
    Star,
    Comment,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Wishlist {
    Table,
    UserId,
    ItemId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Category {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Sub {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Zone {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum User {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Item::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Item::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Item::Title).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Item::Slug)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Item::ReferentEmail)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Item::Description).string_len(2000).not_null())
                    .col(ColumnDef::new(Item::CategoryId).uuid().not_null())
                    .col(ColumnDef::new(Item::Images).json().not_null())
                    .col(ColumnDef::new(Item::ProviderName).string_len(200).not_null())
                    .col(
                        ColumnDef::new(Item::ProviderPhoneNumber)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Item::ProviderAddress)
                            .string_len(2000)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Item::ZoneIsland).string_len(20).not_null())
                    .col(ColumnDef::new(Item::ZoneName).string_len(100).not_null())
                    .col(ColumnDef::new(Item::ReferenceZoneId).uuid().not_null())
                    .col(
                        ColumnDef::new(Item::ItemApprovalStatus)
                            .string_len(20)
                            .not_null()
                            .default("on hold"),
                    )
                    .col(ColumnDef::new(Item::ItemType).string_len(20).not_null())
                    .col(
                        ColumnDef::new(Item::IsRecommended)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Item::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Item::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_item_category_id")
                            .from(Item::Table, Item::CategoryId)
                            .to(Category::Table, Category::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_item_reference_zone_id")
                            .from(Item::Table, Item::ReferenceZoneId)
                            .to(Zone::Table, Zone::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, column) in [
            ("idx_item_referent_email", Item::ReferentEmail),
            ("idx_item_approval_status", Item::ItemApprovalStatus),
            ("idx_item_zone_island", Item::ZoneIsland),
            ("idx_item_category_id", Item::CategoryId),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Item::Table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        manager
            .create_table(
                Table::create()
                    .table(ItemSub::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ItemSub::ItemId).uuid().not_null())
                    .col(ColumnDef::new(ItemSub::SubId).uuid().not_null())
                    .primary_key(Index::create().col(ItemSub::ItemId).col(ItemSub::SubId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_item_sub_item_id")
                            .from(ItemSub::Table, ItemSub::ItemId)
                            .to(Item::Table, Item::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_item_sub_sub_id")
                            .from(ItemSub::Table, ItemSub::SubId)
                            .to(Sub::Table, Sub::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_item_sub_sub_id")
                    .table(ItemSub::Table)
                    .col(ItemSub::SubId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ItemRating::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ItemRating::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ItemRating::ItemId).uuid().not_null())
                    .col(ColumnDef::new(ItemRating::PostedBy).uuid().not_null())
                    .col(ColumnDef::new(ItemRating::Star).integer().not_null())
                    .col(ColumnDef::new(ItemRating::Comment).text().not_null())
                    .col(
                        ColumnDef::new(ItemRating::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ItemRating::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_item_rating_item_id")
                            .from(ItemRating::Table, ItemRating::ItemId)
                            .to(Item::Table, Item::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_item_rating_posted_by")
                            .from(ItemRating::Table, ItemRating::PostedBy)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One rating per user per item
        manager
            .create_index(
                Index::create()
                    .name("uq_item_rating_item_id_posted_by")
                    .table(ItemRating::Table)
                    .col(ItemRating::ItemId)
                    .col(ItemRating::PostedBy)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Wishlist::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Wishlist::UserId).uuid().not_null())
                    .col(ColumnDef::new(Wishlist::ItemId).uuid().not_null())
                    .col(
                        ColumnDef::new(Wishlist::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(Index::create().col(Wishlist::UserId).col(Wishlist::ItemId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_wishlist_user_id")
                            .from(Wishlist::Table, Wishlist::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_wishlist_item_id")
                            .from(Wishlist::Table, Wishlist::ItemId)
                            .to(Item::Table, Item::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Wishlist::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ItemRating::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ItemSub::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Item::Table).to_owned())
            .await
    }
}
