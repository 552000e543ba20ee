use sea_orm_migration::prelude::*;

/// Creates `blog_category`, `tag`, `blog` and the two blog link tables.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum BlogCategory {
    Table,
    Id,
    Name,
    Slug,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Tag {
    Table,
    Id,
    Name,
    Slug,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Blog {
    Table,
    Id,
    Title,
    Slug,
    Body,
    Excerpt,
    Mtitle,
    Mdesc,
    Image,
    PostedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum BlogBlogCategory {
    Table,
    BlogId,
    BlogCategoryId,
}

#[derive(DeriveIden)]
enum BlogTag {
    Table,
    BlogId,
    TagId,
}

/// Shared shape of the two taxonomy tables.
fn taxonomy_table<T>(table: T, id: T, name: T, slug: T, created: T, updated: T) -> TableCreateStatement
where
    T: IntoIden + 'static,
{
    Table::create()
        .table(table)
        .if_not_exists()
        .col(ColumnDef::new(id).uuid().not_null().primary_key())
        .col(ColumnDef::new(name).string_len(32).not_null())
        .col(ColumnDef::new(slug).string_len(64).not_null().unique_key())
        .col(ColumnDef::new(created).timestamp_with_time_zone().not_null())
        .col(ColumnDef::new(updated).timestamp_with_time_zone().not_null())
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(taxonomy_table(
                BlogCategory::Table,
                BlogCategory::Id,
                BlogCategory::Name,
                BlogCategory::Slug,
                BlogCategory::CreatedAt,
                BlogCategory::UpdatedAt,
            ))
            .await?;

        manager
            .create_table(taxonomy_table(
                Tag::Table,
                Tag::Id,
                Tag::Name,
                Tag::Slug,
                Tag::CreatedAt,
                Tag::UpdatedAt,
            ))
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Blog::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Blog::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Blog::Title).string_len(160).not_null())
                    .col(
                        ColumnDef::new(Blog::Slug)
                            .string_len(200)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Blog::Body).text().not_null())
                    .col(ColumnDef::new(Blog::Excerpt).string_len(1000).not_null())
                    .col(ColumnDef::new(Blog::Mtitle).string_len(300).not_null())
                    .col(ColumnDef::new(Blog::Mdesc).text().not_null())
                    .col(ColumnDef::new(Blog::Image).string_len(500).not_null())
                    .col(ColumnDef::new(Blog::PostedBy).string_len(100).not_null())
                    .col(
                        ColumnDef::new(Blog::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Blog::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BlogBlogCategory::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(BlogBlogCategory::BlogId).uuid().not_null())
                    .col(
                        ColumnDef::new(BlogBlogCategory::BlogCategoryId)
                            .uuid()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(BlogBlogCategory::BlogId)
                            .col(BlogBlogCategory::BlogCategoryId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_blog_blog_category_blog_id")
                            .from(BlogBlogCategory::Table, BlogBlogCategory::BlogId)
                            .to(Blog::Table, Blog::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_blog_blog_category_blog_category_id")
                            .from(BlogBlogCategory::Table, BlogBlogCategory::BlogCategoryId)
                            .to(BlogCategory::Table, BlogCategory::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BlogTag::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(BlogTag::BlogId).uuid().not_null())
                    .col(ColumnDef::new(BlogTag::TagId).uuid().not_null())
                    .primary_key(Index::create().col(BlogTag::BlogId).col(BlogTag::TagId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_blog_tag_blog_id")
                            .from(BlogTag::Table, BlogTag::BlogId)
                            .to(Blog::Table, Blog::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_blog_tag_tag_id")
                            .from(BlogTag::Table, BlogTag::TagId)
                            .to(Tag::Table, Tag::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BlogTag::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BlogBlogCategory::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Blog::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tag::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BlogCategory::Table).to_owned())
            .await
    }
}
