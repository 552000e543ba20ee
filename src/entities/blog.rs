use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "blog")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(unique)]
    pub slug: String,
    pub body: String,
    pub excerpt: String,
    /// Meta title rendered in the page head.
    pub mtitle: String,
    /// Meta description: plain text from the start of the body.
    pub mdesc: String,
    pub image: String,
    pub posted_by: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::blog_blog_category::Entity")]
    BlogBlogCategory,
    #[sea_orm(has_many = "super::blog_tag::Entity")]
    BlogTag,
}

impl Related<super::blog_blog_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BlogBlogCategory.def()
    }
}

impl Related<super::blog_tag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BlogTag.def()
    }
}

impl Related<super::blog_category::Entity> for Entity {
    fn to() -> RelationDef {
        super::blog_blog_category::Relation::BlogCategory.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::blog_blog_category::Relation::Blog.def().rev())
    }
}

impl Related<super::tag::Entity> for Entity {
    fn to() -> RelationDef {
        super::blog_tag::Relation::Tag.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::blog_tag::Relation::Blog.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
