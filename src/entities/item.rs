use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "item")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(unique)]
    pub slug: String,
    pub referent_email: String,
    pub description: String,
    pub category_id: Uuid,
    /// JSON array of image references (`{ public_id, url }`).
    pub images: Json,
    pub provider_name: String,
    pub provider_phone_number: String,
    pub provider_address: String,
    pub zone_island: String,
    pub zone_name: String,
    pub reference_zone_id: Uuid,
    pub item_approval_status: String,
    pub item_type: String,
    pub is_recommended: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
    #[sea_orm(
        belongs_to = "super::zone::Entity",
        from = "Column::ReferenceZoneId",
        to = "super::zone::Column::Id"
    )]
    ReferenceZone,
    #[sea_orm(has_many = "super::item_sub::Entity")]
    ItemSub,
    #[sea_orm(has_many = "super::item_rating::Entity")]
    ItemRating,
    #[sea_orm(has_many = "super::wishlist::Entity")]
    Wishlist,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::zone::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReferenceZone.def()
    }
}

impl Related<super::item_sub::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ItemSub.def()
    }
}

impl Related<super::item_rating::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ItemRating.def()
    }
}

impl Related<super::sub::Entity> for Entity {
    fn to() -> RelationDef {
        super::item_sub::Relation::Sub.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::item_sub::Relation::Item.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
