use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub phone_number: String,
    pub role: String,
    pub island: String,
    pub city: String,
    pub address: String,
    pub reference_zone_id: Option<Uuid>,
    pub referent_account_approval: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::zone::Entity",
        from = "Column::ReferenceZoneId",
        to = "super::zone::Column::Id"
    )]
    ReferenceZone,
    #[sea_orm(has_many = "super::wishlist::Entity")]
    Wishlist,
    #[sea_orm(has_many = "super::item_rating::Entity")]
    ItemRating,
}

impl Related<super::zone::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReferenceZone.def()
    }
}

impl Related<super::wishlist::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wishlist.def()
    }
}

impl Related<super::item_rating::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ItemRating.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
