pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_zone_table;
mod m20260301_000002_create_user_table;
mod m20260301_000003_create_category_tables;
mod m20260301_000004_create_item_tables;
mod m20260301_000005_create_blog_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_zone_table::Migration),
            Box::new(m20260301_000002_create_user_table::Migration),
            Box::new(m20260301_000003_create_category_tables::Migration),
            Box::new(m20260301_000004_create_item_tables::Migration),
            Box::new(m20260301_000005_create_blog_tables::Migration),
        ]
    }
}
