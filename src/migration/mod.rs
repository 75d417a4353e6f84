//! SeaORM database migrations.

pub use sea_orm_migration::prelude::*;

mod m20260801_000001_create_users;
mod m20260801_000002_create_access_tokens;
mod m20260801_000003_create_fichas;
mod m20260801_000004_create_section_records;
mod m20260801_000005_create_vaccine_records;
mod m20260801_000006_create_documents;
mod m20260801_000007_create_field_reviews;
mod m20260801_000008_create_support_tickets;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260801_000001_create_users::Migration),
            Box::new(m20260801_000002_create_access_tokens::Migration),
            Box::new(m20260801_000003_create_fichas::Migration),
            Box::new(m20260801_000004_create_section_records::Migration),
            Box::new(m20260801_000005_create_vaccine_records::Migration),
            Box::new(m20260801_000006_create_documents::Migration),
            Box::new(m20260801_000007_create_field_reviews::Migration),
            Box::new(m20260801_000008_create_support_tickets::Migration),
        ]
    }
}
