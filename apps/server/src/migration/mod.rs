//! SeaORM database migrations.

pub use sea_orm_migration::prelude::*;

mod m20261001_000001_create_users;
mod m20261001_000002_create_api_keys;
mod m20261001_000003_create_documents;
mod m20261001_000004_create_analyses;
mod m20261001_000005_create_financial_metrics;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_create_users::Migration),
            Box::new(m20261001_000002_create_api_keys::Migration),
            Box::new(m20261001_000003_create_documents::Migration),
            Box::new(m20261001_000004_create_analyses::Migration),
            Box::new(m20261001_000005_create_financial_metrics::Migration),
        ]
    }
}
