//! SeaORM entity definitions for PostgreSQL database.

pub mod analysis;
pub mod api_key;
pub mod document;
pub mod financial_metric;
pub mod user;
