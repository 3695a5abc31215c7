pub mod config;
pub mod database_error;
pub mod database_migration;
pub mod driven;
pub mod driver;
pub mod telemetry;

pub use config::{AppConfig, DatabaseConfig, ServerConfig};
pub use database_migration::DatabaseMigration;
