//! Database access: entities, migrations and repository implementations.

pub mod entities;
pub mod migrator;
pub mod repositories;

pub use migrator::Migrator;
pub use repositories::{SeaOrmSessionRepository, SeaOrmStationRepository};

use sea_orm::{Database, DatabaseConnection};
use tracing::info;

use crate::config::DatabaseConfig;

pub async fn init_database(config: &DatabaseConfig) -> Result<DatabaseConnection, sea_orm::DbErr> {
    info!(url = config.url.as_str(), "Connecting to database");
    let db = Database::connect(&config.url).await?;
    Ok(db)
}
