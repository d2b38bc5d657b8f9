//! Infrastructure layer: persistence implementations of the domain
//! repository traits.

pub mod database;
pub mod memory;

pub use database::{init_database, Migrator, SeaOrmSessionRepository, SeaOrmStationRepository};
pub use memory::{InMemorySessionRepository, InMemoryStationRepository};
