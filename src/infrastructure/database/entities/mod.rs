//! SeaORM entities

pub mod session;
pub mod station;
