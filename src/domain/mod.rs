//! Core entities and persistence traits.

pub mod error;
pub mod session;
pub mod station;

pub use error::{DomainError, DomainResult};
pub use session::{Session, SessionRepository};
pub use station::{ConnectionStatus, Station, StationRepository};
