pub mod model;
pub mod repository;

pub use model::{ConnectionStatus, Station};
pub use repository::StationRepository;
