//! Application layer: protocol handlers, outbound commands and the managers
//! that hold station/session state together.

pub mod bootstrap;
pub mod commands;
pub mod handlers;
pub mod sessions;
pub mod station_state;

pub use bootstrap::StartupConfigurator;
pub use commands::{CommandSender, SharedCommandSender};
pub use handlers::OcppHandler;
pub use sessions::SessionTracker;
pub use station_state::StationDirectory;
