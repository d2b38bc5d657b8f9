//! WebSocket interface: connection registry and the OCPP server loop.

pub mod connection;
pub mod registry;
pub mod server;

pub use connection::Connection;
pub use registry::{ConnectionRegistry, SharedConnectionRegistry};
pub use server::OcppServer;
