//! REST interface: station listing, remote commands and the trigger
//! endpoint.

pub mod dto;
pub mod handlers;
pub mod router;

pub use handlers::AppState;
pub use router::build_router;
