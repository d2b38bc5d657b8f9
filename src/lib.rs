//! voltcore-ocpp — OCPP 1.6-J central system for EV charging stations.
//!
//! Charge points connect over WebSocket at `/ocpp/{station_id}`; their
//! protocol traffic drives station and session state in the database. A
//! small REST API exposes the station fleet and remote commands.
//!
//! Layering:
//! - [`domain`]: entities and repository traits
//! - [`application`]: protocol handlers, outbound commands, state managers
//! - [`interfaces`]: the WebSocket endpoint and the REST API
//! - [`infrastructure`]: SeaORM and in-memory repository implementations
//! - [`support`]: OCPP-J framing and shutdown plumbing

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod support;

pub use config::AppConfig;
