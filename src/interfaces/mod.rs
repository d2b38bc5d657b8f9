//! Inbound interfaces: the OCPP WebSocket endpoint and the REST API.

pub mod http;
pub mod ws;
