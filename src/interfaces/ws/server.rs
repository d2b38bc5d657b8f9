//! OCPP 1.6 WebSocket server
//!
//! Accepts charge-point connections at `ws://<host>:<port>/ocpp/{station_id}`.
//! One handler per connection; frames are answered on the same socket
//! through the connection registry.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;
use tokio_tungstenite::tungstenite::Message;
use tracing::{error, info, warn};

use crate::application::commands::{change_configuration, trigger_message, SharedCommandSender};
use crate::application::handlers::OcppHandler;
use crate::application::sessions::SessionTracker;
use crate::application::station_state::StationDirectory;
use crate::config::AppConfig;
use crate::interfaces::ws::SharedConnectionRegistry;
use crate::support::ShutdownSignal;

/// Subprotocol spellings seen in the wild; matched case-insensitively and
/// echoed back exactly as the client sent them.
const OCPP_SUBPROTOCOLS: [&str; 3] = ["ocpp1.6", "ocpp1.6j", "ocpp1.6-json"];

/// Delay before the post-connect warm-up commands are sent.
const WARMUP_DELAY: Duration = Duration::from_secs(2);

pub struct OcppServer {
    config: AppConfig,
    registry: SharedConnectionRegistry,
    stations: Arc<StationDirectory>,
    sessions: Arc<SessionTracker>,
    commands: SharedCommandSender,
    shutdown: ShutdownSignal,
}

impl OcppServer {
    pub fn new(
        config: AppConfig,
        registry: SharedConnectionRegistry,
        stations: Arc<StationDirectory>,
        sessions: Arc<SessionTracker>,
        commands: SharedCommandSender,
        shutdown: ShutdownSignal,
    ) -> Self {
        Self {
            config,
            registry,
            stations,
            sessions,
            commands,
            shutdown,
        }
    }

    pub async fn run(&self) -> std::io::Result<()> {
        let addr = self.config.server.ws_address();
        let listener = TcpListener::bind(&addr).await?;
        info!("OCPP 1.6 Central System listening on ws://{}/ocpp/{{station_id}}", addr);
        self.serve(listener).await;
        Ok(())
    }

    /// Accept loop; returns when shutdown fires.
    pub async fn serve(&self, listener: TcpListener) {
        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, addr)) => self.spawn_connection(stream, addr),
                        Err(e) => error!(error = %e, "Failed to accept connection"),
                    }
                }
                _ = self.shutdown.wait() => {
                    info!("WebSocket server shutting down");
                    return;
                }
            }
        }
    }

    fn spawn_connection(&self, stream: TcpStream, addr: SocketAddr) {
        let registry = self.registry.clone();
        let stations = self.stations.clone();
        let sessions = self.sessions.clone();
        let commands = self.commands.clone();
        let shutdown = self.shutdown.clone();
        let heartbeat_interval = self.config.ocpp.heartbeat_interval_secs;

        tokio::spawn(async move {
            if let Err(e) = handle_connection(
                stream,
                addr,
                registry,
                stations,
                sessions,
                commands,
                shutdown,
                heartbeat_interval,
            )
            .await
            {
                warn!(%addr, error = %e, "Connection ended with error");
            }
        });
    }
}

/// Extract the station id from the request path. Only `/ocpp/{station_id}`
/// with a single non-empty segment is accepted.
fn extract_station_id(path: &str) -> Option<String> {
    let id = path.strip_prefix("/ocpp/")?;
    if id.is_empty() || id.contains('/') {
        return None;
    }
    Some(id.to_string())
}

/// Pick the subprotocol token to echo back, if the client offered one we
/// speak.
fn negotiate_subprotocol(offered: &str) -> Option<String> {
    offered
        .split(',')
        .map(str::trim)
        .find(|token| {
            OCPP_SUBPROTOCOLS
                .iter()
                .any(|known| token.eq_ignore_ascii_case(known))
        })
        .map(str::to_string)
}

fn reject(status: StatusCode, body: &str) -> ErrorResponse {
    let mut response = ErrorResponse::new(Some(body.to_string()));
    *response.status_mut() = status;
    response
}

#[allow(clippy::too_many_arguments)]
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    registry: SharedConnectionRegistry,
    stations: Arc<StationDirectory>,
    sessions: Arc<SessionTracker>,
    commands: SharedCommandSender,
    shutdown: ShutdownSignal,
    heartbeat_interval_secs: u32,
) -> Result<(), tokio_tungstenite::tungstenite::Error> {
    let mut station_id: Option<String> = None;

    let ws_stream = tokio_tungstenite::accept_hdr_async(
        stream,
        |req: &Request, mut response: Response| {
            let path = req.uri().path();
            let Some(id) = extract_station_id(path) else {
                warn!(%addr, path, "Rejecting handshake with unexpected path");
                return Err(reject(
                    StatusCode::BAD_REQUEST,
                    "expected path /ocpp/{station_id}",
                ));
            };

            let offered = req
                .headers()
                .get("Sec-WebSocket-Protocol")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("");
            if let Some(token) = negotiate_subprotocol(offered) {
                // from_str only fails on invalid header bytes, which the
                // parsed request cannot contain
                if let Ok(value) = token.parse() {
                    response
                        .headers_mut()
                        .insert("Sec-WebSocket-Protocol", value);
                }
            } else if !offered.is_empty() {
                warn!(%addr, offered, "Client offered no OCPP 1.6 subprotocol");
            }

            station_id = Some(id);
            Ok(response)
        },
    )
    .await?;

    // The callback ran, otherwise accept_hdr_async returned Err above.
    let Some(station_id) = station_id else {
        return Ok(());
    };

    info!(station_id = station_id.as_str(), %addr, "Station connected");

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let connection_id = registry.register(&station_id, tx);

    if let Err(e) = stations.mark_connected(&station_id).await {
        error!(station_id = station_id.as_str(), error = %e, "Failed to persist connect");
    }

    spawn_warmup(commands.clone(), station_id.clone(), heartbeat_interval_secs);

    let writer_id = station_id.clone();
    let writer = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Err(e) = ws_sender.send(Message::Text(msg)).await {
                warn!(station_id = writer_id.as_str(), error = %e, "Socket write failed");
                break;
            }
        }
    });

    let handler = OcppHandler::new(
        station_id.clone(),
        stations.clone(),
        sessions,
        commands.clone(),
        heartbeat_interval_secs,
    );

    loop {
        tokio::select! {
            msg = ws_receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(response) = handler.handle(&text).await {
                            if registry.send_to(&station_id, response).is_err() {
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(Message::Binary(data))) => {
                        warn!(station_id = station_id.as_str(), len = data.len(), "Ignoring binary message");
                    }
                    Some(Ok(_)) => {} // ping/pong handled by tungstenite
                    Some(Err(e)) => {
                        warn!(station_id = station_id.as_str(), error = %e, "Socket read failed");
                        break;
                    }
                }
            }
            _ = shutdown.wait() => break,
        }
    }

    // Single finalization point. A reconnect may already have superseded
    // this entry; then the newer connection owns the bookkeeping.
    if registry.unregister(&station_id, connection_id) {
        commands.drop_pending_for(&station_id);
        if let Err(e) = stations.mark_disconnected(&station_id).await {
            error!(station_id = station_id.as_str(), error = %e, "Failed to persist disconnect");
        }
        info!(station_id = station_id.as_str(), "Station disconnected");
    }

    writer.abort();
    Ok(())
}

/// Post-connect warm-up: align the heartbeat interval and nudge the station
/// into announcing itself. Best effort; failures are logged and dropped.
fn spawn_warmup(commands: SharedCommandSender, station_id: String, heartbeat_interval_secs: u32) {
    tokio::spawn(async move {
        tokio::time::sleep(WARMUP_DELAY).await;

        let interval = heartbeat_interval_secs.to_string();
        let steps = [
            change_configuration(&commands, &station_id, "HeartbeatInterval", &interval).await,
            trigger_message(&commands, &station_id, "Heartbeat").await,
            trigger_message(&commands, &station_id, "BootNotification").await,
        ];
        for step in steps {
            if let Err(e) = step {
                warn!(station_id = station_id.as_str(), error = %e, "Warm-up command failed");
            }
        }
    });
}
