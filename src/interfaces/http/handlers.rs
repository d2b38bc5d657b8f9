//! REST API handlers

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use tracing::info;

use crate::application::commands::{
    change_configuration, remote_start_transaction, remote_stop_transaction, trigger_message,
    SharedCommandSender,
};
use crate::application::sessions::SessionTracker;
use crate::application::station_state::StationDirectory;
use crate::interfaces::http::dto::{
    ApiResponse, CommandResponse, ConfigurationRequest, RemoteStartRequest, RemoteStopRequest,
    StationDto, TriggerParams,
};

#[derive(Clone)]
pub struct AppState {
    pub stations: Arc<StationDirectory>,
    pub sessions: Arc<SessionTracker>,
    pub commands: SharedCommandSender,
}

type ApiError = (StatusCode, Json<ApiResponse<CommandResponse>>);

fn offline(station_id: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::error(format!(
            "Station '{}' is not connected",
            station_id
        ))),
    )
}

fn internal(message: impl std::fmt::Display) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::error(message.to_string())),
    )
}

fn command_status(response: &Value) -> CommandResponse {
    let status = response
        .get("status")
        .and_then(Value::as_str)
        .unwrap_or("Unknown")
        .to_string();
    CommandResponse {
        status,
        message: None,
    }
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn list_stations(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<StationDto>>>, ApiError> {
    let stations = state.stations.list().await.map_err(internal)?;
    Ok(Json(ApiResponse::success(
        stations.into_iter().map(StationDto::from).collect(),
    )))
}

pub async fn get_station(
    State(state): State<AppState>,
    Path(ocpp_id): Path<String>,
) -> Result<Json<ApiResponse<StationDto>>, ApiError> {
    match state.stations.find_by_ocpp_id(&ocpp_id).await.map_err(internal)? {
        Some(station) => Ok(Json(ApiResponse::success(station.into()))),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error(format!("Station '{}' not found", ocpp_id))),
        )),
    }
}

pub async fn remote_start(
    State(state): State<AppState>,
    Path(ocpp_id): Path<String>,
    Json(request): Json<RemoteStartRequest>,
) -> Result<Json<ApiResponse<CommandResponse>>, ApiError> {
    match remote_start_transaction(
        &state.commands,
        &ocpp_id,
        &request.id_tag,
        request.connector_id,
    )
    .await
    {
        Ok(Some(response)) => Ok(Json(ApiResponse::success(command_status(&response)))),
        Ok(None) => Err(offline(&ocpp_id)),
        Err(e) => Err(internal(e)),
    }
}

pub async fn remote_stop(
    State(state): State<AppState>,
    Path(ocpp_id): Path<String>,
    Json(request): Json<RemoteStopRequest>,
) -> Result<Json<ApiResponse<CommandResponse>>, ApiError> {
    let transaction_id = match request.transaction_id {
        Some(id) => id,
        None => {
            // No id given: stop the station's open session, if any.
            let station = state
                .stations
                .find_by_ocpp_id(&ocpp_id)
                .await
                .map_err(internal)?
                .ok_or_else(|| offline(&ocpp_id))?;
            state
                .sessions
                .find_open_for_station(station.id)
                .await
                .map_err(internal)?
                .map(|s| s.transaction_id)
                .ok_or_else(|| {
                    (
                        StatusCode::NOT_FOUND,
                        Json(ApiResponse::error(format!(
                            "No open session for station '{}'",
                            ocpp_id
                        ))),
                    )
                })?
        }
    };

    match remote_stop_transaction(&state.commands, &ocpp_id, transaction_id).await {
        Ok(Some(response)) => Ok(Json(ApiResponse::success(command_status(&response)))),
        Ok(None) => Err(offline(&ocpp_id)),
        Err(e) => Err(internal(e)),
    }
}

pub async fn set_configuration(
    State(state): State<AppState>,
    Path(ocpp_id): Path<String>,
    Json(request): Json<ConfigurationRequest>,
) -> Result<Json<ApiResponse<CommandResponse>>, ApiError> {
    match change_configuration(&state.commands, &ocpp_id, &request.key, &request.value).await {
        Ok(Some(response)) => Ok(Json(ApiResponse::success(command_status(&response)))),
        Ok(None) => Err(offline(&ocpp_id)),
        Err(e) => Err(internal(e)),
    }
}

/// Fire-and-acknowledge trigger. The reply is a generic ack whether or not
/// the station was reachable; the actual outcome shows up as protocol
/// traffic.
pub async fn trigger(
    State(state): State<AppState>,
    Path(ocpp_id): Path<String>,
    Query(params): Query<TriggerParams>,
) -> Json<Value> {
    let message = params
        .message
        .unwrap_or_else(|| "BootNotification".to_string());
    info!(station_id = ocpp_id.as_str(), message = message.as_str(), "Trigger requested");

    let commands = state.commands.clone();
    tokio::spawn(async move {
        let _ = trigger_message(&commands, &ocpp_id, &message).await;
    });

    Json(json!({ "message": "Trigger message sent." }))
}
