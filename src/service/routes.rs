//! HTTP facade for the lobby service
//!
//! Thin adapter over the lifecycle engine: each handler calls exactly one
//! engine operation and maps the outcome to a status code. Business
//! failures are expected outcomes (404/400); transient storage failures
//! surface as 503, never as 404.

use crate::error::LobbyError;
use crate::lobby::engine::LobbyEngine;
use crate::metrics::MetricsCollector;
use crate::service::health::ServiceHealth;
use crate::types::{CreateLobbyRequest, GameId, LobbyId, MembershipRequest};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error};

/// Shared state for the HTTP facade
#[derive(Clone)]
pub struct ApiState {
    pub engine: Arc<LobbyEngine>,
    pub metrics: Arc<MetricsCollector>,
    pub service_name: String,
}

/// Build the router with every lobby, game and monitoring endpoint
pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/lobbies", get(list_lobbies_handler).post(create_lobby_handler))
        .route("/lobbies/{lobby_id}", get(lobby_detail_handler))
        .route("/lobbies/{lobby_id}/join", post(join_lobby_handler))
        .route("/lobbies/{lobby_id}/leave", post(leave_lobby_handler))
        .route("/games/{game_id}", get(game_status_handler))
        .route("/games/{game_id}/end", post(end_game_handler))
        .route("/games/{game_id}/continue", post(continue_game_handler))
        .route("/games/{game_id}/close", post(close_game_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/stats", get(stats_handler))
        .with_state(state)
}

/// Map an engine failure to its response
fn error_response(operation: &str, err: anyhow::Error) -> (StatusCode, Json<serde_json::Value>) {
    let status = match err.downcast_ref::<LobbyError>() {
        Some(LobbyError::LobbyNotFound { .. }) => StatusCode::NOT_FOUND,
        Some(LobbyError::CapacityExceeded { .. }) | Some(LobbyError::Conflict { .. }) => {
            StatusCode::BAD_REQUEST
        }
        Some(LobbyError::StorageUnavailable { .. })
        | Some(LobbyError::RegistryUnavailable { .. }) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        error!(operation, error = %err, "lobby operation failed");
    } else {
        debug!(operation, error = %err, "lobby operation rejected");
    }

    (status, Json(json!({ "error": err.to_string() })))
}

/// Root endpoint handler - shows service information
async fn root_handler(State(state): State<ApiState>) -> impl IntoResponse {
    Json(json!({
        "service": state.service_name,
        "version": crate::VERSION,
        "endpoints": [
            "/lobbies",
            "/games",
            "/health",
            "/metrics",
            "/stats"
        ]
    }))
}

async fn list_lobbies_handler(State(state): State<ApiState>) -> Response {
    match state.engine.list_lobbies().await {
        Ok(lobbies) => Json(json!({ "lobbies": lobbies })).into_response(),
        Err(e) => error_response("list_lobbies", e).into_response(),
    }
}

async fn lobby_detail_handler(
    State(state): State<ApiState>,
    Path(lobby_id): Path<LobbyId>,
) -> Response {
    match state.engine.lobby_detail(lobby_id).await {
        Ok(details) => Json(details).into_response(),
        Err(e) => error_response("lobby_detail", e).into_response(),
    }
}

async fn create_lobby_handler(
    State(state): State<ApiState>,
    Json(request): Json<CreateLobbyRequest>,
) -> Response {
    match state
        .engine
        .create_lobby(&request.name, request.capacity, request.user_id)
        .await
    {
        Ok(details) => Json(details).into_response(),
        Err(e) => error_response("create_lobby", e).into_response(),
    }
}

async fn join_lobby_handler(
    State(state): State<ApiState>,
    Path(lobby_id): Path<LobbyId>,
    Json(request): Json<MembershipRequest>,
) -> Response {
    match state.engine.join_lobby(lobby_id, request.user_id).await {
        Ok(()) => Json(json!({})).into_response(),
        Err(e) => error_response("join_lobby", e).into_response(),
    }
}

async fn leave_lobby_handler(
    State(state): State<ApiState>,
    Path(lobby_id): Path<LobbyId>,
    Json(request): Json<MembershipRequest>,
) -> Response {
    match state.engine.leave_lobby(lobby_id, &request.user_id).await {
        Ok(_outcome) => Json(json!({})).into_response(),
        Err(e) => error_response("leave_lobby", e).into_response(),
    }
}

async fn game_status_handler(
    State(state): State<ApiState>,
    Path(game_id): Path<GameId>,
) -> Response {
    match state.engine.game_status(game_id).await {
        Ok(()) => Json(json!({})).into_response(),
        Err(e) => error_response("game_status", e).into_response(),
    }
}

async fn end_game_handler(State(state): State<ApiState>, Path(game_id): Path<GameId>) -> Response {
    match state.engine.end_game(game_id).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => error_response("end_game", e).into_response(),
    }
}

async fn continue_game_handler(
    State(state): State<ApiState>,
    Path(game_id): Path<GameId>,
) -> Response {
    match state.engine.continue_game(game_id).await {
        Ok(()) => Json(json!({})).into_response(),
        Err(e) => error_response("continue_game", e).into_response(),
    }
}

async fn close_game_handler(
    State(state): State<ApiState>,
    Path(game_id): Path<GameId>,
) -> Response {
    match state.engine.close_game(game_id).await {
        Ok(()) => Json(json!({})).into_response(),
        Err(e) => error_response("close_game", e).into_response(),
    }
}

/// Health check endpoint handler
async fn health_handler(State(state): State<ApiState>) -> impl IntoResponse {
    debug!("Health check requested");

    state.metrics.update_health_status(true);
    Json(json!({
        "serving": true,
        "service": state.service_name,
        "version": crate::VERSION
    }))
}

/// Prometheus metrics endpoint handler
async fn metrics_handler(State(state): State<ApiState>) -> impl IntoResponse {
    debug!("Metrics endpoint requested");

    let registry = state.metrics.registry();
    let metric_families = registry.gather();
    let encoder = TextEncoder::new();

    match encoder.encode_to_string(&metric_families) {
        Ok(metrics_output) => Response::builder()
            .status(StatusCode::OK)
            .header("content-type", encoder.format_type())
            .body(metrics_output)
            .unwrap(),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);

            Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .body("Failed to encode metrics".to_string())
                .unwrap()
        }
    }
}

/// Detailed service statistics endpoint handler
async fn stats_handler(State(state): State<ApiState>) -> Response {
    debug!("Stats endpoint requested");

    match ServiceHealth::gather(&state.engine, &state.service_name).await {
        Ok(health) => Json(json!({
            "service": {
                "name": health.service,
                "version": health.version,
                "status": health.status.to_string(),
            },
            "lobbies": {
                "active": health.stats.active_lobbies,
                "created": health.stats.lobbies_created,
                "removed": health.stats.lobbies_removed,
            },
            "members": {
                "waiting": health.stats.members_waiting,
                "joined": health.stats.members_joined,
                "left": health.stats.members_left,
            },
            "games": {
                "ended": health.stats.games_ended,
                "continued": health.stats.games_continued,
            },
            "timestamp": health.timestamp
        }))
        .into_response(),
        Err(e) => {
            error!("Failed to gather service stats: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "error": "Failed to gather service stats" })),
            )
                .into_response()
        }
    }
}
