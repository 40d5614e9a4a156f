//! HTTP endpoint handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::{Html, Json},
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::auth::INIT_DATA_HEADER;
use crate::engine::projection::{project, TimerSnapshot};
use crate::state::record::{SessionType, TimerPhase, UserId, DEFAULT_DURATION_MINUTES};
use crate::state::AppState;

use super::responses::{ApiError, ApiResponse, HealthResponse};

/// Request body for POST .../start. Both fields may be omitted.
#[derive(Debug, Deserialize)]
pub struct StartTimerRequest {
    #[serde(default = "default_duration")]
    pub duration_minutes: u32,
    #[serde(default)]
    pub session_type: SessionType,
}

fn default_duration() -> u32 {
    DEFAULT_DURATION_MINUTES
}

impl Default for StartTimerRequest {
    fn default() -> Self {
        Self {
            duration_minutes: DEFAULT_DURATION_MINUTES,
            session_type: SessionType::Work,
        }
    }
}

fn session_label(session_type: SessionType) -> &'static str {
    match session_type {
        SessionType::Work => "Work",
        SessionType::Break => "Break",
    }
}

/// Check the signed payload on a state-mutating request.
///
/// Every failure maps to the same unauthorized response; the sub-reason is
/// only logged.
fn authorize_mutation(
    state: &AppState,
    headers: &HeaderMap,
    user_id: UserId,
) -> Result<(), ApiError> {
    let raw = headers
        .get(INIT_DATA_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");

    state
        .auth
        .verify(raw, state.engine.now())
        .and_then(|payload| payload.require_user(user_id))
        .map_err(|e| {
            warn!(
                "Rejected control request for user {}: {} ({})",
                user_id,
                e,
                e.reason()
            );
            ApiError::Unauthorized
        })
}

/// Handle POST /api/timer/:user_id/start
pub async fn start_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>,
    headers: HeaderMap,
    body: Option<Json<StartTimerRequest>>,
) -> Result<Json<ApiResponse>, ApiError> {
    authorize_mutation(&state, &headers, user_id)?;
    let Json(request) = body.unwrap_or_default();

    let record = state
        .engine
        .start(user_id, request.duration_minutes, request.session_type)
        .await?;

    info!("Start endpoint called for user {}", user_id);
    let message = format!(
        "{} timer started ({} minutes)",
        session_label(record.session_type),
        record.duration_minutes
    );
    Ok(Json(ApiResponse::ok(
        message,
        project(Some(&record), state.engine.now()),
    )))
}

/// Handle POST /api/timer/:user_id/pause
pub async fn pause_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse>, ApiError> {
    authorize_mutation(&state, &headers, user_id)?;

    let record = state.engine.pause(user_id).await?;

    info!("Pause endpoint called for user {}", user_id);
    let message = format!(
        "{} timer paused. Accumulated time: {:.2} minutes",
        session_label(record.session_type),
        record.accumulated_minutes
    );
    Ok(Json(ApiResponse::ok(
        message,
        project(Some(&record), state.engine.now()),
    )))
}

/// Handle POST /api/timer/:user_id/resume
pub async fn resume_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse>, ApiError> {
    authorize_mutation(&state, &headers, user_id)?;

    let record = state.engine.resume(user_id).await?;

    info!("Resume endpoint called for user {}", user_id);
    let message = format!(
        "{} timer resumed. {:.2} minutes remaining",
        session_label(record.session_type),
        f64::from(record.duration_minutes) - record.accumulated_minutes
    );
    Ok(Json(ApiResponse::ok(
        message,
        project(Some(&record), state.engine.now()),
    )))
}

/// Handle POST /api/timer/:user_id/stop
pub async fn stop_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse>, ApiError> {
    authorize_mutation(&state, &headers, user_id)?;

    let session = state.engine.stop(user_id).await?;

    info!("Stop endpoint called for user {}", user_id);
    let message = format!(
        "{} timer stopped. Duration: {:.2} / {} minutes",
        session_label(session.session_type),
        session.duration_actual_minutes,
        session.duration_target_minutes
    );
    Ok(Json(ApiResponse::ok(
        message,
        TimerSnapshot {
            state: TimerPhase::Stopped,
            session_type: session.session_type,
            duration: session.duration_target_minutes,
            remaining_seconds: 0,
        },
    )))
}

/// Handle GET /api/timer/:user_id/status
///
/// Anonymous reads are permitted; absence of a timer is a valid, queryable
/// state and returns a synthetic stopped snapshot.
pub async fn status_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>,
) -> Json<TimerSnapshot> {
    Json(state.engine.status(user_id).await)
}

/// Handle GET /timer/:user_id - the embedded countdown page
pub async fn timer_page_handler(Path(_user_id): Path<UserId>) -> Html<&'static str> {
    Html(include_str!("../../assets/timer.html"))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse::ok(state.get_uptime()))
}
