//! API response structures

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::projection::TimerSnapshot;
use crate::error::TimerError;

/// API response structure for timer control endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timer: Option<TimerSnapshot>,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: String, message: String, timer: Option<TimerSnapshot>) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            timer,
        }
    }

    /// Create a success response carrying the current countdown view
    pub fn ok(message: String, timer: TimerSnapshot) -> Self {
        Self::new("ok".to_string(), message, Some(timer))
    }

    /// Create an error response
    pub fn error(message: String) -> Self {
        Self::new("error".to_string(), message, None)
    }

    /// The uniform unauthorized response. Deliberately carries no detail
    /// about which check failed.
    pub fn unauthorized() -> Self {
        Self::new("unauthorized".to_string(), "unauthorized".to_string(), None)
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub uptime: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok(uptime: String) -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime,
        }
    }
}

/// Failure result of a control endpoint, carrying its HTTP mapping.
#[derive(Debug)]
pub enum ApiError {
    Timer(TimerError),
    Unauthorized,
}

impl From<TimerError> for ApiError {
    fn from(e: TimerError) -> Self {
        ApiError::Timer(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(ApiResponse::unauthorized()),
            )
                .into_response(),
            ApiError::Timer(e) => {
                let status = match &e {
                    TimerError::InvalidDuration(_) => StatusCode::BAD_REQUEST,
                    TimerError::AlreadyActive
                    | TimerError::NotRunning
                    | TimerError::NotPaused
                    | TimerError::NoActiveTimer => StatusCode::CONFLICT,
                    TimerError::Scheduling(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, Json(ApiResponse::error(e.to_string()))).into_response()
            }
        }
    }
}
