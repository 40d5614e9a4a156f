//! Finalized-session persistence seam
//!
//! The engine emits one [`CompletedSession`] when an interval terminates
//! (stop or natural completion). How and whether it is durably stored is the
//! storage layer's business; the engine only logs the outcome.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::error::SessionSinkError;
use crate::state::record::{SessionType, UserId};

/// Finalized (possibly partial) interval handed to the storage layer.
#[derive(Debug, Clone, Serialize)]
pub struct CompletedSession {
    pub user_id: UserId,
    /// Project the work session was booked against, when one was selected.
    pub project_id: Option<i64>,
    pub task_id: Option<i64>,
    pub session_type: SessionType,
    /// Start of the very first running segment.
    pub start_time: DateTime<Utc>,
    pub duration_target_minutes: u32,
    /// Minutes actually accumulated across all running segments.
    pub duration_actual_minutes: f64,
    /// Whether the target was reached (within the completion tolerance).
    pub completed: bool,
}

/// Destination for finalized sessions.
#[async_trait]
pub trait SessionSink: Send + Sync {
    async fn record(&self, session: CompletedSession) -> Result<(), SessionSinkError>;
}

/// Sink that only logs the session. Stands in where no database is wired up.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingSessionSink;

#[async_trait]
impl SessionSink for LoggingSessionSink {
    async fn record(&self, session: CompletedSession) -> Result<(), SessionSinkError> {
        info!(
            "Session finalized: user={} type={:?} actual={:.2}/{}min completed={}",
            session.user_id,
            session.session_type,
            session.duration_actual_minutes,
            session.duration_target_minutes,
            session.completed,
        );
        Ok(())
    }
}
