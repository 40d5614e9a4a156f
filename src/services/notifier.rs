//! Completion notification seam
//!
//! When a timer runs to its natural end there is no inbound request to answer,
//! so the engine pushes the news through this trait. The chat delivery layer
//! implements it; here only a logging stand-in ships.

use async_trait::async_trait;
use tracing::info;

use super::sessions::CompletedSession;

/// Receives word that a user's timer finished on its own.
#[async_trait]
pub trait CompletionNotifier: Send + Sync {
    async fn timer_finished(&self, session: &CompletedSession);
}

/// Notifier that only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingNotifier;

#[async_trait]
impl CompletionNotifier for LoggingNotifier {
    async fn timer_finished(&self, session: &CompletedSession) {
        info!(
            "Timer finished for user {}: {:?} session, {} minutes",
            session.user_id, session.session_type, session.duration_target_minutes,
        );
    }
}
