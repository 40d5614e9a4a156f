//! Main application state wiring

use std::{sync::Arc, time::Instant};

use crate::auth::WebAppAuthenticator;
use crate::clock::{Clock, SystemClock};
use crate::engine::TimerEngine;
use crate::scheduler::{Scheduler, TokioScheduler};
use crate::services::notifier::{CompletionNotifier, LoggingNotifier};
use crate::services::sessions::{LoggingSessionSink, SessionSink};

/// Everything the HTTP handlers need: the timer engine, the request
/// authenticator, and server metadata.
pub struct AppState {
    pub engine: TimerEngine,
    pub auth: WebAppAuthenticator,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
}

impl AppState {
    /// Production wiring: system clock, tokio scheduler, logging
    /// collaborators.
    pub fn new(port: u16, host: String, bot_token: &str, auth_max_age_secs: u64) -> Self {
        Self::with_collaborators(
            port,
            host,
            bot_token,
            auth_max_age_secs,
            Arc::new(TokioScheduler),
            Arc::new(SystemClock),
            Arc::new(LoggingSessionSink),
            Arc::new(LoggingNotifier),
        )
    }

    /// Wiring with injected collaborators, used by tests and by embedders
    /// that bring their own persistence or notification channel.
    #[allow(clippy::too_many_arguments)]
    pub fn with_collaborators(
        port: u16,
        host: String,
        bot_token: &str,
        auth_max_age_secs: u64,
        scheduler: Arc<dyn Scheduler>,
        clock: Arc<dyn Clock>,
        sessions: Arc<dyn SessionSink>,
        notifier: Arc<dyn CompletionNotifier>,
    ) -> Self {
        Self {
            engine: TimerEngine::new(scheduler, clock, sessions, notifier),
            auth: WebAppAuthenticator::new(bot_token, auth_max_age_secs),
            start_time: Instant::now(),
            port,
            host,
        }
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }
}
