//! Delayed-completion scheduler adapter
//!
//! Wraps the runtime's delayed-execution facility behind a small trait so the
//! engine can arm "run this callback after N seconds" and cancel it later,
//! and so tests can fire or drop callbacks by hand.

use std::{fmt, future::Future, pin::Pin, time::Duration};

use tokio::time::sleep;
use tracing::debug;

use crate::error::SchedulingError;

/// Boxed callback invoked when a scheduled delay elapses.
pub type CompletionCallback = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Cancellable reference to a pending callback.
///
/// Cancelling after the callback has begun executing is a safe no-op; the
/// engine's completion guard handles that residual race, not the adapter.
pub struct SchedulerHandle {
    cancel: Box<dyn Fn() -> bool + Send + Sync>,
}

impl SchedulerHandle {
    pub fn new(cancel: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        Self {
            cancel: Box::new(cancel),
        }
    }

    /// Cancel the pending callback. Returns `true` if it had not yet run.
    pub fn cancel(&self) -> bool {
        (self.cancel)()
    }
}

impl fmt::Debug for SchedulerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SchedulerHandle")
    }
}

/// Arms a callback to run after a delay and returns a cancellable handle.
pub trait Scheduler: Send + Sync {
    /// Schedule `callback` to run after `delay_seconds`.
    ///
    /// A zero or negative delay must invoke the callback as soon as
    /// practical rather than fail.
    fn schedule(
        &self,
        delay_seconds: f64,
        callback: CompletionCallback,
    ) -> Result<SchedulerHandle, SchedulingError>;
}

/// Scheduler backed by a spawned tokio task.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn schedule(
        &self,
        delay_seconds: f64,
        callback: CompletionCallback,
    ) -> Result<SchedulerHandle, SchedulingError> {
        let delay = Duration::from_secs_f64(delay_seconds.max(0.0));
        debug!("Arming completion callback in {:.1}s", delay.as_secs_f64());

        let task = tokio::spawn(async move {
            sleep(delay).await;
            callback.await;
        });

        let abort = task.abort_handle();
        Ok(SchedulerHandle::new(move || {
            let pending = !abort.is_finished();
            abort.abort();
            pending
        }))
    }
}
