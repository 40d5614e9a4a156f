//! Timer state engine
//!
//! Owns the per-user state machine for start/pause/resume/stop and the
//! scheduled completion that fires when an interval elapses. Every state
//! transition runs inside the store's critical section for that user,
//! including arming and cancelling the completion callback, so a completion
//! can never slip in between a decision to cancel and its effect. The one
//! unavoidable residual race — a callback that already began executing before
//! its cancellation — is absorbed by the generation guard in [`TimerEngine::complete`].

pub mod projection;

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::error::{TimerError, MAX_DURATION_MINUTES, MIN_DURATION_MINUTES};
use crate::scheduler::{Scheduler, SchedulerHandle};
use crate::services::notifier::CompletionNotifier;
use crate::services::sessions::{CompletedSession, SessionSink};
use crate::state::record::{RecordSnapshot, SessionType, TimerPhase, TimerRecord, UserId};
use crate::state::store::TimerStore;

use projection::TimerSnapshot;

/// The per-user timer state machine and its collaborators.
///
/// Cheap to clone; clones share the same store, so the engine can hand a
/// copy of itself to each armed completion callback.
#[derive(Clone)]
pub struct TimerEngine {
    store: Arc<TimerStore>,
    scheduler: Arc<dyn Scheduler>,
    clock: Arc<dyn Clock>,
    sessions: Arc<dyn SessionSink>,
    notifier: Arc<dyn CompletionNotifier>,
    generations: Arc<AtomicU64>,
}

impl TimerEngine {
    pub fn new(
        scheduler: Arc<dyn Scheduler>,
        clock: Arc<dyn Clock>,
        sessions: Arc<dyn SessionSink>,
        notifier: Arc<dyn CompletionNotifier>,
    ) -> Self {
        Self {
            store: Arc::new(TimerStore::new()),
            scheduler,
            clock,
            sessions,
            notifier,
            generations: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Current wall-clock reading, for callers projecting snapshots.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Start a new timer interval for `user`.
    pub async fn start(
        &self,
        user: UserId,
        duration_minutes: u32,
        session_type: SessionType,
    ) -> Result<RecordSnapshot, TimerError> {
        if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&duration_minutes) {
            return Err(TimerError::InvalidDuration(duration_minutes));
        }

        let generation = self.next_generation();
        let snapshot = self
            .store
            .with_slot(user, |slot| {
                if slot.is_some() {
                    return Err(TimerError::AlreadyActive);
                }
                let handle =
                    self.arm(user, generation, f64::from(duration_minutes) * 60.0)?;
                let record = TimerRecord::started(
                    duration_minutes,
                    session_type,
                    self.clock.now(),
                    generation,
                    handle,
                );
                let snapshot = record.snapshot();
                *slot = Some(record);
                Ok(snapshot)
            })
            .await?;

        info!(
            "Timer started: user={} {:?} for {}min",
            user, session_type, duration_minutes
        );
        Ok(snapshot)
    }

    /// Pause the running timer, freezing its accumulated time.
    pub async fn pause(&self, user: UserId) -> Result<RecordSnapshot, TimerError> {
        let snapshot = self
            .store
            .with_slot(user, |slot| {
                let record = match slot {
                    Some(record) if record.phase == TimerPhase::Running => record,
                    _ => return Err(TimerError::NotRunning),
                };
                if let Some(handle) = record.handle.take() {
                    handle.cancel();
                }
                record.fold_segment(self.clock.now());
                record.phase = TimerPhase::Paused;
                Ok(record.snapshot())
            })
            .await?;

        info!(
            "Timer paused: user={} accumulated={:.2}min",
            user, snapshot.accumulated_minutes
        );
        Ok(snapshot)
    }

    /// Resume a paused timer, re-arming completion for the time left.
    pub async fn resume(&self, user: UserId) -> Result<RecordSnapshot, TimerError> {
        let generation = self.next_generation();
        let snapshot = self
            .store
            .with_slot(user, |slot| {
                let record = match slot {
                    Some(record) if record.phase == TimerPhase::Paused => record,
                    _ => return Err(TimerError::NotPaused),
                };
                // Arm before mutating so a scheduling failure leaves the
                // record paused. A non-positive remainder fires immediately.
                let handle = self.arm(user, generation, record.remaining_minutes() * 60.0)?;
                record.start_time = self.clock.now();
                record.phase = TimerPhase::Running;
                record.generation = generation;
                record.handle = Some(handle);
                Ok(record.snapshot())
            })
            .await?;

        info!(
            "Timer resumed: user={} {:.2}min remaining",
            user,
            snapshot.duration_minutes as f64 - snapshot.accumulated_minutes
        );
        Ok(snapshot)
    }

    /// Stop the active timer, consuming the record and persisting the
    /// (possibly partial) session.
    pub async fn stop(&self, user: UserId) -> Result<CompletedSession, TimerError> {
        let session = self
            .store
            .with_slot(user, |slot| {
                let mut record = slot.take().ok_or(TimerError::NoActiveTimer)?;
                if let Some(handle) = record.handle.take() {
                    handle.cancel();
                }
                if record.phase == TimerPhase::Running {
                    record.fold_segment(self.clock.now());
                }
                record.phase = TimerPhase::Stopped;
                Ok::<_, TimerError>(finalize(user, &record))
            })
            .await?;

        info!(
            "Timer stopped: user={} actual={:.2}/{}min completed={}",
            user, session.duration_actual_minutes, session.duration_target_minutes, session.completed
        );
        self.persist(&session).await;
        Ok(session)
    }

    /// Scheduled-callback entry point: finish the interval naturally.
    ///
    /// No-ops silently unless the record still exists, is still running, and
    /// still belongs to the callback's generation — any mutation that raced
    /// ahead (stop, pause, resume) already superseded this firing.
    pub async fn complete(&self, user: UserId, generation: u64) -> Option<CompletedSession> {
        let session = self
            .store
            .with_slot(user, |slot| match slot.take() {
                Some(mut record)
                    if record.phase == TimerPhase::Running
                        && record.generation == generation =>
                {
                    record.handle = None;
                    record.accumulated_minutes = f64::from(record.duration_minutes);
                    record.phase = TimerPhase::Finished;
                    Some(finalize(user, &record))
                }
                other => {
                    *slot = other;
                    debug!(
                        "Stale completion for user={} gen={} ignored",
                        user, generation
                    );
                    None
                }
            })
            .await?;

        info!(
            "Timer completed: user={} {:?} {}min",
            user, session.session_type, session.duration_target_minutes
        );
        self.persist(&session).await;
        self.notifier.timer_finished(&session).await;
        Some(session)
    }

    /// Project the countdown view for `user` at the current time.
    pub async fn status(&self, user: UserId) -> TimerSnapshot {
        let record = self.store.snapshot(user).await;
        projection::project(record.as_ref(), self.clock.now())
    }

    fn next_generation(&self) -> u64 {
        self.generations.fetch_add(1, Ordering::Relaxed)
    }

    /// Arm a completion callback for `user`. Called inside the store's
    /// critical section; the callback itself locks the store when it fires,
    /// so a zero delay still observes the committed record.
    fn arm(
        &self,
        user: UserId,
        generation: u64,
        delay_seconds: f64,
    ) -> Result<SchedulerHandle, crate::error::SchedulingError> {
        let engine = self.clone();
        self.scheduler.schedule(
            delay_seconds,
            Box::pin(async move {
                engine.complete(user, generation).await;
            }),
        )
    }

    /// Hand the finalized session to the storage collaborator. Runs after
    /// the record is already out of the store; failure is logged, not
    /// propagated.
    async fn persist(&self, session: &CompletedSession) {
        if let Err(e) = self.sessions.record(session.clone()).await {
            warn!("Session for user {} was not persisted: {}", session.user_id, e);
        }
    }
}

/// Build the finalized-session record from a consumed timer record.
fn finalize(user: UserId, record: &TimerRecord) -> CompletedSession {
    CompletedSession {
        user_id: user,
        project_id: None,
        task_id: None,
        session_type: record.session_type,
        start_time: record.initial_start_time,
        duration_target_minutes: record.duration_minutes,
        duration_actual_minutes: record.accumulated_minutes,
        completed: record.is_complete(),
    }
}
