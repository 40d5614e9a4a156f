//! Per-user timer record and its derived snapshot

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scheduler::SchedulerHandle;

/// Chat user identifier owning a timer.
pub type UserId = i64;

/// Duration used when none is requested, and reported for idle users.
pub const DEFAULT_DURATION_MINUTES: u32 = 25;

/// Tolerance band, in minutes, when deciding whether a stopped interval
/// counts as completed. A stop within this margin of the target is treated
/// the same as natural completion.
pub const COMPLETION_EPSILON_MINUTES: f64 = 0.01;

/// Lifecycle phase of a timer interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerPhase {
    Running,
    Paused,
    Stopped,
    Finished,
}

/// Whether the interval is a work session or a break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    Work,
    Break,
}

impl Default for SessionType {
    fn default() -> Self {
        SessionType::Work
    }
}

/// Live state of one user's timer interval.
///
/// Exactly one record exists per user while a timer is running or paused;
/// absence means idle. Stopped/finished phases appear only in snapshots taken
/// while consuming the record, never in the store.
#[derive(Debug)]
pub struct TimerRecord {
    pub phase: TimerPhase,
    pub session_type: SessionType,
    /// Target length in whole minutes, bounded 1..=120.
    pub duration_minutes: u32,
    /// Beginning of the current running segment. Meaningful only while
    /// running.
    pub start_time: DateTime<Utc>,
    /// Beginning of the very first segment; persisted with the finished
    /// session, never used for arithmetic.
    pub initial_start_time: DateTime<Utc>,
    /// Minutes elapsed across all prior running segments. Frozen while
    /// paused.
    pub accumulated_minutes: f64,
    /// Identifies the currently armed completion callback. A firing callback
    /// carrying a different generation is stale and must not act.
    pub generation: u64,
    /// Pending completion callback. `Some` iff running.
    pub handle: Option<SchedulerHandle>,
}

impl TimerRecord {
    /// Create a freshly started, running record.
    pub fn started(
        duration_minutes: u32,
        session_type: SessionType,
        now: DateTime<Utc>,
        generation: u64,
        handle: SchedulerHandle,
    ) -> Self {
        Self {
            phase: TimerPhase::Running,
            session_type,
            duration_minutes,
            start_time: now,
            initial_start_time: now,
            accumulated_minutes: 0.0,
            generation,
            handle: Some(handle),
        }
    }

    /// Minutes elapsed in the current running segment.
    pub fn segment_minutes(&self, now: DateTime<Utc>) -> f64 {
        (now - self.start_time).num_milliseconds() as f64 / 60_000.0
    }

    /// Fold the current running segment into the accumulated total.
    pub fn fold_segment(&mut self, now: DateTime<Utc>) {
        self.accumulated_minutes += self.segment_minutes(now);
    }

    /// Minutes left on the target, not counting any in-flight segment.
    pub fn remaining_minutes(&self) -> f64 {
        f64::from(self.duration_minutes) - self.accumulated_minutes
    }

    /// Whether the accumulated time reaches the target, within the
    /// completion tolerance band.
    pub fn is_complete(&self) -> bool {
        self.accumulated_minutes >= f64::from(self.duration_minutes) - COMPLETION_EPSILON_MINUTES
    }

    /// Clone the observable fields, leaving the scheduler handle behind.
    pub fn snapshot(&self) -> RecordSnapshot {
        RecordSnapshot {
            phase: self.phase,
            session_type: self.session_type,
            duration_minutes: self.duration_minutes,
            start_time: self.start_time,
            initial_start_time: self.initial_start_time,
            accumulated_minutes: self.accumulated_minutes,
        }
    }
}

/// Observable copy of a [`TimerRecord`] without its scheduler handle.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSnapshot {
    pub phase: TimerPhase,
    pub session_type: SessionType,
    pub duration_minutes: u32,
    pub start_time: DateTime<Utc>,
    pub initial_start_time: DateTime<Utc>,
    pub accumulated_minutes: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record_at(duration: u32, start: DateTime<Utc>) -> TimerRecord {
        TimerRecord::started(
            duration,
            SessionType::Work,
            start,
            1,
            SchedulerHandle::new(|| true),
        )
    }

    #[test]
    fn segment_minutes_from_wall_clock_difference() {
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
        let record = record_at(25, start);
        let now = start + chrono::Duration::seconds(600);
        assert!((record.segment_minutes(now) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn fold_segment_accumulates() {
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
        let mut record = record_at(25, start);
        record.fold_segment(start + chrono::Duration::seconds(90));
        assert!((record.accumulated_minutes - 1.5).abs() < 1e-9);
        assert!((record.remaining_minutes() - 23.5).abs() < 1e-9);
    }

    #[test]
    fn completion_tolerance_band() {
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
        let mut record = record_at(25, start);
        record.accumulated_minutes = 24.995;
        assert!(record.is_complete());
        record.accumulated_minutes = 24.5;
        assert!(!record.is_complete());
    }
}
