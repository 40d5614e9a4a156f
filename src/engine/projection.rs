//! Point-in-time status projection
//!
//! Pure derivation of the countdown view from a timer record and the current
//! time. Both the web status endpoint and chat confirmations render from
//! this, so neither path mutates anything to answer "how much is left".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::record::{
    RecordSnapshot, SessionType, TimerPhase, DEFAULT_DURATION_MINUTES,
};

/// Snapshot served to the polling web client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub state: TimerPhase,
    pub session_type: SessionType,
    /// Target length in minutes.
    pub duration: u32,
    pub remaining_seconds: u64,
}

/// Project the countdown view for a user at `now`.
///
/// Absence of a record is a valid, queryable state and projects as a
/// synthetic stopped snapshot. A running record whose remaining time has
/// reached zero projects as finished even if the completion callback has not
/// fired yet, so displays never show a running timer at 0:00.
pub fn project(record: Option<&RecordSnapshot>, now: DateTime<Utc>) -> TimerSnapshot {
    let Some(record) = record else {
        return TimerSnapshot {
            state: TimerPhase::Stopped,
            session_type: SessionType::Work,
            duration: DEFAULT_DURATION_MINUTES,
            remaining_seconds: 0,
        };
    };

    let remaining_seconds = match record.phase {
        TimerPhase::Running => {
            let elapsed = (now - record.start_time).num_milliseconds() as f64 / 60_000.0;
            let remaining =
                f64::from(record.duration_minutes) - (record.accumulated_minutes + elapsed);
            to_clamped_seconds(remaining)
        }
        TimerPhase::Paused => {
            to_clamped_seconds(f64::from(record.duration_minutes) - record.accumulated_minutes)
        }
        TimerPhase::Stopped | TimerPhase::Finished => 0,
    };

    let state = if record.phase == TimerPhase::Running && remaining_seconds == 0 {
        TimerPhase::Finished
    } else {
        record.phase
    };

    TimerSnapshot {
        state,
        session_type: record.session_type,
        duration: record.duration_minutes,
        remaining_seconds,
    }
}

fn to_clamped_seconds(minutes: f64) -> u64 {
    let seconds = (minutes * 60.0).round();
    if seconds > 0.0 {
        seconds as u64
    } else {
        0
    }
}
