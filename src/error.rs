//! Error types shared across the timer engine and web layer.

use thiserror::Error;

/// Bounds accepted for a timer duration, in minutes.
pub const MIN_DURATION_MINUTES: u32 = 1;
pub const MAX_DURATION_MINUTES: u32 = 120;

/// Errors returned by timer engine operations.
///
/// All of these are per-user and recoverable: the caller surfaces a message
/// and the user adjusts their action. None of them leave the store in a
/// partially-mutated state.
#[derive(Debug, Error)]
pub enum TimerError {
    /// A timer is already running or paused for this user.
    #[error("a timer is already running or paused")]
    AlreadyActive,

    /// Requested duration is outside the accepted bounds.
    #[error("duration must be between {MIN_DURATION_MINUTES} and {MAX_DURATION_MINUTES} minutes, got {0}")]
    InvalidDuration(u32),

    /// Pause requested but no timer is running.
    #[error("no timer is running")]
    NotRunning,

    /// Resume requested but no timer is paused.
    #[error("no timer is paused")]
    NotPaused,

    /// Stop requested but no timer exists at all.
    #[error("no timer is running or paused")]
    NoActiveTimer,

    /// The scheduler failed to arm a completion callback. The state
    /// transition that needed it has been rolled back.
    #[error(transparent)]
    Scheduling(#[from] SchedulingError),
}

/// The scheduler adapter could not arm a completion callback.
#[derive(Debug, Error)]
#[error("failed to schedule timer completion: {reason}")]
pub struct SchedulingError {
    pub reason: String,
}

impl SchedulingError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Authentication failures for signed web requests.
///
/// The sub-reason is for diagnostics only; the HTTP layer maps every variant
/// to the same unauthorized response.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    /// Payload was empty or carried no signature field.
    #[error("payload is empty or missing its signature")]
    Empty,

    /// Supplied signature does not match the computed one.
    #[error("payload signature mismatch")]
    HashMismatch,

    /// Payload issuance timestamp is older than the freshness window,
    /// or absent so freshness cannot be proven.
    #[error("payload is older than {max_age_secs}s")]
    Stale { max_age_secs: u64 },

    /// Authenticated identity does not match the timer being mutated.
    #[error("authenticated user does not match the requested timer")]
    IdentityMismatch,
}

impl AuthError {
    /// Stable sub-reason label used in diagnostic logs.
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::Empty => "empty",
            AuthError::HashMismatch => "hash_mismatch",
            AuthError::Stale { .. } => "stale",
            AuthError::IdentityMismatch => "identity_mismatch",
        }
    }
}

/// The persistence collaborator failed to record a finalized session.
#[derive(Debug, Error)]
#[error("failed to persist session: {reason}")]
pub struct SessionSinkError {
    pub reason: String,
}

impl SessionSinkError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}
