//! State management module
//!
//! The per-user timer records, the shared store serializing access to them,
//! and the top-level application state handed to the HTTP layer.

pub mod app_state;
pub mod record;
pub mod store;

// Re-export main types
pub use app_state::AppState;
pub use record::{RecordSnapshot, SessionType, TimerPhase, TimerRecord, UserId};
pub use store::TimerStore;
