//! Focus Timer - per-user Pomodoro timer engine with a web countdown view
//!
//! This library tracks one work/break interval per chat user across
//! pause/resume cycles, fires a scheduled completion when the interval
//! elapses, and exposes an authenticated polling API that a web countdown
//! page reconciles against.

pub mod api;
pub mod auth;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod scheduler;
pub mod services;
pub mod state;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use engine::TimerEngine;
pub use state::AppState;
pub use utils::signals::shutdown_signal;
