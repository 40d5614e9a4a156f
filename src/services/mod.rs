//! External collaborator seams
//!
//! Interfaces to the systems this server talks to but does not own: durable
//! session storage and chat-side completion notification.

pub mod notifier;
pub mod sessions;

// Re-export main types
pub use notifier::{CompletionNotifier, LoggingNotifier};
pub use sessions::{CompletedSession, LoggingSessionSink, SessionSink};
