//! Application layer - Use cases and port interfaces
//!
//! Contains the recording session use case and the trait definitions
//! for the capture runtime, the backend and config storage.

pub mod events;
pub mod ports;
pub mod session;

pub use events::SessionEvent;
pub use session::{RecordingSessionController, SessionCommand, PERMISSION_DENIED_MESSAGE};
