//! Domain layer - Core business logic
//!
//! Contains value objects, the recording session state machine, and domain errors.
//! This layer has no dependencies on external systems.

pub mod config;
pub mod error;
pub mod recording;
pub mod session;
pub mod template;
pub mod upload;

// Re-export common types
pub use config::AppConfig;
pub use error::*;
pub use recording::{AudioChunkBuffer, Duration, NegotiatedFormat};
pub use session::{InvalidStateTransition, RecordingSession, SessionSnapshot, SessionState};
pub use template::{Template, TemplateCatalog, TemplateId};
pub use upload::{UploadRequest, UploadResult};
