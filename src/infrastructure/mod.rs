//! Infrastructure layer - Adapters for external systems
//!
//! Implements the port interfaces defined in the application layer.

pub mod capture;
pub mod config;
pub mod upload;

pub use capture::CpalCaptureDevice;
pub use config::XdgConfigStore;
pub use upload::{HealthStatus, HttpUploadTransport};
