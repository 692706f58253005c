//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod capture;
pub mod config;
pub mod uploader;

pub use capture::{CaptureDevice, CaptureError, CaptureEvent, CaptureSink, CaptureStream};
pub use config::ConfigStore;
pub use uploader::{UploadError, UploadTransport};
