//! Capture device port interfaces

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::application::events::SessionEvent;
use crate::domain::recording::NegotiatedFormat;

/// Capture device errors
#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    #[error("Microphone access denied: {0}")]
    PermissionDenied(String),

    #[error("No audio input device available")]
    NoInputDevice,

    #[error("Failed to start capture: {0}")]
    StartFailed(String),

    #[error("Failed to stop capture: {0}")]
    StopFailed(String),
}

/// Events a capture stream emits while it is open
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    /// A fragment of encoded audio
    Data(Vec<u8>),
    /// The device flushed its last fragment after a stop
    Finalized,
    /// The device could not produce the recording; no finalize follows
    Failed(String),
}

/// Handle a capture stream uses to deliver its events to the controller
#[derive(Debug, Clone)]
pub struct CaptureSink {
    capture_id: u64,
    inbox: mpsc::UnboundedSender<SessionEvent>,
}

impl CaptureSink {
    pub fn new(capture_id: u64, inbox: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self { capture_id, inbox }
    }

    pub fn capture_id(&self) -> u64 {
        self.capture_id
    }

    /// Deliver a data fragment; returns false once the controller is gone
    pub fn data(&self, chunk: Vec<u8>) -> bool {
        self.send(CaptureEvent::Data(chunk))
    }

    /// Signal that the device has flushed everything
    pub fn finalized(&self) -> bool {
        self.send(CaptureEvent::Finalized)
    }

    /// Report that the recording is lost. Takes the place of `finalized`.
    pub fn failed(&self, reason: impl Into<String>) -> bool {
        self.send(CaptureEvent::Failed(reason.into()))
    }

    fn send(&self, event: CaptureEvent) -> bool {
        self.inbox
            .send(SessionEvent::Capture {
                capture_id: self.capture_id,
                event,
            })
            .is_ok()
    }
}

/// Port for the audio capture runtime
#[async_trait]
pub trait CaptureDevice: Send + Sync {
    /// Whether the runtime can record the given format identifier
    fn supports_format(&self, format: &str) -> bool;

    /// Request access to the input device.
    ///
    /// # Returns
    /// An opened, idle capture stream, or the reason access was refused
    async fn open(&self) -> Result<Box<dyn CaptureStream>, CaptureError>;
}

/// An opened capture stream holding the input hardware
pub trait CaptureStream: Send {
    /// Begin capturing in `format` (empty means runtime default).
    /// Data and finalize events go to `sink`.
    fn start(&mut self, format: &NegotiatedFormat, sink: CaptureSink) -> Result<(), CaptureError>;

    /// Whether the stream is currently capturing
    fn is_recording(&self) -> bool;

    /// Ask the device to stop. The device flushes pending data and then
    /// emits `CaptureEvent::Finalized` through the sink, or
    /// `CaptureEvent::Failed` when the recording could not be produced.
    fn stop(&mut self) -> Result<(), CaptureError>;

    /// Release the hardware. Safe to call more than once.
    fn release(&mut self);
}

/// Blanket implementation for boxed capture devices
#[async_trait]
impl CaptureDevice for Box<dyn CaptureDevice> {
    fn supports_format(&self, format: &str) -> bool {
        self.as_ref().supports_format(format)
    }

    async fn open(&self) -> Result<Box<dyn CaptureStream>, CaptureError> {
        self.as_ref().open().await
    }
}
