//! Messages delivered into the session controller's inbox

use crate::domain::upload::UploadResult;

use super::ports::{CaptureEvent, UploadError};

/// An asynchronous completion addressed to the session controller.
///
/// Every event names the capture it belongs to, so completions from an
/// earlier recording can never act on the current one.
#[derive(Debug)]
pub enum SessionEvent {
    /// Emitted by the capture device
    Capture { capture_id: u64, event: CaptureEvent },
    /// The upload of a finalized capture resolved
    UploadFinished {
        capture_id: u64,
        outcome: Result<UploadResult, UploadError>,
    },
}

impl SessionEvent {
    pub fn capture_id(&self) -> u64 {
        match self {
            Self::Capture { capture_id, .. } | Self::UploadFinished { capture_id, .. } => {
                *capture_id
            }
        }
    }
}
