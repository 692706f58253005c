//! Upload transport port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::upload::{UploadRequest, UploadResult};

/// Upload errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error: {status}")]
    Status { status: u16 },

    #[error("Invalid server response: {0}")]
    InvalidResponse(String),

    #[error("Upload interrupted: {0}")]
    Interrupted(String),
}

/// Port for submitting a finished recording to the backend
#[async_trait]
pub trait UploadTransport: Send + Sync {
    /// Submit one recording. Exactly one request is made per call.
    ///
    /// # Arguments
    /// * `request` - Audio payload, negotiated format and selected template
    ///
    /// # Returns
    /// The backend acknowledgment or a typed failure
    async fn upload(&self, request: UploadRequest) -> Result<UploadResult, UploadError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_includes_code() {
        let err = UploadError::Status { status: 500 };
        assert_eq!(err.to_string(), "Server error: 500");
    }
}
