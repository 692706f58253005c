//! Recording format negotiation

use std::fmt;

/// Candidate formats, highest preference first.
///
/// Opus in WebM where available, plain WebM as the fallback for the same
/// container family, MP4 for runtimes without WebM, Ogg/Opus last.
pub const CANDIDATE_FORMATS: [&str; 4] = [
    "audio/webm;codecs=opus",
    "audio/webm",
    "audio/mp4",
    "audio/ogg;codecs=opus",
];

/// Content type sent when the runtime picked its own default
const DEFAULT_CONTENT_TYPE: &str = "audio/webm";

/// Format identifier agreed with the capture runtime for one recording.
/// An empty identifier leaves the choice to the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct NegotiatedFormat(String);

impl NegotiatedFormat {
    pub fn new(format: impl Into<String>) -> Self {
        Self(format.into())
    }

    /// The runtime-default format
    pub fn runtime_default() -> Self {
        Self(String::new())
    }

    /// Pick the first candidate the runtime supports, else the runtime default
    pub fn negotiate<F>(is_supported: F) -> Self
    where
        F: Fn(&str) -> bool,
    {
        CANDIDATE_FORMATS
            .iter()
            .find(|candidate| is_supported(candidate))
            .map(|candidate| Self::new(*candidate))
            .unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_runtime_default(&self) -> bool {
        self.0.is_empty()
    }

    /// File extension label for the upload
    pub fn file_extension(&self) -> &'static str {
        if self.0.contains("mp4") {
            "m4a"
        } else if self.0.contains("ogg") {
            "ogg"
        } else {
            "webm"
        }
    }

    /// File name sent with the upload
    pub fn file_name(&self) -> String {
        format!("recording.{}", self.file_extension())
    }

    /// Content type of the uploaded audio part
    pub fn content_type(&self) -> &str {
        if self.is_runtime_default() {
            DEFAULT_CONTENT_TYPE
        } else {
            &self.0
        }
    }
}

impl fmt::Display for NegotiatedFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_runtime_default() {
            write!(f, "(runtime default)")
        } else {
            write!(f, "{}", self.0)
        }
    }
}
