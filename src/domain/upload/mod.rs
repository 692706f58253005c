//! Upload value objects

use serde::{Deserialize, Serialize};

use crate::domain::recording::NegotiatedFormat;
use crate::domain::template::TemplateId;

/// Acknowledgment returned by the backend for an accepted recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResult {
    pub job_id: String,
    pub template: String,
    pub file_size_kb: f64,
    pub stub_response: String,
}

/// Everything a single upload attempt carries
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub audio: Vec<u8>,
    pub format: NegotiatedFormat,
    pub template: TemplateId,
}

impl UploadRequest {
    pub fn size_bytes(&self) -> usize {
        self.audio.len()
    }

    /// Human-readable payload size
    pub fn human_readable_size(&self) -> String {
        let bytes = self.size_bytes();
        if bytes < 1024 {
            format!("{} B", bytes)
        } else if bytes < 1024 * 1024 {
            format!("{:.1} KB", bytes as f64 / 1024.0)
        } else {
            format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(len: usize) -> UploadRequest {
        UploadRequest {
            audio: vec![0u8; len],
            format: NegotiatedFormat::runtime_default(),
            template: TemplateId::new("quick_note"),
        }
    }

    #[test]
    fn result_parses_backend_body() {
        let body = r#"{"job_id":"abc","template":"quick_note","file_size_kb":12,"stub_response":"ok"}"#;
        let result: UploadResult = serde_json::from_str(body).unwrap();
        assert_eq!(
            result,
            UploadResult {
                job_id: "abc".to_string(),
                template: "quick_note".to_string(),
                file_size_kb: 12.0,
                stub_response: "ok".to_string(),
            }
        );
    }

    #[test]
    fn result_ignores_extra_fields() {
        let body = r#"{"job_id":"j","template":"t","file_size_kb":1.5,"stub_response":"s","extra":true}"#;
        let result: UploadResult = serde_json::from_str(body).unwrap();
        assert_eq!(result.file_size_kb, 1.5);
    }

    #[test]
    fn result_requires_all_fields() {
        let body = r#"{"job_id":"abc","template":"quick_note"}"#;
        assert!(serde_json::from_str::<UploadResult>(body).is_err());
    }

    #[test]
    fn human_readable_sizes() {
        assert_eq!(request(500).human_readable_size(), "500 B");
        assert_eq!(request(2048).human_readable_size(), "2.0 KB");
        assert_eq!(request(2 * 1024 * 1024).human_readable_size(), "2.0 MB");
    }
}
