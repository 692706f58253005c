//! Recording session state machine

use std::fmt;
use thiserror::Error;

use crate::domain::template::TemplateId;
use crate::domain::upload::UploadResult;

/// Fallback for failures that arrive without a usable description
const UNKNOWN_FAILURE_MESSAGE: &str = "Unknown error";

/// Recording session states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Recording,
    Uploading,
    Done,
    Error,
}

/// Every state, in lifecycle order
pub const ALL_STATES: [SessionState; 5] = [
    SessionState::Idle,
    SessionState::Recording,
    SessionState::Uploading,
    SessionState::Done,
    SessionState::Error,
];

impl SessionState {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Uploading => "uploading",
            Self::Done => "done",
            Self::Error => "error",
        }
    }

    /// Whether a new recording may be started from this state
    pub const fn can_start(&self) -> bool {
        matches!(self, Self::Idle | Self::Done | Self::Error)
    }

    /// Whether a capture or an upload is in flight
    pub const fn is_busy(&self) -> bool {
        matches!(self, Self::Recording | Self::Uploading)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an action is not permitted in the current state.
/// The session is left untouched when this is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid state transition: cannot {action} while in {current_state} state")]
pub struct InvalidStateTransition {
    pub current_state: SessionState,
    pub action: String,
}

/// Publicly observable view of a session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub template: TemplateId,
    pub result: Option<UploadResult>,
    pub error: Option<String>,
}

/// Recording session entity.
///
/// State machine:
///   IDLE | DONE | ERROR -> RECORDING (start_recording)
///   IDLE | DONE | ERROR -> ERROR     (deny_start)
///   RECORDING -> UPLOADING           (stop_recording)
///   UPLOADING -> DONE                (complete_upload)
///   UPLOADING -> ERROR               (fail_upload)
///
/// `result` is only ever set in DONE and `error` only in ERROR.
#[derive(Debug, Clone)]
pub struct RecordingSession {
    state: SessionState,
    template: TemplateId,
    result: Option<UploadResult>,
    error: Option<String>,
}

impl RecordingSession {
    /// Create an idle session with the given template selected
    pub fn new(template: TemplateId) -> Self {
        Self {
            state: SessionState::Idle,
            template,
            result: None,
            error: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn template(&self) -> &TemplateId {
        &self.template
    }

    pub fn result(&self) -> Option<&UploadResult> {
        self.result.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Copy the observable fields
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            template: self.template.clone(),
            result: self.result.clone(),
            error: self.error.clone(),
        }
    }

    fn reject(&self, action: &str) -> InvalidStateTransition {
        InvalidStateTransition {
            current_state: self.state,
            action: action.to_string(),
        }
    }

    /// Clear the previous outcome ahead of a device request.
    /// The state itself does not move until the device answers.
    pub fn begin_start(&mut self) -> Result<(), InvalidStateTransition> {
        if !self.state.can_start() {
            return Err(self.reject("start recording"));
        }
        self.result = None;
        self.error = None;
        Ok(())
    }

    /// Transition to RECORDING once the device is capturing
    pub fn start_recording(&mut self) -> Result<(), InvalidStateTransition> {
        if !self.state.can_start() {
            return Err(self.reject("start recording"));
        }
        self.result = None;
        self.error = None;
        self.state = SessionState::Recording;
        Ok(())
    }

    /// Transition to ERROR when the device could not be acquired
    pub fn deny_start(&mut self, message: impl Into<String>) -> Result<(), InvalidStateTransition> {
        if !self.state.can_start() {
            return Err(self.reject("report a device failure"));
        }
        self.result = None;
        self.error = Some(non_empty(message.into()));
        self.state = SessionState::Error;
        Ok(())
    }

    /// Transition from RECORDING to UPLOADING
    pub fn stop_recording(&mut self) -> Result<(), InvalidStateTransition> {
        if self.state != SessionState::Recording {
            return Err(self.reject("stop recording"));
        }
        self.state = SessionState::Uploading;
        Ok(())
    }

    /// Transition from UPLOADING to DONE
    pub fn complete_upload(&mut self, result: UploadResult) -> Result<(), InvalidStateTransition> {
        if self.state != SessionState::Uploading {
            return Err(self.reject("complete upload"));
        }
        self.result = Some(result);
        self.error = None;
        self.state = SessionState::Done;
        Ok(())
    }

    /// Transition from UPLOADING to ERROR
    pub fn fail_upload(&mut self, message: impl Into<String>) -> Result<(), InvalidStateTransition> {
        if self.state != SessionState::Uploading {
            return Err(self.reject("fail upload"));
        }
        self.result = None;
        self.error = Some(non_empty(message.into()));
        self.state = SessionState::Error;
        Ok(())
    }

    /// Change the selected template; rejected while a capture or upload is in flight
    pub fn select_template(&mut self, template: TemplateId) -> Result<(), InvalidStateTransition> {
        if self.state.is_busy() {
            return Err(self.reject("change template"));
        }
        self.template = template;
        Ok(())
    }
}

fn non_empty(message: String) -> String {
    if message.trim().is_empty() {
        UNKNOWN_FAILURE_MESSAGE.to_string()
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> RecordingSession {
        RecordingSession::new(TemplateId::new("quick_note"))
    }

    fn sample_result() -> UploadResult {
        UploadResult {
            job_id: "abc".to_string(),
            template: "quick_note".to_string(),
            file_size_kb: 12.0,
            stub_response: "ok".to_string(),
        }
    }

    fn session_in(state: SessionState) -> RecordingSession {
        let mut s = session();
        match state {
            SessionState::Idle => {}
            SessionState::Recording => s.start_recording().unwrap(),
            SessionState::Uploading => {
                s.start_recording().unwrap();
                s.stop_recording().unwrap();
            }
            SessionState::Done => {
                s.start_recording().unwrap();
                s.stop_recording().unwrap();
                s.complete_upload(sample_result()).unwrap();
            }
            SessionState::Error => s.deny_start("denied").unwrap(),
        }
        s
    }

    #[test]
    fn new_session_is_idle() {
        let s = session();
        assert_eq!(s.state(), SessionState::Idle);
        assert!(s.result().is_none());
        assert!(s.error_message().is_none());
        assert_eq!(s.template().as_str(), "quick_note");
    }

    #[test]
    fn full_cycle_to_done() {
        let mut s = session();
        s.start_recording().unwrap();
        assert_eq!(s.state(), SessionState::Recording);
        s.stop_recording().unwrap();
        assert_eq!(s.state(), SessionState::Uploading);
        s.complete_upload(sample_result()).unwrap();
        assert_eq!(s.state(), SessionState::Done);
        assert_eq!(s.result(), Some(&sample_result()));
    }

    #[test]
    fn failed_upload_sets_error() {
        let mut s = session_in(SessionState::Uploading);
        s.fail_upload("Server error: 500").unwrap();
        assert_eq!(s.state(), SessionState::Error);
        assert_eq!(s.error_message(), Some("Server error: 500"));
        assert!(s.result().is_none());
    }

    #[test]
    fn empty_failure_message_is_replaced() {
        let mut s = session_in(SessionState::Uploading);
        s.fail_upload("   ").unwrap();
        assert_eq!(s.error_message(), Some(UNKNOWN_FAILURE_MESSAGE));

        let mut s = session();
        s.deny_start("").unwrap();
        assert!(!s.error_message().unwrap().is_empty());
    }

    #[test]
    fn begin_start_clears_previous_outcome() {
        let mut done = session_in(SessionState::Done);
        done.begin_start().unwrap();
        assert!(done.result().is_none());
        assert_eq!(done.state(), SessionState::Done);

        let mut failed = session_in(SessionState::Error);
        failed.begin_start().unwrap();
        assert!(failed.error_message().is_none());
    }

    #[test]
    fn restart_from_terminal_states() {
        for state in [SessionState::Done, SessionState::Error] {
            let mut s = session_in(state);
            s.start_recording().unwrap();
            assert_eq!(s.state(), SessionState::Recording);
            assert!(s.result().is_none());
            assert!(s.error_message().is_none());
        }
    }

    #[test]
    fn start_while_recording_is_rejected() {
        let mut s = session_in(SessionState::Recording);
        let err = s.start_recording().unwrap_err();
        assert_eq!(err.current_state, SessionState::Recording);
        assert_eq!(s.state(), SessionState::Recording);
    }

    #[test]
    fn start_and_stop_while_uploading_are_rejected() {
        let mut s = session_in(SessionState::Uploading);
        assert!(s.start_recording().is_err());
        assert!(s.begin_start().is_err());
        assert!(s.stop_recording().is_err());
        assert_eq!(s.state(), SessionState::Uploading);
    }

    #[test]
    fn stop_outside_recording_never_changes_state() {
        for state in ALL_STATES {
            if state == SessionState::Recording {
                continue;
            }
            let mut s = session_in(state);
            let before = s.snapshot();
            assert!(s.stop_recording().is_err());
            assert_eq!(s.snapshot(), before);
        }
    }

    #[test]
    fn upload_outcomes_only_apply_while_uploading() {
        for state in ALL_STATES {
            if state == SessionState::Uploading {
                continue;
            }
            let mut s = session_in(state);
            let before = s.snapshot();
            assert!(s.complete_upload(sample_result()).is_err());
            assert!(s.fail_upload("late").is_err());
            assert_eq!(s.snapshot(), before);
        }
    }

    #[test]
    fn template_selection_guard() {
        for state in ALL_STATES {
            let mut s = session_in(state);
            let result = s.select_template(TemplateId::new("tagebuch"));
            if state.is_busy() {
                assert!(result.is_err());
                assert_eq!(s.template().as_str(), "quick_note");
            } else {
                assert!(result.is_ok());
                assert_eq!(s.template().as_str(), "tagebuch");
            }
        }
    }

    #[test]
    fn state_display() {
        assert_eq!(SessionState::Idle.to_string(), "idle");
        assert_eq!(SessionState::Recording.to_string(), "recording");
        assert_eq!(SessionState::Uploading.to_string(), "uploading");
        assert_eq!(SessionState::Done.to_string(), "done");
        assert_eq!(SessionState::Error.to_string(), "error");
    }

    #[test]
    fn error_display() {
        let err = InvalidStateTransition {
            current_state: SessionState::Uploading,
            action: "start recording".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("start recording"));
        assert!(msg.contains("uploading"));
    }
}
