//! Recording session controller
//!
//! Owns the recording state machine and is its only mutator. User commands
//! arrive as method calls (or through [`RecordingSessionController::run`]);
//! capture and upload completions arrive as [`SessionEvent`] messages on the
//! controller's inbox. Observable state is published as a
//! [`SessionSnapshot`] on a watch channel.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use crate::domain::recording::{AudioChunkBuffer, NegotiatedFormat};
use crate::domain::session::{
    InvalidStateTransition, RecordingSession, SessionSnapshot, SessionState,
};
use crate::domain::template::TemplateId;
use crate::domain::upload::{UploadRequest, UploadResult};

use super::events::SessionEvent;
use super::ports::{
    CaptureDevice, CaptureEvent, CaptureSink, CaptureStream, UploadError, UploadTransport,
};

/// Message shown when the input device cannot be acquired
pub const PERMISSION_DENIED_MESSAGE: &str =
    "Microphone access denied. Please allow microphone access in your system settings.";

/// User actions accepted by the run loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Start,
    Stop,
    /// Stop while recording, start otherwise
    Toggle,
    SelectTemplate(TemplateId),
    Quit,
}

/// The capture currently holding the input device
struct ActiveCapture {
    id: u64,
    stream: Box<dyn CaptureStream>,
    buffer: AudioChunkBuffer,
    format: NegotiatedFormat,
}

impl ActiveCapture {
    fn release(mut self) -> (AudioChunkBuffer, NegotiatedFormat) {
        self.stream.release();
        (self.buffer, self.format)
    }
}

/// Recording session use case
pub struct RecordingSessionController<D, U>
where
    D: CaptureDevice,
    U: UploadTransport + 'static,
{
    device: D,
    transport: Arc<U>,
    session: RecordingSession,
    capture: Option<ActiveCapture>,
    pending_upload: Option<u64>,
    last_capture_id: u64,
    inbox_tx: mpsc::UnboundedSender<SessionEvent>,
    inbox_rx: mpsc::UnboundedReceiver<SessionEvent>,
    updates: watch::Sender<SessionSnapshot>,
}

impl<D, U> RecordingSessionController<D, U>
where
    D: CaptureDevice,
    U: UploadTransport + 'static,
{
    /// Create an idle controller with `template` selected
    pub fn new(device: D, transport: U, template: TemplateId) -> Self {
        let session = RecordingSession::new(template);
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        let (updates, _) = watch::channel(session.snapshot());

        Self {
            device,
            transport: Arc::new(transport),
            session,
            capture: None,
            pending_upload: None,
            last_capture_id: 0,
            inbox_tx,
            inbox_rx,
            updates,
        }
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn template(&self) -> &TemplateId {
        self.session.template()
    }

    pub fn result(&self) -> Option<&UploadResult> {
        self.session.result()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.session.error_message()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    /// Format of the capture in progress, if any
    pub fn active_format(&self) -> Option<&NegotiatedFormat> {
        self.capture.as_ref().map(|c| &c.format)
    }

    /// Subscribe to snapshot updates
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.updates.subscribe()
    }

    fn publish(&self) {
        let snapshot = self.session.snapshot();
        self.updates.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }

    /// Start a new recording.
    ///
    /// Clears the previous result and error, then requests the input device.
    /// A refused or unavailable device moves the session to ERROR; that is
    /// not an `Err` here. `Err` means the request was ignored.
    pub async fn request_start(&mut self) -> Result<(), InvalidStateTransition> {
        self.session.begin_start()?;
        self.publish();

        debug!("requesting capture device");
        let mut stream = match self.device.open().await {
            Ok(stream) => stream,
            Err(e) => {
                warn!(error = %e, "capture device unavailable");
                self.session.deny_start(PERMISSION_DENIED_MESSAGE)?;
                self.publish();
                return Ok(());
            }
        };

        let format = NegotiatedFormat::negotiate(|f| self.device.supports_format(f));
        self.last_capture_id += 1;
        let capture_id = self.last_capture_id;
        let sink = CaptureSink::new(capture_id, self.inbox_tx.clone());

        if let Err(e) = stream.start(&format, sink) {
            warn!(error = %e, "capture device failed to start");
            stream.release();
            self.session.deny_start(PERMISSION_DENIED_MESSAGE)?;
            self.publish();
            return Ok(());
        }

        info!(capture_id, %format, "recording started");
        self.capture = Some(ActiveCapture {
            id: capture_id,
            stream,
            buffer: AudioChunkBuffer::new(),
            format,
        });
        self.session.start_recording()?;
        self.publish();
        Ok(())
    }

    /// Stop the recording. The session moves to UPLOADING immediately; the
    /// upload starts once the device delivers its finalize event.
    pub fn request_stop(&mut self) -> Result<(), InvalidStateTransition> {
        let state = self.session.state();
        let device_active = self
            .capture
            .as_ref()
            .is_some_and(|c| c.stream.is_recording());
        if state != SessionState::Recording || !device_active {
            return Err(InvalidStateTransition {
                current_state: state,
                action: "stop recording".to_string(),
            });
        }

        let stopped = match self.capture.as_mut() {
            Some(capture) => capture.stream.stop(),
            None => Ok(()),
        };
        self.session.stop_recording()?;

        if let Err(e) = stopped {
            warn!(error = %e, "capture device failed to stop");
            if let Some(capture) = self.capture.take() {
                capture.release();
            }
            self.session.fail_upload(e.to_string())?;
        } else {
            debug!("stop requested, waiting for device to finalize");
        }

        self.publish();
        Ok(())
    }

    /// Stop while recording, start otherwise
    pub async fn toggle(&mut self) -> Result<(), InvalidStateTransition> {
        if self.session.state() == SessionState::Recording {
            self.request_stop()
        } else {
            self.request_start().await
        }
    }

    /// Change the template used for the next upload
    pub fn select_template(&mut self, template: TemplateId) -> Result<(), InvalidStateTransition> {
        self.session.select_template(template)?;
        self.publish();
        Ok(())
    }

    /// Apply a capture or upload completion
    pub fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Capture {
                capture_id,
                event: CaptureEvent::Data(chunk),
            } => self.on_capture_data(capture_id, chunk),
            SessionEvent::Capture {
                capture_id,
                event: CaptureEvent::Finalized,
            } => self.on_capture_finalized(capture_id),
            SessionEvent::Capture {
                capture_id,
                event: CaptureEvent::Failed(reason),
            } => self.on_capture_failed(capture_id, reason),
            SessionEvent::UploadFinished {
                capture_id,
                outcome,
            } => self.on_upload_finished(capture_id, outcome),
        }
        self.publish();
    }

    fn on_capture_data(&mut self, capture_id: u64, chunk: Vec<u8>) {
        match self.capture.as_mut() {
            Some(capture) if capture.id == capture_id => {
                let len = chunk.len();
                if capture.buffer.push(chunk) {
                    debug!(capture_id, bytes = len, total = capture.buffer.total_bytes(), "buffered audio chunk");
                }
            }
            _ => debug!(capture_id, "dropping chunk from inactive capture"),
        }
    }

    fn on_capture_finalized(&mut self, capture_id: u64) {
        if self.capture.as_ref().map(|c| c.id) != Some(capture_id) {
            debug!(capture_id, "ignoring finalize from inactive capture");
            return;
        }
        let Some(capture) = self.capture.take() else {
            return;
        };

        if self.session.state() == SessionState::Recording {
            warn!(capture_id, "capture device finalized without a stop request");
            if let Err(e) = self.session.stop_recording() {
                error!(error = %e, "could not move to uploading");
            }
        }

        let (buffer, format) = capture.release();
        debug!(capture_id, chunks = buffer.chunk_count(), "capture device released");

        let request = UploadRequest {
            audio: buffer.into_payload(),
            format,
            template: self.session.template().clone(),
        };
        self.dispatch_upload(capture_id, request);
    }

    fn on_capture_failed(&mut self, capture_id: u64, reason: String) {
        if self.capture.as_ref().map(|c| c.id) != Some(capture_id) {
            debug!(capture_id, "ignoring failure from inactive capture");
            return;
        }
        let Some(capture) = self.capture.take() else {
            return;
        };

        warn!(capture_id, error = %reason, "capture device lost the recording");
        let (buffer, _) = capture.release();
        debug!(capture_id, discarded = buffer.total_bytes(), "capture device released");

        if self.session.state() == SessionState::Recording {
            if let Err(e) = self.session.stop_recording() {
                error!(error = %e, "could not move to uploading");
            }
        }
        let message = if reason.trim().is_empty() {
            "Recording failed".to_string()
        } else {
            format!("Recording failed: {reason}")
        };
        if let Err(e) = self.session.fail_upload(message) {
            error!(error = %e, "capture failure arrived in unexpected state");
        }
    }

    fn dispatch_upload(&mut self, capture_id: u64, request: UploadRequest) {
        info!(
            capture_id,
            size = %request.human_readable_size(),
            template = %request.template,
            file_name = %request.format.file_name(),
            "uploading recording"
        );
        self.pending_upload = Some(capture_id);

        let transport = Arc::clone(&self.transport);
        let inbox = self.inbox_tx.clone();
        tokio::spawn(async move {
            let upload = tokio::spawn(async move { transport.upload(request).await });
            let outcome = match upload.await {
                Ok(outcome) => outcome,
                Err(e) => Err(UploadError::Interrupted(e.to_string())),
            };
            let _ = inbox.send(SessionEvent::UploadFinished {
                capture_id,
                outcome,
            });
        });
    }

    fn on_upload_finished(
        &mut self,
        capture_id: u64,
        outcome: Result<UploadResult, UploadError>,
    ) {
        if self.pending_upload != Some(capture_id) {
            debug!(capture_id, "ignoring result of unknown upload");
            return;
        }
        self.pending_upload = None;

        let applied = match outcome {
            Ok(result) => {
                info!(capture_id, job_id = %result.job_id, "upload accepted");
                self.session.complete_upload(result)
            }
            Err(e) => {
                warn!(capture_id, error = %e, "upload failed");
                self.session.fail_upload(e.to_string())
            }
        };
        if let Err(e) = applied {
            error!(error = %e, "upload outcome arrived in unexpected state");
        }
    }

    /// Process inbox events until no upload is outstanding
    pub async fn settle(&mut self) -> SessionState {
        while self.session.state() == SessionState::Uploading {
            match self.inbox_rx.recv().await {
                Some(event) => self.handle_event(event),
                None => break,
            }
        }
        self.session.state()
    }

    /// Leave the session: a recording in progress is discarded and its
    /// device released; an upload in flight is awaited.
    pub async fn shutdown(&mut self) {
        if self.session.state() == SessionState::Recording {
            if let Some(capture) = self.capture.take() {
                let (buffer, _) = capture.release();
                info!(bytes = buffer.total_bytes(), "recording discarded on shutdown");
            }
            return;
        }
        self.settle().await;
    }

    async fn dispatch(&mut self, command: SessionCommand) -> Result<(), InvalidStateTransition> {
        match command {
            SessionCommand::Start => self.request_start().await,
            SessionCommand::Stop => self.request_stop(),
            SessionCommand::Toggle => self.toggle().await,
            SessionCommand::SelectTemplate(template) => self.select_template(template),
            SessionCommand::Quit => Ok(()),
        }
    }

    /// Drive the session from a command channel until `Quit` or the channel
    /// closes. Ignored commands are reported on `rejected`.
    pub async fn run(
        &mut self,
        mut commands: mpsc::Receiver<SessionCommand>,
        rejected: mpsc::UnboundedSender<InvalidStateTransition>,
    ) {
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(SessionCommand::Quit) | None => break,
                    Some(command) => {
                        debug!(?command, state = %self.session.state(), "command received");
                        if let Err(e) = self.dispatch(command).await {
                            debug!(error = %e, "command ignored");
                            let _ = rejected.send(e);
                        }
                    }
                },
                Some(event) = self.inbox_rx.recv() => self.handle_event(event),
            }
        }
        self.shutdown().await;
    }
}
