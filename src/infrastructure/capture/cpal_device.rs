//! Microphone capture using cpal
//!
//! `cpal::Stream` is not `Send`, so every opened stream lives on its own
//! thread and is driven through a command channel. The stream plays from the
//! moment it is opened; samples are kept as 16-bit mono only while the
//! recording flag is set. On stop they are resampled to 16 kHz, packed as FLAC
//! and delivered as a single data chunk followed by the finalize event, or as
//! a failure event when that fails.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc as std_mpsc;
use std::sync::{Arc, Mutex};
use std::thread;

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SampleRate, StreamConfig};
use tokio::sync::oneshot;
use tracing::{debug, warn};

use super::flac_encoder::{encode_to_flac, TARGET_SAMPLE_RATE};
use super::pcm::{downmix, f32_to_i16, resample_to_target};
use crate::application::ports::{CaptureDevice, CaptureError, CaptureSink, CaptureStream};
use crate::domain::recording::NegotiatedFormat;

/// Default input device of the platform audio host.
///
/// The device records FLAC, which is none of the negotiable container
/// formats, so negotiation always lands on the runtime default.
#[derive(Debug, Default)]
pub struct CpalCaptureDevice;

impl CpalCaptureDevice {
    pub fn new() -> Self {
        Self
    }

    fn input_device() -> Result<cpal::Device, CaptureError> {
        cpal::default_host()
            .default_input_device()
            .ok_or(CaptureError::NoInputDevice)
    }

    /// Pick a config close to 16 kHz, preferring fewer channels
    fn input_config(device: &cpal::Device) -> Result<(StreamConfig, SampleFormat), CaptureError> {
        let ranges = device
            .supported_input_configs()
            .map_err(|e| CaptureError::PermissionDenied(e.to_string()))?;

        let includes_target = |r: &cpal::SupportedStreamConfigRange| {
            r.min_sample_rate().0 <= TARGET_SAMPLE_RATE && r.max_sample_rate().0 >= TARGET_SAMPLE_RATE
        };

        let best = ranges
            .filter(|r| matches!(r.sample_format(), SampleFormat::I16 | SampleFormat::F32))
            .min_by_key(|r| (!includes_target(r), r.channels()))
            .ok_or_else(|| CaptureError::StartFailed("No suitable input config".into()))?;

        let sample_rate = if includes_target(&best) {
            SampleRate(TARGET_SAMPLE_RATE)
        } else {
            best.min_sample_rate()
        };

        let config = StreamConfig {
            channels: best.channels(),
            sample_rate,
            buffer_size: cpal::BufferSize::Default,
        };
        Ok((config, best.sample_format()))
    }
}

#[async_trait]
impl CaptureDevice for CpalCaptureDevice {
    // FLAC matches no candidate, so uploads carry the runtime-default label
    // (`recording.webm`, `audio/webm`). The backend stores the bytes as-is.
    fn supports_format(&self, _format: &str) -> bool {
        false
    }

    async fn open(&self) -> Result<Box<dyn CaptureStream>, CaptureError> {
        let (ready_tx, ready_rx) = oneshot::channel();
        let (commands, command_rx) = std_mpsc::channel();
        let recording = Arc::new(AtomicBool::new(false));
        let thread_recording = Arc::clone(&recording);

        thread::Builder::new()
            .name("voicecore-capture".into())
            .spawn(move || capture_thread(ready_tx, command_rx, thread_recording))
            .map_err(|e| CaptureError::StartFailed(e.to_string()))?;

        ready_rx
            .await
            .map_err(|_| CaptureError::StartFailed("capture thread exited".into()))??;

        Ok(Box::new(CpalCaptureStream {
            commands,
            recording,
            released: false,
        }))
    }
}

enum StreamCommand {
    Start(CaptureSink),
    Stop,
    Release,
}

/// Handle to a stream owned by a capture thread
pub struct CpalCaptureStream {
    commands: std_mpsc::Sender<StreamCommand>,
    recording: Arc<AtomicBool>,
    released: bool,
}

impl CaptureStream for CpalCaptureStream {
    fn start(&mut self, format: &NegotiatedFormat, sink: CaptureSink) -> Result<(), CaptureError> {
        debug!(%format, capture_id = sink.capture_id(), "starting cpal capture");
        self.recording.store(true, Ordering::SeqCst);
        self.commands.send(StreamCommand::Start(sink)).map_err(|_| {
            self.recording.store(false, Ordering::SeqCst);
            CaptureError::StartFailed("capture thread exited".into())
        })
    }

    fn is_recording(&self) -> bool {
        self.recording.load(Ordering::SeqCst)
    }

    fn stop(&mut self) -> Result<(), CaptureError> {
        self.recording.store(false, Ordering::SeqCst);
        self.commands
            .send(StreamCommand::Stop)
            .map_err(|_| CaptureError::StopFailed("capture thread exited".into()))
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.recording.store(false, Ordering::SeqCst);
            let _ = self.commands.send(StreamCommand::Release);
        }
    }
}

impl Drop for CpalCaptureStream {
    fn drop(&mut self) {
        self.release();
    }
}

/// Owns the cpal stream for its whole life
fn capture_thread(
    ready: oneshot::Sender<Result<(), CaptureError>>,
    commands: std_mpsc::Receiver<StreamCommand>,
    recording: Arc<AtomicBool>,
) {
    let samples: Arc<Mutex<Vec<i16>>> = Arc::new(Mutex::new(Vec::new()));

    let opened = CpalCaptureDevice::input_device().and_then(|device| {
        let (config, format) = CpalCaptureDevice::input_config(&device)?;
        let stream = build_stream(&device, &config, format, &samples, &recording)?;
        stream
            .play()
            .map_err(|e| CaptureError::StartFailed(e.to_string()))?;
        Ok((stream, config.sample_rate.0))
    });

    let (stream, sample_rate) = match opened {
        Ok(opened) => {
            let _ = ready.send(Ok(()));
            opened
        }
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };
    debug!(sample_rate, "input device opened");

    let mut sink: Option<CaptureSink> = None;
    while let Ok(command) = commands.recv() {
        match command {
            StreamCommand::Start(s) => sink = Some(s),
            StreamCommand::Stop => {
                recording.store(false, Ordering::SeqCst);
                if let Err(e) = stream.pause() {
                    warn!(error = %e, "failed to pause input stream");
                }
                if let Some(sink) = sink.take() {
                    let captured = samples
                        .lock()
                        .map(|mut buffer| std::mem::take(&mut *buffer))
                        .unwrap_or_default();
                    finish_capture(&sink, &captured, sample_rate);
                }
            }
            StreamCommand::Release => break,
        }
    }

    recording.store(false, Ordering::SeqCst);
    drop(stream);
    debug!("input device released");
}

/// Encode what was captured and hand it to the session
fn finish_capture(sink: &CaptureSink, captured: &[i16], sample_rate: u32) {
    let encoded = resample_to_target(captured, sample_rate).and_then(|pcm| {
        if pcm.is_empty() {
            return Ok(Vec::new());
        }
        encode_to_flac(&pcm).map_err(|e| e.to_string())
    });

    match encoded {
        Ok(bytes) => {
            debug!(samples = captured.len(), bytes = bytes.len(), "capture encoded");
            sink.data(bytes);
            sink.finalized();
        }
        Err(e) => {
            warn!(error = %e, "failed to encode capture");
            sink.failed(e);
        }
    }
}

fn build_stream(
    device: &cpal::Device,
    config: &StreamConfig,
    format: SampleFormat,
    samples: &Arc<Mutex<Vec<i16>>>,
    recording: &Arc<AtomicBool>,
) -> Result<cpal::Stream, CaptureError> {
    let channels = config.channels;
    let on_error = |e: cpal::StreamError| warn!(error = %e, "input stream error");

    let stream = match format {
        SampleFormat::I16 => {
            let samples = Arc::clone(samples);
            let recording = Arc::clone(recording);
            device.build_input_stream(
                config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    if recording.load(Ordering::SeqCst) {
                        if let Ok(mut buffer) = samples.lock() {
                            buffer.extend(downmix(data, channels));
                        }
                    }
                },
                on_error,
                None,
            )
        }
        SampleFormat::F32 => {
            let samples = Arc::clone(samples);
            let recording = Arc::clone(recording);
            device.build_input_stream(
                config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if recording.load(Ordering::SeqCst) {
                        if let Ok(mut buffer) = samples.lock() {
                            buffer.extend(downmix(&f32_to_i16(data), channels));
                        }
                    }
                },
                on_error,
                None,
            )
        }
        other => {
            return Err(CaptureError::StartFailed(format!(
                "Unsupported sample format: {:?}",
                other
            )))
        }
    };

    stream.map_err(|e| CaptureError::PermissionDenied(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negotiation_falls_back_to_runtime_default() {
        let device = CpalCaptureDevice::new();
        let format = NegotiatedFormat::negotiate(|f| device.supports_format(f));
        assert!(format.is_runtime_default());
    }

    #[tokio::test]
    async fn finish_capture_emits_data_then_finalize() {
        use crate::application::events::SessionEvent;
        use crate::application::ports::CaptureEvent;

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let sink = CaptureSink::new(3, tx);
        finish_capture(&sink, &[0i16; 1600], TARGET_SAMPLE_RATE);

        match rx.recv().await.unwrap() {
            SessionEvent::Capture { event: CaptureEvent::Data(bytes), .. } => {
                assert_eq!(&bytes[0..4], b"fLaC");
            }
            other => panic!("unexpected event: {:?}", other),
        }
        match rx.recv().await.unwrap() {
            SessionEvent::Capture { capture_id, event } => {
                assert_eq!(capture_id, 3);
                assert_eq!(event, CaptureEvent::Finalized);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn empty_capture_still_finalizes() {
        use crate::application::events::SessionEvent;
        use crate::application::ports::CaptureEvent;

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let sink = CaptureSink::new(1, tx);
        finish_capture(&sink, &[], 48_000);

        // Empty payload, skipped by the session buffer
        match rx.recv().await.unwrap() {
            SessionEvent::Capture { event: CaptureEvent::Data(bytes), .. } => assert!(bytes.is_empty()),
            other => panic!("unexpected event: {:?}", other),
        }
        assert_eq!(rx.recv().await.unwrap().capture_id(), 1);
    }

    #[tokio::test]
    async fn encoding_error_is_reported_instead_of_finalize() {
        use crate::application::events::SessionEvent;
        use crate::application::ports::CaptureEvent;

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let sink = CaptureSink::new(5, tx);
        finish_capture(&sink, &[100i16; 4000], 0);
        drop(sink);

        match rx.recv().await.unwrap() {
            SessionEvent::Capture { capture_id, event: CaptureEvent::Failed(reason) } => {
                assert_eq!(capture_id, 5);
                assert!(!reason.is_empty());
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(rx.recv().await.is_none());
    }

    #[test]
    fn start_returns_at_once_when_capture_thread_is_gone() {
        let (commands, command_rx) = std_mpsc::channel();
        drop(command_rx);
        let mut stream = CpalCaptureStream {
            commands,
            recording: Arc::new(AtomicBool::new(false)),
            released: false,
        };
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();

        let started = stream.start(&NegotiatedFormat::runtime_default(), CaptureSink::new(1, tx));
        assert!(matches!(started, Err(CaptureError::StartFailed(_))));
        assert!(!stream.is_recording());
    }

    #[test]
    fn start_hands_the_sink_to_the_capture_thread() {
        let (commands, command_rx) = std_mpsc::channel();
        let mut stream = CpalCaptureStream {
            commands,
            recording: Arc::new(AtomicBool::new(false)),
            released: false,
        };
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();

        stream
            .start(&NegotiatedFormat::runtime_default(), CaptureSink::new(9, tx))
            .unwrap();
        assert!(stream.is_recording());
        match command_rx.try_recv().unwrap() {
            StreamCommand::Start(sink) => assert_eq!(sink.capture_id(), 9),
            _ => panic!("expected a start command"),
        }

        stream.stop().unwrap();
        assert!(!stream.is_recording());
        assert!(matches!(command_rx.try_recv(), Ok(StreamCommand::Stop)));
    }
}
