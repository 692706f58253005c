//! Audio capture adapters

mod cpal_device;
mod flac_encoder;
mod pcm;

pub use cpal_device::{CpalCaptureDevice, CpalCaptureStream};
pub use flac_encoder::{encode_to_flac, EncodingError, TARGET_SAMPLE_RATE};
