//! FLAC packaging of captured speech
//!
//! Captured audio is normalized to 16 kHz mono 16-bit PCM and packed as a
//! single FLAC stream, which is what the cpal capture device hands to the
//! session as its recording.

use flacenc::bitsink::ByteSink;
use flacenc::component::BitRepr;
use flacenc::config;
use flacenc::error::Verify;
use flacenc::source::MemSource;
use thiserror::Error;

/// Sample rate every recording is normalized to
pub const TARGET_SAMPLE_RATE: u32 = 16000;

const BITS_PER_SAMPLE: usize = 16;
const CHANNELS: usize = 1;

/// FLAC encoding errors
#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("No audio captured")]
    Empty,

    #[error("FLAC config error: {0}")]
    Config(String),

    #[error("FLAC encoding failed: {0}")]
    Encode(String),

    #[error("FLAC write failed: {0}")]
    Write(String),
}

/// Pack mono 16 kHz samples into FLAC bytes
pub fn encode_to_flac(samples: &[i16]) -> Result<Vec<u8>, EncodingError> {
    if samples.is_empty() {
        return Err(EncodingError::Empty);
    }

    let widened: Vec<i32> = samples.iter().map(|&s| i32::from(s)).collect();

    let config = config::Encoder::default()
        .into_verified()
        .map_err(|(_, e)| EncodingError::Config(format!("{:?}", e)))?;

    let source = MemSource::from_samples(
        &widened,
        CHANNELS,
        BITS_PER_SAMPLE,
        TARGET_SAMPLE_RATE as usize,
    );

    let stream = flacenc::encode_with_fixed_block_size(&config, source, config.block_size)
        .map_err(|e| EncodingError::Encode(format!("{:?}", e)))?;

    let mut sink = ByteSink::new();
    stream
        .write(&mut sink)
        .map_err(|e| EncodingError::Write(e.to_string()))?;

    Ok(sink.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_starts_with_flac_marker() {
        let silence = vec![0i16; TARGET_SAMPLE_RATE as usize];
        let bytes = encode_to_flac(&silence).unwrap();
        assert_eq!(&bytes[0..4], b"fLaC");
    }

    #[test]
    fn tone_compresses_below_raw_size() {
        let tone: Vec<i16> = (0..TARGET_SAMPLE_RATE as usize)
            .map(|i| {
                let t = i as f32 / TARGET_SAMPLE_RATE as f32;
                (f32::sin(2.0 * std::f32::consts::PI * 220.0 * t) * 12000.0) as i16
            })
            .collect();
        let bytes = encode_to_flac(&tone).unwrap();
        assert!(bytes.len() < tone.len() * 2);
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(encode_to_flac(&[]), Err(EncodingError::Empty)));
    }
}
