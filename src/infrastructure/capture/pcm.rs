//! PCM helpers for the cpal capture thread

use rubato::{FftFixedIn, Resampler};

use super::flac_encoder::TARGET_SAMPLE_RATE;

const RESAMPLER_CHUNK: usize = 1024;

/// Convert normalized float samples to i16
pub fn f32_to_i16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&s| (s.clamp(-1.0, 1.0) * 32767.0) as i16)
        .collect()
}

/// Average interleaved frames down to one channel
pub fn downmix(samples: &[i16], channels: u16) -> Vec<i16> {
    if channels <= 1 {
        return samples.to_vec();
    }

    samples
        .chunks(channels as usize)
        .map(|frame| {
            let sum: i32 = frame.iter().map(|&s| i32::from(s)).sum();
            (sum / frame.len() as i32) as i16
        })
        .collect()
}

/// Resample mono audio from `source_rate` to 16 kHz.
///
/// The output is aligned with the input: the resampler delay is skipped at
/// the front and flushed with silence at the back.
pub fn resample_to_target(samples: &[i16], source_rate: u32) -> Result<Vec<i16>, String> {
    if source_rate == TARGET_SAMPLE_RATE || samples.is_empty() {
        return Ok(samples.to_vec());
    }
    if source_rate == 0 {
        return Err("Invalid source sample rate: 0 Hz".to_string());
    }

    let input: Vec<f32> = samples.iter().map(|&s| f32::from(s) / 32768.0).collect();
    let ratio = f64::from(TARGET_SAMPLE_RATE) / f64::from(source_rate);
    let expected = (input.len() as f64 * ratio).ceil() as usize;

    let mut resampler = FftFixedIn::<f32>::new(
        source_rate as usize,
        TARGET_SAMPLE_RATE as usize,
        RESAMPLER_CHUNK,
        2,
        1,
    )
    .map_err(|e| format!("Resampler init failed: {}", e))?;

    let delay = resampler.output_delay();
    let wanted = delay + expected;
    let mut output = Vec::with_capacity(wanted + RESAMPLER_CHUNK);
    let mut pos = 0;
    while pos < input.len() || output.len() < wanted {
        let needed = resampler.input_frames_next();
        let end = (pos + needed).min(input.len());
        let mut frame = input[pos..end].to_vec();
        frame.resize(needed, 0.0);

        let resampled = resampler
            .process(&[frame], None)
            .map_err(|e| format!("Resampling failed: {}", e))?;
        output.extend(resampled[0].iter().map(|&s| (s * 32767.0) as i16));
        pos = end;
    }

    output.drain(..delay);
    output.truncate(expected);
    Ok(output)
}
