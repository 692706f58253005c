//! Recording domain module

mod chunk_buffer;
mod duration;
mod format;

pub use chunk_buffer::AudioChunkBuffer;
pub use duration::{Duration, DEFAULT_DURATION_SECS};
pub use format::{NegotiatedFormat, CANDIDATE_FORMATS};
