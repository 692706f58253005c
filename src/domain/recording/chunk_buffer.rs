//! Audio chunk buffer

/// Ordered fragments emitted by the capture device for one recording.
///
/// Consuming the buffer (`into_payload`) moves it, so a recording can be
/// turned into an upload payload only once.
#[derive(Debug, Default)]
pub struct AudioChunkBuffer {
    chunks: Vec<Vec<u8>>,
    total_bytes: usize,
}

impl AudioChunkBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment. Empty fragments are skipped; returns whether it was kept.
    pub fn push(&mut self, chunk: Vec<u8>) -> bool {
        if chunk.is_empty() {
            return false;
        }
        self.total_bytes += chunk.len();
        self.chunks.push(chunk);
        true
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Concatenate all fragments into one payload
    pub fn into_payload(self) -> Vec<u8> {
        let mut payload = Vec::with_capacity(self.total_bytes);
        for chunk in self.chunks {
            payload.extend_from_slice(&chunk);
        }
        payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_buffer_is_empty() {
        let buffer = AudioChunkBuffer::new();
        assert!(buffer.is_empty());
        assert_eq!(buffer.total_bytes(), 0);
        assert!(buffer.into_payload().is_empty());
    }

    #[test]
    fn concatenates_in_order() {
        let mut buffer = AudioChunkBuffer::new();
        buffer.push(vec![1, 2]);
        buffer.push(vec![3]);
        buffer.push(vec![4, 5, 6]);
        assert_eq!(buffer.chunk_count(), 3);
        assert_eq!(buffer.total_bytes(), 6);
        assert_eq!(buffer.into_payload(), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn skips_empty_chunks() {
        let mut buffer = AudioChunkBuffer::new();
        assert!(!buffer.push(Vec::new()));
        assert!(buffer.push(vec![9]));
        assert_eq!(buffer.chunk_count(), 1);
    }
}
