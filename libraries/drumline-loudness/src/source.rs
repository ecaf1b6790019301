//! Pull-based PCM input
//!
//! Decoders implement [`PcmSource`]; the meter never parses containers.

use crate::error::Result;

/// A stream of interleaved f32 PCM
pub trait PcmSource {
    /// Sample rate in Hz
    fn sample_rate(&self) -> u32;

    /// Number of interleaved channels
    fn channels(&self) -> usize;

    /// Next chunk of interleaved samples, `None` at end of stream
    ///
    /// Chunks may have any length and need not end on a frame boundary.
    fn next_chunk(&mut self) -> Result<Option<&[f32]>>;
}

/// In-memory source serving a sample buffer in fixed-size chunks
#[derive(Debug, Clone)]
pub struct InterleavedBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: usize,
    chunk_len: usize,
    position: usize,
}

impl InterleavedBuffer {
    /// Default chunk length in samples
    pub const DEFAULT_CHUNK_LEN: usize = 4096;

    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: usize) -> Self {
        Self {
            samples,
            sample_rate,
            channels,
            chunk_len: Self::DEFAULT_CHUNK_LEN,
            position: 0,
        }
    }

    /// Serve the buffer in chunks of `chunk_len` samples (minimum 1)
    #[must_use]
    pub fn with_chunk_len(mut self, chunk_len: usize) -> Self {
        self.chunk_len = chunk_len.max(1);
        self
    }
}

impl PcmSource for InterleavedBuffer {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn channels(&self) -> usize {
        self.channels
    }

    fn next_chunk(&mut self) -> Result<Option<&[f32]>> {
        if self.position >= self.samples.len() {
            return Ok(None);
        }

        let end = self.position.saturating_add(self.chunk_len).min(self.samples.len());
        let chunk = &self.samples[self.position..end];
        self.position = end;
        Ok(Some(chunk))
    }
}
