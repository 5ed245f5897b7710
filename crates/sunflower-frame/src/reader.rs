use bytes::{Buf, BytesMut};
use tracing::{debug, trace};

use crate::codec::{decode_with, Frame, FrameConfig, FRAME_SIZE};

const INITIAL_BUFFER_CAPACITY: usize = 256;

/// Counters describing what the reader has done so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReaderStats {
    /// Frames successfully decoded.
    pub frames: u64,
    /// Bytes discarded while searching for a frame boundary.
    pub discarded: u64,
}

/// Turns an arbitrary byte stream into validated frames.
///
/// Bytes are appended with [`FrameReader::extend`] as they arrive. Whenever at
/// least one frame's worth is buffered, the first nine bytes are decoded; on
/// failure exactly one byte is dropped and decoding is retried. The stream may
/// therefore start mid-frame or carry garbage, and alignment is recovered as
/// soon as the next intact frame is buffered.
///
/// Decode failures are never reported; they only show up in [`ReaderStats`]
/// and in trace logs.
#[derive(Debug)]
pub struct FrameReader {
    buf: BytesMut,
    config: FrameConfig,
    stats: ReaderStats,
}

impl FrameReader {
    /// Create a new reader with default codec options.
    pub fn new() -> Self {
        Self::with_config(FrameConfig::default())
    }

    /// Create a new reader with explicit codec options.
    pub fn with_config(config: FrameConfig) -> Self {
        Self {
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
            stats: ReaderStats::default(),
        }
    }

    /// Append freshly received bytes.
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Pop the next valid frame, or `None` if fewer than nine decodable bytes
    /// remain.
    pub fn next_frame(&mut self) -> Option<Frame> {
        let mut dropped = 0u64;
        let frame = loop {
            if self.buf.len() < FRAME_SIZE {
                break None;
            }

            match decode_with(&self.buf[..FRAME_SIZE], &self.config) {
                Ok(frame) => {
                    self.buf.advance(FRAME_SIZE);
                    self.stats.frames += 1;
                    trace!(frame = %frame, "decoded frame");
                    break Some(frame);
                }
                Err(err) => {
                    trace!(byte = self.buf[0], error = %err, "dropping byte to resync");
                    self.buf.advance(1);
                    dropped += 1;
                }
            }
        };

        if dropped > 0 {
            self.stats.discarded += dropped;
            debug!(dropped, recovered = frame.is_some(), "resynchronized stream");
        }
        frame
    }

    /// Decode every frame currently recoverable from the buffer.
    pub fn drain_frames(&mut self) -> Vec<Frame> {
        std::iter::from_fn(|| self.next_frame()).collect()
    }

    /// Bytes buffered but not yet decoded.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Counters since construction.
    pub fn stats(&self) -> ReaderStats {
        self.stats
    }

    /// Current codec options.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl Default for FrameReader {
    fn default() -> Self {
        Self::new()
    }
}
