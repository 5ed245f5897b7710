/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The input is not exactly one frame long.
    #[error("invalid frame size ({len} bytes, expected 9)")]
    InvalidSize { len: usize },

    /// The frame does not start with the magic sequence.
    #[error("invalid frame magic (expected A5 AA AA)")]
    InvalidMagic,

    /// The trailing checksum disagrees with the command and data bytes.
    #[error("checksum mismatch (computed {expected:#04x}, received {actual:#04x})")]
    ChecksumMismatch { expected: u8, actual: u8 },

    /// The byte channel failed while writing a frame.
    #[error("frame transport error: {0}")]
    Transport(#[from] sunflower_transport::TransportError),
}

pub type Result<T> = std::result::Result<T, FrameError>;
