//! Fixed-size checksummed framing for the Sunflower tracker protocol.
//!
//! Every message on the wire is exactly nine bytes:
//! - A 3-byte magic sequence (`A5 AA AA`) marking the start of a frame
//! - A 1-byte command opcode
//! - A 4-byte little-endian data word
//! - A 1-byte XOR checksum over the command and data bytes
//!
//! The fixed size is what makes resynchronization possible: the
//! [`FrameReader`] slides one byte at a time until the next nine bytes decode.

pub mod codec;
pub mod command;
pub mod error;
pub mod reader;
pub mod writer;

pub use codec::{checksum, decode, decode_with, encode, encode_frame, Frame, FrameConfig, FRAME_SIZE, MAGIC};
pub use command::{Command, ErrorCode, OkCode, TrackerState, TrackingMode};
pub use error::{FrameError, Result};
pub use reader::{FrameReader, ReaderStats};
pub use writer::FrameWriter;
