use std::fmt;

use bytes::{BufMut, BytesMut};

use crate::command::{Command, ErrorCode, TrackerState};
use crate::error::{FrameError, Result};

/// Frame size on the wire: magic (3) + command (1) + data (4) + checksum (1).
pub const FRAME_SIZE: usize = 9;

/// Magic bytes that open every frame.
pub const MAGIC: [u8; 3] = [0xA5, 0xAA, 0xAA];

/// A single protocol frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    /// Leading bytes as received. Always [`MAGIC`] for frames built locally.
    pub magic: [u8; 3],
    /// Raw command byte. See [`Frame::command`] for the typed opcode.
    pub command: u8,
    /// Data word.
    pub data: u32,
    /// Checksum as carried on the wire.
    pub checksum: u8,
}

impl Frame {
    /// Build an outbound frame.
    pub fn new(command: Command, data: u32) -> Self {
        Self::from_raw(command.as_u8(), data)
    }

    /// Build an outbound frame from a raw command byte.
    pub fn from_raw(command: u8, data: u32) -> Self {
        Self {
            magic: MAGIC,
            command,
            data,
            checksum: checksum(command, data),
        }
    }

    /// Typed opcode, if the command byte is a known one.
    pub fn command(&self) -> Option<Command> {
        Command::from_u8(self.command)
    }

    /// True when the frame is an `OK` confirmation.
    pub fn is_ok(&self) -> bool {
        self.command == Command::Ok.as_u8()
    }

    /// The error reason, when this is an `ERROR` frame.
    pub fn error_code(&self) -> Option<ErrorCode> {
        (self.command == Command::Error.as_u8()).then(|| ErrorCode::from_data(self.data))
    }

    /// Interpret the data word as a tracker state.
    pub fn tracker_state(&self) -> TrackerState {
        TrackerState::from_data(self.data)
    }

    /// Serialize to the nine wire bytes.
    pub fn to_bytes(&self) -> [u8; FRAME_SIZE] {
        let mut out = [0u8; FRAME_SIZE];
        out[..3].copy_from_slice(&self.magic);
        out[3] = self.command;
        out[4..8].copy_from_slice(&self.data.to_le_bytes());
        out[8] = self.checksum;
        out
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.command() {
            Some(Command::Error) => write!(f, "ERROR {}", ErrorCode::from_data(self.data)),
            Some(cmd) => write!(f, "{cmd} data={}", self.data),
            None => write!(f, "0x{:02X} data={}", self.command, self.data),
        }
    }
}

/// Codec options.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Reject frames whose leading bytes are not [`MAGIC`]. Default: true.
    pub verify_magic: bool,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self { verify_magic: true }
    }
}

/// XOR of the command byte and the four data bytes.
pub fn checksum(command: u8, data: u32) -> u8 {
    data.to_le_bytes().iter().fold(command, |acc, b| acc ^ b)
}

/// Encode a command and data word into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────────┬─────────┬────────────┬──────────┐
/// │ Magic (3B)   │ Command │ Data       │ Checksum │
/// │ A5 AA AA     │ (1B)    │ (4B LE)    │ (1B XOR) │
/// └──────────────┴─────────┴────────────┴──────────┘
/// ```
pub fn encode(command: Command, data: u32) -> [u8; FRAME_SIZE] {
    Frame::new(command, data).to_bytes()
}

/// Append the wire form of `frame` to `dst`.
pub fn encode_frame(frame: &Frame, dst: &mut BytesMut) {
    dst.reserve(FRAME_SIZE);
    dst.put_slice(&frame.magic);
    dst.put_u8(frame.command);
    dst.put_u32_le(frame.data);
    dst.put_u8(frame.checksum);
}

/// Decode exactly one frame, verifying magic and checksum.
pub fn decode(src: &[u8]) -> Result<Frame> {
    decode_with(src, &FrameConfig::default())
}

/// Decode exactly one frame using explicit codec options.
pub fn decode_with(src: &[u8], config: &FrameConfig) -> Result<Frame> {
    if src.len() != FRAME_SIZE {
        return Err(FrameError::InvalidSize { len: src.len() });
    }

    if config.verify_magic && src[..3] != MAGIC {
        return Err(FrameError::InvalidMagic);
    }

    let command = src[3];
    let data = u32::from_le_bytes([src[4], src[5], src[6], src[7]]);
    let actual = src[8];
    let expected = checksum(command, data);
    if expected != actual {
        return Err(FrameError::ChecksumMismatch { expected, actual });
    }

    Ok(Frame {
        magic: [src[0], src[1], src[2]],
        command,
        data,
        checksum: actual,
    })
}
