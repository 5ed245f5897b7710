//! Duplex byte channel abstraction.
//!
//! Provides a unified interface over the byte streams the tracker link runs on:
//! - Serial lines (via `serialport`)
//! - In-memory duplex pairs (tests, simulators)
//!
//! This is the lowest layer of sunflower. Everything else builds on top of
//! the [`ByteChannel`] trait provided here.

pub mod error;
pub mod memory;
pub mod serial;
pub mod traits;

pub use error::{Result, TransportError};
pub use memory::MemoryChannel;
pub use serial::{SerialConfig, SerialLink, DEFAULT_BAUD_RATE, DEFAULT_READ_TIMEOUT};
pub use traits::ByteChannel;
