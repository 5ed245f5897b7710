//! Drive a Sunflower solar tracker over its serial link.
//!
//! The tracker speaks a fixed 9-byte framed protocol. This crate bundles the
//! layers that talk it:
//!
//! - [`transport`]: byte channels (serial port, in-memory pair)
//! - [`frame`]: frame codec and resynchronizing reader
//! - [`link`]: synchronous request/response over a background receiver
//! - [`control`]: operator-driven control loop and safety commands (behind
//!   the `control` feature)

/// Re-export transport types.
pub mod transport {
    pub use sunflower_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use sunflower_frame::*;
}

/// Re-export link types.
pub mod link {
    pub use sunflower_link::*;
}

/// Re-export control types (requires `control` feature).
#[cfg(feature = "control")]
pub mod control {
    pub use sunflower_control::*;
}
