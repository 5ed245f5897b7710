//! Synchronous request/response link to a Sunflower tracker.
//!
//! This is the "just works" layer. Open a link, then [`Link::transact`] one
//! frame at a time; a background receiver keeps the inbound byte stream
//! aligned and hands validated frames back as responses.

pub mod connector;
pub mod error;
pub mod handshake;
pub mod link;
mod receiver;
mod shared;

pub use connector::{open, open_with_config};
pub use error::{LinkError, Result};
pub use handshake::{send_wakeup, WAKEUP};
pub use link::{Link, LinkConfig, Transactor, DEFAULT_RESPONSE_TIMEOUT};
