use sunflower_transport::ByteChannel;
use tracing::debug;

use crate::error::Result;

/// Bytes written once when a link is opened, before any frame.
///
/// None of them is a magic byte, so a device that is mid-resync simply
/// discards them.
pub const WAKEUP: [u8; 3] = [0x1E, 0x1E, 0x1E];

/// Write the wakeup sequence to a freshly opened channel.
pub fn send_wakeup<C: ByteChannel + ?Sized>(channel: &mut C) -> Result<()> {
    channel.write_all(&WAKEUP)?;
    channel.flush()?;
    debug!("sent wakeup sequence");
    Ok(())
}
