use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use sunflower_frame::{Frame, FrameConfig, FrameReader};
use sunflower_transport::{ByteChannel, TransportError};
use tracing::{debug, error, trace};

use crate::shared::SharedChannel;

const READ_CHUNK_SIZE: usize = 256;

/// Why the receiver stopped, if it stopped on its own.
pub(crate) type StopReason = Arc<Mutex<Option<String>>>;

pub(crate) struct ReceiverConfig {
    pub idle_poll: Duration,
    pub frame: FrameConfig,
}

/// Start the background receiver.
///
/// The thread polls the channel for available bytes, runs them through a
/// [`FrameReader`], and forwards every recovered frame in arrival order. It
/// exits when `running` is cleared or the channel fails; either way the
/// sender is dropped, which is how waiting callers learn the link is gone.
pub(crate) fn spawn<C: ByteChannel + 'static>(
    channel: SharedChannel<C>,
    config: ReceiverConfig,
    running: Arc<AtomicBool>,
    frames: Sender<Frame>,
    stop_reason: StopReason,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("sunflower-rx".to_string())
        .spawn(move || run(channel, config, running, frames, stop_reason))
}

fn run<C: ByteChannel>(
    channel: SharedChannel<C>,
    config: ReceiverConfig,
    running: Arc<AtomicBool>,
    frames: Sender<Frame>,
    stop_reason: StopReason,
) {
    let mut reader = FrameReader::with_config(config.frame);
    let mut chunk = [0u8; READ_CHUNK_SIZE];

    debug!("receiver started");
    while running.load(Ordering::SeqCst) {
        match read_available(&channel, &mut chunk) {
            Ok(0) => thread::sleep(config.idle_poll),
            Ok(n) => {
                trace!(bytes = n, "received bytes");
                reader.extend(&chunk[..n]);
                while let Some(frame) = reader.next_frame() {
                    if frames.send(frame).is_err() {
                        debug!("response queue dropped, receiver exiting");
                        return;
                    }
                }
            }
            Err(err) if !err.is_fatal() => thread::sleep(config.idle_poll),
            Err(err) => {
                if running.load(Ordering::SeqCst) {
                    error!(error = %err, "transport failed, receiver stopping");
                    *crate::shared::lock(&stop_reason) = Some(err.to_string());
                }
                break;
            }
        }
    }

    let stats = reader.stats();
    debug!(
        frames = stats.frames,
        discarded = stats.discarded,
        "receiver stopped"
    );
}

fn read_available<C: ByteChannel>(
    channel: &SharedChannel<C>,
    chunk: &mut [u8],
) -> Result<usize, TransportError> {
    let mut channel = channel.lock();
    let available = channel.bytes_available()?;
    if available == 0 {
        return Ok(0);
    }
    let want = available.min(chunk.len());
    channel.read(&mut chunk[..want])
}
