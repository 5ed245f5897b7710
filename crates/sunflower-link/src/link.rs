use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::sync::{Arc, Mutex, TryLockError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use sunflower_frame::{Command, Frame, FrameConfig, FrameWriter};
use sunflower_transport::ByteChannel;
use tracing::{debug, info, warn};

use crate::error::{LinkError, Result};
use crate::handshake::send_wakeup;
use crate::receiver::{self, ReceiverConfig, StopReason};
use crate::shared::{lock, SharedChannel};

/// How long a transaction waits for its response by default.
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(15);

/// Link behaviour.
#[derive(Debug, Clone)]
pub struct LinkConfig {
    /// How long [`Link::transact`] waits for a response.
    pub response_timeout: Duration,
    /// Receiver sleep when no bytes are available.
    pub idle_poll: Duration,
    /// Write the wakeup sequence when the link starts.
    pub send_wakeup: bool,
    /// Drop frames already queued before sending a new request. A late
    /// response to a timed-out request would otherwise be paired with the
    /// next one.
    pub discard_stale: bool,
    /// Codec options for inbound frames.
    pub frame: FrameConfig,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
            idle_poll: Duration::from_millis(2),
            send_wakeup: true,
            discard_stale: true,
            frame: FrameConfig::default(),
        }
    }
}

/// Anything that can run one request/response exchange with the tracker.
///
/// [`Link`] is the real implementation; callers depend on this trait so they
/// can be driven by scripted responders in tests.
pub trait Transactor: Send + Sync {
    /// Send `request` and wait for the next frame.
    fn transact(&self, request: &Frame) -> Result<Frame>;

    /// Build a frame from `command` and `data`, then transact it.
    fn request(&self, command: Command, data: u32) -> Result<Frame> {
        self.transact(&Frame::new(command, data))
    }

    /// Like [`Transactor::request`], but any response other than `OK` is an
    /// error.
    fn request_ok(&self, command: Command, data: u32) -> Result<Frame> {
        let response = self.request(command, data)?;
        if response.is_ok() {
            Ok(response)
        } else {
            Err(LinkError::Rejected {
                request: command,
                response,
            })
        }
    }

    /// Release the underlying transport.
    fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// Request/response link over a [`ByteChannel`].
///
/// The link owns the channel exclusively. A background receiver thread turns
/// inbound bytes into frames; [`Link::transact`] writes one frame and takes the
/// next received frame as its response. There is no correlation identifier on
/// the wire, so transactions are serialized: at most one is in flight across
/// all threads sharing the link.
pub struct Link<C: ByteChannel + 'static> {
    channel: SharedChannel<C>,
    writer: Mutex<FrameWriter<SharedChannel<C>>>,
    responses: Mutex<Receiver<Frame>>,
    receiver: Mutex<Option<JoinHandle<()>>>,
    running: Arc<AtomicBool>,
    stop_reason: StopReason,
    config: LinkConfig,
}

impl<C: ByteChannel + 'static> Link<C> {
    /// Take ownership of `channel` and start the receiver.
    pub fn new(channel: C, config: LinkConfig) -> Result<Self> {
        let channel = SharedChannel::new(Arc::new(Mutex::new(channel)));

        if config.send_wakeup {
            send_wakeup(&mut *channel.lock())?;
        }

        let (tx, rx) = mpsc::channel();
        let running = Arc::new(AtomicBool::new(true));
        let stop_reason: StopReason = Arc::default();

        let handle = receiver::spawn(
            channel.clone(),
            ReceiverConfig {
                idle_poll: config.idle_poll,
                frame: config.frame.clone(),
            },
            Arc::clone(&running),
            tx,
            Arc::clone(&stop_reason),
        )
        .map_err(LinkError::ThreadSpawn)?;

        info!(
            response_timeout_ms = config.response_timeout.as_millis() as u64,
            "link started"
        );

        Ok(Self {
            writer: Mutex::new(FrameWriter::new(channel.clone())),
            channel,
            responses: Mutex::new(rx),
            receiver: Mutex::new(Some(handle)),
            running,
            stop_reason,
            config,
        })
    }

    /// Send `request` and block until the next frame arrives or the response
    /// timeout elapses.
    pub fn transact(&self, request: &Frame) -> Result<Frame> {
        // Held for the whole exchange: one transaction in flight.
        let mut writer = lock(&self.writer);
        let responses = lock(&self.responses);

        if self.config.discard_stale {
            while let Ok(stale) = responses.try_recv() {
                warn!(frame = %stale, "discarding unsolicited frame queued before request");
            }
        }

        let started = Instant::now();
        writer.write_frame(request)?;

        match responses.recv_timeout(self.config.response_timeout) {
            Ok(response) => {
                debug!(
                    request = %request,
                    response = %response,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "transaction complete"
                );
                Ok(response)
            }
            Err(RecvTimeoutError::Timeout) => {
                Err(LinkError::ResponseTimeout(self.config.response_timeout))
            }
            Err(RecvTimeoutError::Disconnected) => Err(self.disconnected()),
        }
    }

    /// Take a frame that arrived without an outstanding request, if any.
    ///
    /// Never waits: while a transaction is in flight on another thread the
    /// queue belongs to it, and this returns `None`.
    pub fn poll_unsolicited(&self) -> Option<Frame> {
        let responses = match self.responses.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return None,
        };
        match responses.try_recv() {
            Ok(frame) => Some(frame),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Whether the receiver is still running.
    pub fn is_connected(&self) -> bool {
        self.running.load(Ordering::SeqCst)
            && lock(&self.receiver)
                .as_ref()
                .is_some_and(|handle| !handle.is_finished())
    }

    /// Stop the receiver, wait for it, then close the channel.
    ///
    /// Safe to call more than once.
    pub fn close(&self) -> Result<()> {
        self.running.store(false, Ordering::SeqCst);
        let handle = lock(&self.receiver).take();
        let Some(handle) = handle else {
            return Ok(());
        };
        if handle.join().is_err() {
            warn!("receiver thread panicked");
        }
        self.channel.lock().close()?;
        info!("link closed");
        Ok(())
    }

    /// Current configuration.
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    fn disconnected(&self) -> LinkError {
        let reason = lock(&self.stop_reason)
            .clone()
            .unwrap_or_else(|| "receiver stopped".to_string());
        LinkError::Disconnected(reason)
    }
}

impl<C: ByteChannel + 'static> Transactor for Link<C> {
    fn transact(&self, request: &Frame) -> Result<Frame> {
        Link::transact(self, request)
    }

    fn close(&self) -> Result<()> {
        Link::close(self)
    }
}

impl<C: ByteChannel + 'static> Drop for Link<C> {
    fn drop(&mut self) {
        if let Err(err) = Link::close(self) {
            debug!(error = %err, "error closing link on drop");
        }
    }
}

impl<C: ByteChannel + 'static> std::fmt::Debug for Link<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Link")
            .field("running", &self.running.load(Ordering::SeqCst))
            .field("config", &self.config)
            .finish()
    }
}
