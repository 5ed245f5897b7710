use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{Result, TransportError};
use crate::traits::ByteChannel;

type Pipe = Arc<Mutex<VecDeque<u8>>>;

/// One end of an in-memory duplex byte channel.
///
/// Bytes written on one end become available on the other. Closing either end
/// shuts down both directions, the way unplugging a cable would.
#[derive(Debug)]
pub struct MemoryChannel {
    inbound: Pipe,
    outbound: Pipe,
    closed: Arc<AtomicBool>,
}

impl MemoryChannel {
    /// Create a connected pair of channel ends.
    pub fn pair() -> (Self, Self) {
        let a_to_b: Pipe = Arc::default();
        let b_to_a: Pipe = Arc::default();
        let closed = Arc::new(AtomicBool::new(false));

        let a = Self {
            inbound: Arc::clone(&b_to_a),
            outbound: Arc::clone(&a_to_b),
            closed: Arc::clone(&closed),
        };
        let b = Self {
            inbound: a_to_b,
            outbound: b_to_a,
            closed,
        };
        (a, b)
    }

    /// Whether either end has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            Err(TransportError::Shutdown)
        } else {
            Ok(())
        }
    }
}

fn lock(pipe: &Pipe) -> MutexGuard<'_, VecDeque<u8>> {
    pipe.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ByteChannel for MemoryChannel {
    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.ensure_open()?;
        lock(&self.outbound).extend(bytes.iter().copied());
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.ensure_open()
    }

    fn bytes_available(&mut self) -> Result<usize> {
        self.ensure_open()?;
        Ok(lock(&self.inbound).len())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.ensure_open()?;
        let mut inbound = lock(&self.inbound);
        let n = buf.len().min(inbound.len());
        for (slot, byte) in buf.iter_mut().zip(inbound.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    fn close(&mut self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
