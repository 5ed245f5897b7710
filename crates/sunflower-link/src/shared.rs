use std::sync::{Arc, Mutex, MutexGuard};

use sunflower_transport::{ByteChannel, Result};

/// A byte channel shared between the writer side of a link and its receiver
/// thread. Each call holds the lock for that call only.
pub(crate) struct SharedChannel<C> {
    inner: Arc<Mutex<C>>,
}

impl<C> SharedChannel<C> {
    pub(crate) fn new(inner: Arc<Mutex<C>>) -> Self {
        Self { inner }
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, C> {
        lock(&self.inner)
    }
}

impl<C> Clone for SharedChannel<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Lock a channel, recovering from poisoning.
pub(crate) fn lock<C>(inner: &Mutex<C>) -> MutexGuard<'_, C> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<C: ByteChannel> ByteChannel for SharedChannel<C> {
    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.lock().write_all(bytes)
    }

    fn flush(&mut self) -> Result<()> {
        self.lock().flush()
    }

    fn bytes_available(&mut self) -> Result<usize> {
        self.lock().bytes_available()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.lock().read(buf)
    }

    fn close(&mut self) -> Result<()> {
        self.lock().close()
    }
}
