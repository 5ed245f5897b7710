use crate::error::Result;

/// A duplex byte channel with "bytes available" polling.
///
/// This is the fundamental I/O seam of the link. Implementations are opened
/// by their own constructors (e.g. [`crate::SerialLink::open`]) and are owned
/// exclusively by whoever drives the protocol on top of them.
pub trait ByteChannel: Send {
    /// Write every byte of `bytes`, retrying short writes.
    fn write_all(&mut self, bytes: &[u8]) -> Result<()>;

    /// Flush any buffered output to the wire.
    fn flush(&mut self) -> Result<()>;

    /// Number of received bytes that can be read without blocking.
    fn bytes_available(&mut self) -> Result<usize>;

    /// Read up to `buf.len()` bytes, returning how many were read.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Release the underlying resource. Further calls fail with
    /// [`crate::TransportError::Shutdown`].
    fn close(&mut self) -> Result<()>;
}

impl<C: ByteChannel + ?Sized> ByteChannel for Box<C> {
    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).write_all(bytes)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn bytes_available(&mut self) -> Result<usize> {
        (**self).bytes_available()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).read(buf)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}
