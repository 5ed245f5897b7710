use std::io::{ErrorKind, Read, Write};
use std::time::Duration;

use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::traits::ByteChannel;

/// Baud rate the tracker firmware is built for.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Timeout applied to each underlying read call.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Line settings for a serial link. Framing is always 8N1.
#[derive(Debug, Clone)]
pub struct SerialConfig {
    /// Line speed in bits per second.
    pub baud_rate: u32,
    /// Timeout for each blocking read/write on the port.
    pub read_timeout: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

/// Serial-port backed [`ByteChannel`].
pub struct SerialLink {
    port: Option<Box<dyn SerialPort>>,
    endpoint: String,
}

impl SerialLink {
    /// Open `endpoint` (e.g. `/dev/ttyUSB0`, `COM3`) with 8N1 framing.
    pub fn open(endpoint: &str, config: &SerialConfig) -> Result<Self> {
        let port = serialport::new(endpoint, config.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(config.read_timeout)
            .open()
            .map_err(|source| TransportError::Open {
                endpoint: endpoint.to_string(),
                source,
            })?;

        info!(endpoint, baud = config.baud_rate, "opened serial link");

        Ok(Self {
            port: Some(port),
            endpoint: endpoint.to_string(),
        })
    }

    /// The endpoint this link was opened on.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn port(&mut self) -> Result<&mut Box<dyn SerialPort>> {
        self.port.as_mut().ok_or(TransportError::Shutdown)
    }
}

impl ByteChannel for SerialLink {
    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        let port = self.port()?;
        let mut offset = 0usize;
        while offset < bytes.len() {
            match port.write(&bytes[offset..]) {
                Ok(0) => return Err(TransportError::Shutdown),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        let port = self.port()?;
        loop {
            match port.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }

    fn bytes_available(&mut self) -> Result<usize> {
        let available = self.port()?.bytes_to_read()?;
        Ok(available as usize)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let port = self.port()?;
        loop {
            match port.read(buf) {
                Ok(n) => return Ok(n),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::TimedOut => return Ok(0),
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }

    fn close(&mut self) -> Result<()> {
        if self.port.take().is_some() {
            debug!(endpoint = %self.endpoint, "closed serial link");
        }
        Ok(())
    }
}

impl std::fmt::Debug for SerialLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialLink")
            .field("endpoint", &self.endpoint)
            .field("open", &self.port.is_some())
            .finish()
    }
}
