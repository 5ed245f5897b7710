/// Errors that can occur in byte channel operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to open the specified endpoint.
    #[error("failed to open {endpoint}: {source}")]
    Open {
        endpoint: String,
        source: serialport::Error,
    },

    /// The serial driver reported an error.
    #[error("serial error: {0}")]
    Serial(#[from] serialport::Error),

    /// An I/O error occurred on the channel.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The channel has been closed.
    #[error("transport shut down")]
    Shutdown,
}

impl TransportError {
    /// Whether this error means the channel can no longer be used.
    pub fn is_fatal(&self) -> bool {
        match self {
            TransportError::Io(err) => !matches!(
                err.kind(),
                std::io::ErrorKind::Interrupted
                    | std::io::ErrorKind::WouldBlock
                    | std::io::ErrorKind::TimedOut
            ),
            _ => true,
        }
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
