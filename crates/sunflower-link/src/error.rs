use sunflower_frame::{Command, Frame};

/// Errors that can occur in link operations.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] sunflower_transport::TransportError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] sunflower_frame::FrameError),

    /// No response frame arrived in time.
    #[error("no response within {0:?}")]
    ResponseTimeout(std::time::Duration),

    /// The device answered with something other than `OK`.
    #[error("{request} rejected: {response}")]
    Rejected { request: Command, response: Frame },

    /// The receiver has stopped; the link is unusable.
    #[error("link disconnected: {0}")]
    Disconnected(String),

    /// The background receiver could not be started.
    #[error("failed to start receiver thread: {0}")]
    ThreadSpawn(std::io::Error),
}

impl LinkError {
    /// True for failures scoped to a single transaction (timeout or a non-OK
    /// answer). Everything else means the link itself is gone.
    pub fn is_transaction_failure(&self) -> bool {
        matches!(
            self,
            LinkError::ResponseTimeout(_) | LinkError::Rejected { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, LinkError>;

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn classifies_transaction_failures() {
        assert!(LinkError::ResponseTimeout(Duration::from_secs(15)).is_transaction_failure());
        assert!(LinkError::Rejected {
            request: Command::Home,
            response: Frame::new(Command::Error, 1),
        }
        .is_transaction_failure());
        assert!(!LinkError::Disconnected("gone".into()).is_transaction_failure());
        assert!(!LinkError::Transport(sunflower_transport::TransportError::Shutdown)
            .is_transaction_failure());
    }

    #[test]
    fn rejected_message_names_error_code() {
        let err = LinkError::Rejected {
            request: Command::ResetStop,
            response: Frame::new(Command::Error, 4),
        };
        assert_eq!(
            err.to_string(),
            "RESET_STOP rejected: ERROR SAFETY_BUTTON_NOT_RELEASED"
        );
    }
}
