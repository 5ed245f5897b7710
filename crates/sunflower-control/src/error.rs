/// Errors that end a control session.
///
/// Transaction-scoped failures (timeouts, non-OK answers) are handled inside
/// the loop and handlers; only a lost link reaches the caller.
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    /// The link to the tracker failed.
    #[error("link failure: {0}")]
    Link(#[from] sunflower_link::LinkError),
}

pub type Result<T> = std::result::Result<T, ControlError>;
