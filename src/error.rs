use std::time::Duration;

use crate::common::ToastId;

pub type Result<T, E = ToastError> = std::result::Result<T, E>;

#[derive(Debug, Clone, thiserror::Error)]
pub enum ToastError {
    /// Blank content or missing origin.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Duration {requested:?} exceeds maximum {max:?}, clamping")]
    DurationOutOfRange { requested: Duration, max: Duration },

    #[error("Presentation failure: {0}")]
    PresentationFailure(String),

    /// The handle was already dismissed or never existed.
    #[error("Unknown toast handle: {0}")]
    UnknownHandle(ToastId),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Toaster is shut down")]
    Closed,
}
