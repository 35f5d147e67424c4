//! Transfer error types

use thiserror::Error;

use crate::status::TransferStatus;

/// Failure reported by a host capability.
///
/// The message is shown to the user as-is, so it is kept verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct HostError {
    message: String,
}

impl HostError {
    pub fn new(message: impl std::fmt::Display) -> Self {
        Self {
            message: message.to_string(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<std::io::Error> for HostError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e)
    }
}

pub type HostResult<T> = std::result::Result<T, HostError>;

#[derive(Error, Debug)]
pub enum TransferError {
    #[error("Permission denied. Unable to download the image.")]
    PermissionDenied,

    #[error("Another transfer is in progress: {0}")]
    Busy(TransferStatus),

    #[error("{0}")]
    Failed(HostError),

    #[error("Share failed: {0}")]
    Share(HostError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}
