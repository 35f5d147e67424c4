//! Host error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("Storage error: {0}")]
    Storage(#[from] lightbox_storage::StorageError),

    #[error("Transfer error: {0}")]
    Transfer(#[from] lightbox_transfer::TransferError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
