//! Lightbox Host
//!
//! Concrete capabilities for the image viewer and the composition root that
//! wires them into transfer controllers.

mod config;
mod error;
mod http;
mod media;
mod notify;
mod permissions;
mod share;
mod viewer;

pub use config::Config;
pub use error::ViewerError;
pub use http::HttpTransfer;
pub use media::LocalMediaLibrary;
pub use notify::{ChannelNotifier, Notice, Severity, TracingNotifier};
pub use permissions::{ConsentPrompt, FixedConsent, PermissionState, PermissionStore};
pub use share::CommandShareSheet;
pub use viewer::Viewer;

// Re-export the controller surface
pub use lightbox_storage::{Database, StorageError};
pub use lightbox_transfer::{
    compute_display_size, DisplaySize, FileKind, LocalFile, Platform, ShareOutcome,
    TransferController, TransferError, TransferStatus, ViewRequest,
};

pub type Result<T> = std::result::Result<T, ViewerError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
