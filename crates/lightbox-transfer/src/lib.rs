//! Lightbox Transfer
//!
//! Download, share and permission workflow behind the full-screen image
//! viewer. The controller keeps one status for the UI and drives host
//! capabilities:
//! - media library permission
//! - download to permanent or temporary storage
//! - media library registration into the "Download" album
//! - share sheet hand-off with deferred cleanup

mod capability;
mod cleanup;
mod controller;
mod display;
mod error;
mod platform;
mod request;
mod status;

#[cfg(test)]
mod testing;

pub use capability::{
    Album, Capabilities, FileTransfer, HostServices, MediaAsset, MediaLibrary, Notifier,
    PermissionService, PermissionStatus, ShareChannel, ShareSheet,
};
pub use cleanup::CleanupScheduler;
pub use controller::{
    FileKind, LocalFile, ShareOutcome, TransferController, TransferSettings, DEFAULT_ALBUM_NAME,
    DEFAULT_CLEANUP_DELAY,
};
pub use display::{compute_display_size, DisplaySize};
pub use error::{HostError, HostResult, TransferError};
pub use platform::Platform;
pub use request::ViewRequest;
pub use status::TransferStatus;

pub type Result<T> = std::result::Result<T, TransferError>;
