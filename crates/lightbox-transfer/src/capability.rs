//! Host capabilities the controller drives
//!
//! The controller never touches the network, the media store or the share
//! sheet directly. Hosts implement these traits and pick the set that fits
//! their platform in [`Capabilities::for_platform`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::HostResult;
use crate::platform::Platform;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionStatus {
    Granted,
    Denied,
}

impl PermissionStatus {
    pub fn is_granted(&self) -> bool {
        matches!(self, PermissionStatus::Granted)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaAsset {
    pub id: String,
    pub uri: String,
    pub file_name: String,
    pub sha256: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Fetches remote resources into local files
#[async_trait]
pub trait FileTransfer: Send + Sync {
    /// Download `url` into `dest`, overwriting it. Returns the written path.
    async fn download(&self, url: &str, dest: &Path) -> HostResult<PathBuf>;

    async fn delete(&self, path: &Path) -> HostResult<()>;
}

#[async_trait]
pub trait PermissionService: Send + Sync {
    /// Ask for storage / media library access
    async fn request_media_access(&self) -> HostResult<PermissionStatus>;
}

/// Device media store. Registration is expected to be idempotent.
#[async_trait]
pub trait MediaLibrary: Send + Sync {
    async fn create_asset(&self, path: &Path) -> HostResult<MediaAsset>;

    async fn album(&self, name: &str) -> HostResult<Option<Album>>;

    /// Create `name` with `asset` as its first member
    async fn create_album(&self, name: &str, asset: &MediaAsset) -> HostResult<Album>;

    async fn add_to_album(&self, album: &Album, asset: &MediaAsset) -> HostResult<()>;
}

/// Native share sheet. Returns once the sheet has been invoked, not closed.
#[async_trait]
pub trait ShareSheet: Send + Sync {
    async fn share(&self, path: &Path) -> HostResult<()>;
}

/// User-facing messages, in two severities that are never mixed up
pub trait Notifier: Send + Sync {
    /// Lightweight success message
    fn toast(&self, message: &str);

    /// Blocking error message
    fn alert(&self, title: &str, message: &str);
}

/// How a share request is fulfilled
#[derive(Clone)]
pub enum ShareChannel {
    /// No file system hand-off, the user is told the link was copied
    CopyLink,
    /// Hand a temporary local copy to the OS share sheet
    Native(Arc<dyn ShareSheet>),
}

impl std::fmt::Debug for ShareChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShareChannel::CopyLink => write!(f, "CopyLink"),
            ShareChannel::Native(_) => write!(f, "Native"),
        }
    }
}

/// Everything a host can offer, before platform selection
#[derive(Clone)]
pub struct HostServices {
    pub transfer: Arc<dyn FileTransfer>,
    pub permissions: Arc<dyn PermissionService>,
    pub media_library: Arc<dyn MediaLibrary>,
    pub share_sheet: Arc<dyn ShareSheet>,
    pub notifier: Arc<dyn Notifier>,
}

/// The capability set a controller actually uses
#[derive(Clone)]
pub struct Capabilities {
    pub transfer: Arc<dyn FileTransfer>,
    pub permissions: Arc<dyn PermissionService>,
    pub media_library: Option<Arc<dyn MediaLibrary>>,
    pub share: ShareChannel,
    pub notifier: Arc<dyn Notifier>,
}

impl Capabilities {
    pub fn for_platform(platform: Platform, services: HostServices) -> Self {
        let media_library = platform
            .has_media_library()
            .then(|| Arc::clone(&services.media_library));

        let share = if platform.is_web() {
            ShareChannel::CopyLink
        } else {
            ShareChannel::Native(Arc::clone(&services.share_sheet))
        };

        tracing::debug!(
            %platform,
            media_library = media_library.is_some(),
            share = ?share,
            "Selected capabilities"
        );

        Self {
            transfer: services.transfer,
            permissions: services.permissions,
            media_library,
            share,
            notifier: services.notifier,
        }
    }
}
