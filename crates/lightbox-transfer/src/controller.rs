//! Transfer controller
//!
//! Owns the screen's single status slot and drives the permission, download,
//! media library and share capabilities for one [`ViewRequest`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use crate::capability::{Capabilities, MediaLibrary, PermissionStatus, ShareChannel};
use crate::cleanup::CleanupScheduler;
use crate::display::{compute_display_size, DisplaySize};
use crate::error::{HostResult, TransferError};
use crate::platform::Platform;
use crate::request::ViewRequest;
use crate::status::TransferStatus;
use crate::Result;

pub const DEFAULT_CLEANUP_DELAY: Duration = Duration::from_secs(10);
pub const DEFAULT_ALBUM_NAME: &str = "Download";

const ALERT_TITLE: &str = "Image";
const DOWNLOADED_MESSAGE: &str = "Image downloaded";
const PERMISSION_DENIED_MESSAGE: &str = "Permission denied. Unable to download the image.";
const LINK_COPIED_MESSAGE: &str = "Link copied";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// Documents area, handed on to the media library where there is one
    Permanent,
    /// Cache area, deleted after the cleanup delay
    Temporary,
}

impl FileKind {
    fn status(&self) -> TransferStatus {
        match self {
            FileKind::Permanent => TransferStatus::Downloading,
            FileKind::Temporary => TransferStatus::Sharing,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalFile {
    pub path: PathBuf,
    pub kind: FileKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
    /// Web-like context, nothing was downloaded
    LinkCopied,
    Shared(LocalFile),
}

#[derive(Debug, Clone)]
pub struct TransferSettings {
    pub documents_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub cleanup_delay: Duration,
    pub album_name: String,
}

impl TransferSettings {
    pub fn new(documents_dir: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            documents_dir: documents_dir.into(),
            cache_dir: cache_dir.into(),
            cleanup_delay: DEFAULT_CLEANUP_DELAY,
            album_name: DEFAULT_ALBUM_NAME.to_string(),
        }
    }
}

/// Holds the status slot for one operation and hands it back on drop,
/// whichever way the operation ends.
struct StatusClaim<'a> {
    status: &'a watch::Sender<TransferStatus>,
}

impl Drop for StatusClaim<'_> {
    fn drop(&mut self) {
        self.status.send_replace(TransferStatus::Idle);
    }
}

pub struct TransferController {
    request: ViewRequest,
    platform: Platform,
    capabilities: Capabilities,
    settings: TransferSettings,
    status: watch::Sender<TransferStatus>,
    cleanup: CleanupScheduler,
}

impl TransferController {
    /// The controller starts in `Loading` until the image has been painted.
    pub fn new(
        request: ViewRequest,
        platform: Platform,
        capabilities: Capabilities,
        settings: TransferSettings,
    ) -> Self {
        let (status, _) = watch::channel(TransferStatus::Loading);
        let cleanup = CleanupScheduler::new(
            Arc::clone(&capabilities.transfer),
            settings.cleanup_delay,
        );

        Self {
            request,
            platform,
            capabilities,
            settings,
            status,
            cleanup,
        }
    }

    pub fn request(&self) -> &ViewRequest {
        &self.request
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn status(&self) -> TransferStatus {
        *self.status.borrow()
    }

    /// Receiver for UI code that renders spinners from the status
    pub fn subscribe(&self) -> watch::Receiver<TransferStatus> {
        self.status.subscribe()
    }

    pub fn display_size(&self, viewport_width: f64) -> DisplaySize {
        compute_display_size(&self.request, viewport_width, self.platform)
    }

    /// Destination of a transfer. Stable per request, so repeats overwrite.
    pub fn destination(&self, kind: FileKind) -> PathBuf {
        let dir = match kind {
            FileKind::Permanent => &self.settings.documents_dir,
            FileKind::Temporary => &self.settings.cache_dir,
        };
        dir.join(self.request.file_name())
    }

    pub fn pending_cleanups(&self) -> Vec<PathBuf> {
        self.cleanup.pending()
    }

    pub fn on_image_loaded(&self) {
        let loaded = self.status.send_if_modified(|status| {
            if *status == TransferStatus::Loading {
                *status = TransferStatus::Idle;
                true
            } else {
                false
            }
        });

        if loaded {
            tracing::debug!(url = %self.request.source_url(), "Image loaded");
        }
    }

    /// Save the image to permanent storage after asking for media access.
    pub async fn request_download(&self) -> Result<LocalFile> {
        let _claim = self.claim(TransferStatus::Downloading)?;

        let permission = match self.capabilities.permissions.request_media_access().await {
            Ok(permission) => permission,
            Err(e) => {
                tracing::warn!(error = %e, "Permission request failed");
                PermissionStatus::Denied
            }
        };

        if !permission.is_granted() {
            tracing::info!(file_name = %self.request.file_name(), "Media access denied");
            self.capabilities.notifier.toast(PERMISSION_DENIED_MESSAGE);
            return Err(TransferError::PermissionDenied);
        }

        let file = self.run_transfer(FileKind::Permanent).await?;
        self.capabilities.notifier.toast(DOWNLOADED_MESSAGE);

        Ok(file)
    }

    pub async fn request_share(&self) -> Result<ShareOutcome> {
        let share_sheet = match &self.capabilities.share {
            ShareChannel::CopyLink => {
                self.capabilities.notifier.toast(LINK_COPIED_MESSAGE);
                return Ok(ShareOutcome::LinkCopied);
            }
            ShareChannel::Native(sheet) => Arc::clone(sheet),
        };

        let _claim = self.claim(TransferStatus::Sharing)?;
        let file = self.run_transfer(FileKind::Temporary).await?;

        if let Err(e) = share_sheet.share(&file.path).await {
            tracing::warn!(path = %file.path.display(), error = %e, "Share sheet failed");
            self.capabilities.notifier.alert(ALERT_TITLE, e.message());
            return Err(TransferError::Share(e));
        }

        tracing::info!(path = %file.path.display(), "Shared image");
        Ok(ShareOutcome::Shared(file))
    }

    /// Copy the image to the area for `kind`.
    ///
    /// Failures raise the blocking alert before they are returned.
    pub async fn transfer(&self, kind: FileKind) -> Result<LocalFile> {
        let _claim = self.claim(kind.status())?;
        self.run_transfer(kind).await
    }

    /// Screen teardown: pending temporary files are removed now.
    pub async fn close(&self) {
        self.cleanup.shutdown().await;
    }

    fn claim(&self, target: TransferStatus) -> Result<StatusClaim<'_>> {
        let mut current = target;
        let claimed = self.status.send_if_modified(|status| {
            current = *status;
            if !status.is_busy() && status.can_transition_to(target) {
                *status = target;
                true
            } else {
                false
            }
        });

        if !claimed {
            tracing::debug!(%current, requested = %target, "Rejected overlapping transfer");
            return Err(TransferError::Busy(current));
        }

        Ok(StatusClaim {
            status: &self.status,
        })
    }

    async fn run_transfer(&self, kind: FileKind) -> Result<LocalFile> {
        match self.fetch(kind).await {
            Ok(file) => Ok(file),
            Err(e) => {
                tracing::warn!(
                    url = %self.request.source_url(),
                    ?kind,
                    error = %e,
                    "Transfer failed"
                );
                self.capabilities.notifier.alert(ALERT_TITLE, e.message());
                Err(TransferError::Failed(e))
            }
        }
    }

    async fn fetch(&self, kind: FileKind) -> HostResult<LocalFile> {
        let dest = self.destination(kind);
        let path = self
            .capabilities
            .transfer
            .download(self.request.source_url(), &dest)
            .await?;

        tracing::info!(path = %path.display(), ?kind, "Downloaded image");

        match kind {
            FileKind::Permanent => {
                if let Some(library) = &self.capabilities.media_library {
                    self.register(library.as_ref(), &path).await?;
                }
            }
            FileKind::Temporary => self.cleanup.schedule(path.clone()),
        }

        Ok(LocalFile { path, kind })
    }

    async fn register(&self, library: &dyn MediaLibrary, path: &Path) -> HostResult<()> {
        let asset = library.create_asset(path).await?;
        let album_name = &self.settings.album_name;

        match library.album(album_name).await? {
            Some(album) => library.add_to_album(&album, &asset).await?,
            None => {
                library.create_album(album_name, &asset).await?;
            }
        }

        tracing::info!(asset_id = %asset.id, album = %album_name, "Registered media asset");
        Ok(())
    }
}
