//! In-memory host used by the controller tests

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{watch, Notify};

use crate::capability::{
    Album, Capabilities, FileTransfer, HostServices, MediaAsset, MediaLibrary, Notifier,
    PermissionService, PermissionStatus, ShareSheet,
};
use crate::controller::{TransferController, TransferSettings};
use crate::error::{HostError, HostResult};
use crate::platform::Platform;
use crate::request::ViewRequest;
use crate::status::TransferStatus;

#[derive(Debug, Default)]
pub struct Calls {
    pub permission_requests: usize,
    pub downloads: Vec<(String, PathBuf)>,
    pub deletes: Vec<PathBuf>,
    pub assets: Vec<PathBuf>,
    pub albums_created: Vec<String>,
    pub album_adds: Vec<(String, String)>,
    pub shares: Vec<PathBuf>,
    pub toasts: Vec<String>,
    pub alerts: Vec<(String, String)>,
    /// Status seen by each capability call, in call order
    pub observed: Vec<TransferStatus>,
}

pub struct FakeHost {
    pub calls: Mutex<Calls>,
    pub permission: Mutex<PermissionStatus>,
    pub permission_error: Mutex<Option<String>>,
    pub download_error: Mutex<Option<String>>,
    pub share_error: Mutex<Option<String>>,
    /// When set, downloads wait for `release()`
    pub hold_downloads: Mutex<bool>,
    gate: Notify,
    albums: Mutex<Vec<Album>>,
    probe: Mutex<Option<watch::Receiver<TransferStatus>>>,
}

impl FakeHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Calls::default()),
            permission: Mutex::new(PermissionStatus::Granted),
            permission_error: Mutex::new(None),
            download_error: Mutex::new(None),
            share_error: Mutex::new(None),
            hold_downloads: Mutex::new(false),
            gate: Notify::new(),
            albums: Mutex::new(Vec::new()),
            probe: Mutex::new(None),
        })
    }

    pub fn release(&self) {
        self.gate.notify_one();
    }

    fn observe(&self) {
        if let Some(probe) = self.probe.lock().as_ref() {
            let status = *probe.borrow();
            self.calls.lock().observed.push(status);
        }
    }
}

pub fn request() -> ViewRequest {
    ViewRequest::new(
        "https://x/img.jpg",
        "https://cdn.example.com/photos/abc.jpg",
        1200.0,
        800.0,
    )
    .unwrap()
}

pub fn controller(platform: Platform, host: &Arc<FakeHost>) -> TransferController {
    let services = HostServices {
        transfer: host.clone(),
        permissions: host.clone(),
        media_library: host.clone(),
        share_sheet: host.clone(),
        notifier: host.clone(),
    };
    let capabilities = Capabilities::for_platform(platform, services);
    let settings = TransferSettings::new("/docs", "/cache");

    let controller = TransferController::new(request(), platform, capabilities, settings);
    *host.probe.lock() = Some(controller.subscribe());
    controller
}

#[async_trait]
impl FileTransfer for FakeHost {
    async fn download(&self, url: &str, dest: &Path) -> HostResult<PathBuf> {
        self.observe();
        self.calls
            .lock()
            .downloads
            .push((url.to_string(), dest.to_path_buf()));

        let hold = *self.hold_downloads.lock();
        if hold {
            self.gate.notified().await;
        }

        let error = self.download_error.lock().clone();
        match error {
            Some(message) => Err(HostError::new(message)),
            None => Ok(dest.to_path_buf()),
        }
    }

    async fn delete(&self, path: &Path) -> HostResult<()> {
        self.calls.lock().deletes.push(path.to_path_buf());
        Ok(())
    }
}

#[async_trait]
impl PermissionService for FakeHost {
    async fn request_media_access(&self) -> HostResult<PermissionStatus> {
        self.observe();
        self.calls.lock().permission_requests += 1;

        let error = self.permission_error.lock().clone();
        match error {
            Some(message) => Err(HostError::new(message)),
            None => Ok(*self.permission.lock()),
        }
    }
}

#[async_trait]
impl MediaLibrary for FakeHost {
    async fn create_asset(&self, path: &Path) -> HostResult<MediaAsset> {
        self.observe();
        let mut calls = self.calls.lock();
        calls.assets.push(path.to_path_buf());

        Ok(MediaAsset {
            id: format!("asset-{}", calls.assets.len()),
            uri: format!("media://{}", path.display()),
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            sha256: "00".repeat(32),
            created_at: Utc::now(),
        })
    }

    async fn album(&self, name: &str) -> HostResult<Option<Album>> {
        Ok(self.albums.lock().iter().find(|a| a.name == name).cloned())
    }

    async fn create_album(&self, name: &str, asset: &MediaAsset) -> HostResult<Album> {
        let album = Album {
            id: format!("album-{}", name),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        self.albums.lock().push(album.clone());

        let mut calls = self.calls.lock();
        calls.albums_created.push(name.to_string());
        calls.album_adds.push((album.id.clone(), asset.id.clone()));
        Ok(album)
    }

    async fn add_to_album(&self, album: &Album, asset: &MediaAsset) -> HostResult<()> {
        self.calls
            .lock()
            .album_adds
            .push((album.id.clone(), asset.id.clone()));
        Ok(())
    }
}

#[async_trait]
impl ShareSheet for FakeHost {
    async fn share(&self, path: &Path) -> HostResult<()> {
        self.observe();
        self.calls.lock().shares.push(path.to_path_buf());

        let error = self.share_error.lock().clone();
        match error {
            Some(message) => Err(HostError::new(message)),
            None => Ok(()),
        }
    }
}

impl Notifier for FakeHost {
    fn toast(&self, message: &str) {
        self.calls.lock().toasts.push(message.to_string());
    }

    fn alert(&self, title: &str, message: &str) {
        self.calls
            .lock()
            .alerts
            .push((title.to_string(), message.to_string()));
    }
}
