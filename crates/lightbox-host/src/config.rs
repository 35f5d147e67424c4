//! Viewer configuration

use lightbox_transfer::{Platform, TransferSettings, DEFAULT_ALBUM_NAME};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ViewerError;
use crate::Result;

const DEFAULT_TOAST_VISIBILITY_MS: u64 = 2_500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Presentation context the viewer runs in
    pub platform: Platform,
    /// Path to the media catalog database
    pub database_path: PathBuf,
    /// Permanent downloads
    pub documents_dir: PathBuf,
    /// Temporary copies handed to the share sheet
    pub cache_dir: PathBuf,
    /// Root of the local media library
    pub media_dir: PathBuf,
    /// Seconds a temporary copy outlives its share
    pub cleanup_delay_secs: u64,
    pub album_name: String,
    /// Program and arguments used as the share sheet; the file path is appended
    pub share_command: Option<Vec<String>>,
    pub toast_visibility_ms: u64,
}

impl Config {
    pub fn new(data_dir: PathBuf) -> Self {
        let cache_dir = dirs::cache_dir()
            .map(|d| d.join("Lightbox"))
            .unwrap_or_else(|| data_dir.join("Cache"));
        let media_dir = dirs::pictures_dir().unwrap_or_else(|| data_dir.join("Media"));

        Self {
            platform: default_platform(),
            database_path: data_dir.join("lightbox.db"),
            documents_dir: data_dir.join("Documents"),
            cache_dir,
            media_dir,
            cleanup_delay_secs: lightbox_transfer::DEFAULT_CLEANUP_DELAY.as_secs(),
            album_name: DEFAULT_ALBUM_NAME.to_string(),
            share_command: None,
            toast_visibility_ms: DEFAULT_TOAST_VISIBILITY_MS,
        }
    }

    /// Read a JSON config file. A missing file yields the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;

        tracing::info!(path = %path.display(), platform = %config.platform, "Loaded config");
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.album_name.trim().is_empty() {
            return Err(ViewerError::Config("album_name must not be empty".to_string()));
        }
        if matches!(&self.share_command, Some(command) if command.is_empty()) {
            return Err(ViewerError::Config(
                "share_command needs at least a program".to_string(),
            ));
        }
        Ok(())
    }

    pub fn transfer_settings(&self) -> TransferSettings {
        let mut settings = TransferSettings::new(&self.documents_dir, &self.cache_dir);
        settings.cleanup_delay = Duration::from_secs(self.cleanup_delay_secs);
        settings.album_name = self.album_name.clone();
        settings
    }

    pub fn toast_visibility(&self) -> Duration {
        Duration::from_millis(self.toast_visibility_ms)
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|d| d.join("Lightbox"))
            .unwrap_or_else(|| PathBuf::from(".lightbox"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::data_dir())
    }
}

fn default_platform() -> Platform {
    if cfg!(target_family = "wasm") {
        Platform::Web
    } else if cfg!(target_os = "ios") {
        Platform::Ios
    } else {
        Platform::Android
    }
}

// Platform directory lookup
mod dirs {
    use std::path::PathBuf;

    fn home() -> Option<PathBuf> {
        std::env::var("HOME").ok().map(PathBuf::from)
    }

    pub fn data_local_dir() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            std::env::var("LOCALAPPDATA").ok().map(PathBuf::from)
        }
        #[cfg(target_os = "macos")]
        {
            home().map(|h| h.join("Library/Application Support"))
        }
        #[cfg(target_os = "linux")]
        {
            std::env::var("XDG_DATA_HOME")
                .ok()
                .map(PathBuf::from)
                .or_else(|| home().map(|h| h.join(".local/share")))
        }
        #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
        {
            None
        }
    }

    pub fn cache_dir() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            std::env::var("LOCALAPPDATA")
                .ok()
                .map(|d| PathBuf::from(d).join("Temp"))
        }
        #[cfg(target_os = "macos")]
        {
            home().map(|h| h.join("Library/Caches"))
        }
        #[cfg(target_os = "linux")]
        {
            std::env::var("XDG_CACHE_HOME")
                .ok()
                .map(PathBuf::from)
                .or_else(|| home().map(|h| h.join(".cache")))
        }
        #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
        {
            None
        }
    }

    pub fn pictures_dir() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            std::env::var("USERPROFILE")
                .ok()
                .map(|h| PathBuf::from(h).join("Pictures"))
        }
        #[cfg(target_os = "macos")]
        {
            home().map(|h| h.join("Pictures"))
        }
        #[cfg(target_os = "linux")]
        {
            std::env::var("XDG_PICTURES_DIR")
                .ok()
                .map(PathBuf::from)
                .or_else(|| home().map(|h| h.join("Pictures")))
        }
        #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
        {
            None
        }
    }
}
