//! Viewer composition root
//!
//! Opens the catalog, builds the host capabilities once and hands out a
//! transfer controller per opened image.

use lightbox_storage::Database;
use lightbox_transfer::{
    Capabilities, HostServices, Notifier, ShareSheet, TransferController, ViewRequest,
};
use std::sync::Arc;

use crate::config::Config;
use crate::http::HttpTransfer;
use crate::media::LocalMediaLibrary;
use crate::permissions::{ConsentPrompt, PermissionStore};
use crate::share::CommandShareSheet;
use crate::Result;

pub struct Viewer {
    config: Config,
    db: Database,
    media_library: Arc<LocalMediaLibrary>,
    permissions: Arc<PermissionStore>,
    services: HostServices,
}

impl Viewer {
    pub fn new(
        config: Config,
        notifier: Arc<dyn Notifier>,
        prompt: Arc<dyn ConsentPrompt>,
    ) -> Result<Self> {
        config.validate()?;

        // Ensure data directory exists
        if let Some(parent) = config.database_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::open(&config.database_path)?;

        Ok(Self::with_database(config, db, notifier, prompt))
    }

    pub fn with_database(
        config: Config,
        db: Database,
        notifier: Arc<dyn Notifier>,
        prompt: Arc<dyn ConsentPrompt>,
    ) -> Self {
        let media_library = Arc::new(LocalMediaLibrary::new(
            db.clone(),
            config.media_dir.clone(),
        ));
        let permissions = Arc::new(PermissionStore::new(db.clone(), prompt));

        let share_sheet: Arc<dyn ShareSheet> = match config
            .share_command
            .as_deref()
            .and_then(CommandShareSheet::from_command)
        {
            Some(sheet) => Arc::new(sheet),
            None => Arc::new(CommandShareSheet::system_default()),
        };

        let services = HostServices {
            transfer: Arc::new(HttpTransfer::new()),
            permissions: permissions.clone(),
            media_library: media_library.clone(),
            share_sheet,
            notifier,
        };

        tracing::info!(
            platform = %config.platform,
            documents = %config.documents_dir.display(),
            "Viewer initialized"
        );

        Self {
            config,
            db,
            media_library,
            permissions,
            services,
        }
    }

    /// Controller for one opened image
    pub fn open(&self, request: ViewRequest) -> TransferController {
        let platform = self.config.platform;
        let capabilities = Capabilities::for_platform(platform, self.services.clone());

        tracing::info!(
            url = %request.source_url(),
            file_name = %request.file_name(),
            "Opened image"
        );

        TransferController::new(
            request,
            platform,
            capabilities,
            self.config.transfer_settings(),
        )
    }

    /// Open from the JSON parameters handed over by the router
    pub fn open_json(&self, params: &str) -> Result<TransferController> {
        let request: ViewRequest = serde_json::from_str(params)?;
        Ok(self.open(request))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn media_library(&self) -> &LocalMediaLibrary {
        &self.media_library
    }

    pub fn permissions(&self) -> &PermissionStore {
        &self.permissions
    }
}
