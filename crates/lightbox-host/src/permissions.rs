//! Media library permission
//!
//! | State | Request result                     | Persistence |
//! | Ask   | prompt the user, remember answer   | settings    |
//! | Allow | granted                            | settings    |
//! | Deny  | denied, no prompt                  | settings    |

use async_trait::async_trait;
use lightbox_storage::Database;
use lightbox_transfer::{HostError, HostResult, PermissionService, PermissionStatus};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const SETTING_KEY: &str = "permissions.media_library";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    /// Prompt user when requested
    #[default]
    Ask,
    /// Always allow
    Allow,
    /// Always deny
    Deny,
}

/// Asks the user whether the app may write to the media library
#[async_trait]
pub trait ConsentPrompt: Send + Sync {
    async fn ask(&self) -> bool;
}

/// Prompt with a fixed answer, for hosts without a consent dialog
pub struct FixedConsent(pub bool);

#[async_trait]
impl ConsentPrompt for FixedConsent {
    async fn ask(&self) -> bool {
        self.0
    }
}

pub struct PermissionStore {
    db: Database,
    state: RwLock<PermissionState>,
    prompt: Arc<dyn ConsentPrompt>,
}

impl PermissionStore {
    /// Load the remembered decision, if any
    pub fn new(db: Database, prompt: Arc<dyn ConsentPrompt>) -> Self {
        let state = match db.get_json::<PermissionState>(SETTING_KEY) {
            Ok(state) => state.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable permission setting");
                PermissionState::default()
            }
        };

        Self {
            db,
            state: RwLock::new(state),
            prompt,
        }
    }

    pub fn state(&self) -> PermissionState {
        *self.state.read()
    }

    pub fn set(&self, state: PermissionState) -> lightbox_storage::Result<()> {
        self.db.set_json(SETTING_KEY, &state)?;
        *self.state.write() = state;
        tracing::info!(?state, "Updated media library permission");
        Ok(())
    }

    /// Forget the decision so the next request prompts again
    pub fn reset(&self) -> lightbox_storage::Result<()> {
        self.db.remove_setting(SETTING_KEY)?;
        *self.state.write() = PermissionState::Ask;
        Ok(())
    }
}

#[async_trait]
impl PermissionService for PermissionStore {
    async fn request_media_access(&self) -> HostResult<PermissionStatus> {
        match self.state() {
            PermissionState::Allow => Ok(PermissionStatus::Granted),
            PermissionState::Deny => Ok(PermissionStatus::Denied),
            PermissionState::Ask => {
                let granted = self.prompt.ask().await;
                let state = if granted {
                    PermissionState::Allow
                } else {
                    PermissionState::Deny
                };
                self.set(state).map_err(HostError::new)?;

                Ok(if granted {
                    PermissionStatus::Granted
                } else {
                    PermissionStatus::Denied
                })
            }
        }
    }
}
