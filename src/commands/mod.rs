// Command handlers for user actions
//
// Each handler performs one user action against a `Workspace`, persists the
// result, and reports back with a transient `Notification`.

pub mod answers;
pub mod documents;
pub mod versions;

pub use answers::*;
pub use documents::*;
pub use versions::*;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::config::LeaConfig;
use crate::error::{DiscoveryError, DiscoveryResult};
use crate::file_storage::{SessionStorage, SESSION_KEY, VERSIONS_KEY};
use crate::models::MetadataPatch;
use crate::store::StateStore;
use crate::versions::VersionHistory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Failure,
}

/// Transient user-facing message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }

    /// Failure of `action`, naming the error kind
    pub fn failure(action: &str, err: &DiscoveryError) -> Self {
        log::warn!("{} failed: {}", action, err);
        Self {
            kind: NotificationKind::Failure,
            message: format!("{} failed ({}): {}", action, err.kind(), err),
        }
    }

    pub fn is_success(&self) -> bool {
        self.kind == NotificationKind::Success
    }
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Build a notification from the outcome of `action`
pub(crate) fn notify(action: &str, result: DiscoveryResult<String>) -> Notification {
    match result {
        Ok(message) => Notification::success(message),
        Err(err) => Notification::failure(action, &err),
    }
}

/// Live engagement: session, version history and their storage
pub struct Workspace {
    store: StateStore,
    history: VersionHistory,
    storage: Box<dyn SessionStorage>,
    config: LeaConfig,
}

impl Workspace {
    /// Restore the engagement held by `storage`, or start a fresh one
    pub fn open(
        catalog: Catalog,
        storage: Box<dyn SessionStorage>,
        config: LeaConfig,
    ) -> DiscoveryResult<Self> {
        let fresh = storage.load(SESSION_KEY)?.is_none();
        let store = StateStore::restore(catalog, storage.as_ref())?;
        let history = VersionHistory::restore(storage.as_ref())?;

        let mut workspace = Self {
            store,
            history,
            storage,
            config,
        };
        if fresh {
            workspace.apply_default_coach();
        }
        Ok(workspace)
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut StateStore {
        &mut self.store
    }

    pub fn history(&self) -> &VersionHistory {
        &self.history
    }

    pub fn config(&self) -> &LeaConfig {
        &self.config
    }

    fn apply_default_coach(&mut self) {
        let coach = self
            .config
            .default_coach
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty());

        if let Some(coach) = coach {
            if self.store.session().metadata().coach_name.is_empty() {
                self.store.set_metadata(MetadataPatch {
                    coach_name: Some(coach.to_string()),
                    ..Default::default()
                });
            }
        }
    }

    /// Write session and history back to storage in one write
    pub fn save(&mut self) -> DiscoveryResult<()> {
        let blobs = [
            (SESSION_KEY, self.store.stored_text()?),
            (VERSIONS_KEY, self.history.stored_text()?),
        ];
        self.storage.save_all(&blobs)
    }

    /// Run `action` and persist its result. When the action or the save
    /// fails, session and history are back where they started.
    pub(crate) fn commit<T>(
        &mut self,
        action: impl FnOnce(&mut Self) -> DiscoveryResult<T>,
    ) -> DiscoveryResult<T> {
        let previous = self.store.session().clone();
        let versions = self.history.len();

        let result = action(self).and_then(|value| self.save().map(|_| value));
        if result.is_err() {
            self.store.roll_back(previous);
            self.history.truncate(versions);
        }
        result
    }
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("store", &self.store)
            .field("versions", &self.history.len())
            .field("config", &self.config)
            .finish()
    }
}
