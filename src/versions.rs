// Append-only history of named session snapshots

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DiscoveryError, DiscoveryResult};
use crate::file_storage::{SessionStorage, VERSIONS_KEY};
use crate::models::Session;

/// Immutable snapshot of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionSnapshot {
    pub version_number: u32,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub label: Option<String>,
    pub session_snapshot: Session,
}

/// Listing entry: snapshot metadata without the session body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionSummary {
    pub version_number: u32,
    pub timestamp: DateTime<Utc>,
    pub label: Option<String>,
    pub client_name: String,
    pub answered_count: usize,
}

impl From<&VersionSnapshot> for VersionSummary {
    fn from(snapshot: &VersionSnapshot) -> Self {
        Self {
            version_number: snapshot.version_number,
            timestamp: snapshot.timestamp,
            label: snapshot.label.clone(),
            client_name: snapshot.session_snapshot.metadata().client_name.clone(),
            answered_count: snapshot.session_snapshot.answered_count(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct VersionHistory {
    versions: Vec<VersionSnapshot>,
}

impl VersionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    fn next_number(&self) -> u32 {
        self.versions
            .iter()
            .map(|v| v.version_number)
            .max()
            .map_or(1, |max| max + 1)
    }

    /// Snapshot `session` under the next version number
    pub fn save_version(&mut self, session: &Session, label: Option<&str>) -> VersionSnapshot {
        let label = label
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from);

        let snapshot = VersionSnapshot {
            version_number: self.next_number(),
            timestamp: Utc::now(),
            label,
            session_snapshot: session.clone(),
        };
        log::info!("Saved version {}", snapshot.version_number);

        self.versions.push(snapshot.clone());
        snapshot
    }

    /// A copy of the session stored as `version_number`
    pub fn load_version(&self, version_number: u32) -> DiscoveryResult<Session> {
        self.versions
            .iter()
            .find(|v| v.version_number == version_number)
            .map(|v| v.session_snapshot.clone())
            .ok_or(DiscoveryError::VersionNotFound(version_number))
    }

    /// Summaries in ascending version order
    pub fn list_versions(&self) -> Vec<VersionSummary> {
        let mut summaries: Vec<VersionSummary> =
            self.versions.iter().map(VersionSummary::from).collect();
        summaries.sort_by_key(|s| s.version_number);
        summaries
    }

    /// Drop versions saved after the history held `len` entries
    pub(crate) fn truncate(&mut self, len: usize) {
        if self.versions.len() > len {
            log::warn!("Discarding {} unsaved versions", self.versions.len() - len);
            self.versions.truncate(len);
        }
    }

    pub fn persist(&self, storage: &mut dyn SessionStorage) -> DiscoveryResult<()> {
        let text = self.stored_text()?;
        storage.save(VERSIONS_KEY, &text)
    }

    pub(crate) fn stored_text(&self) -> DiscoveryResult<String> {
        serde_json::to_string(&self.versions).map_err(|e| {
            DiscoveryError::Serialization(format!("Failed to serialize version history: {}", e))
        })
    }

    pub fn restore(storage: &dyn SessionStorage) -> DiscoveryResult<Self> {
        let Some(text) = storage.load(VERSIONS_KEY)? else {
            return Ok(Self::new());
        };

        let mut versions: Vec<VersionSnapshot> = serde_json::from_str(&text)
            .map_err(|e| DiscoveryError::malformed(format!("Invalid version history: {}", e)))?;

        versions.sort_by_key(|v| v.version_number);
        let before = versions.len();
        versions.dedup_by_key(|v| v.version_number);
        if versions.len() != before {
            log::warn!(
                "Dropped {} duplicate version entries",
                before - versions.len()
            );
        }

        log::debug!("Restored {} versions", versions.len());
        Ok(Self { versions })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::file_storage::MemoryStorage;
    use crate::models::AnswerStatus;

    fn session() -> Session {
        Session::new(&Catalog::standard())
    }

    #[test]
    fn test_numbering_starts_at_one() {
        let mut history = VersionHistory::new();
        let first = history.save_version(&session(), Some("Kickoff"));
        let second = history.save_version(&session(), None);

        assert_eq!(first.version_number, 1);
        assert_eq!(second.version_number, 2);
        assert_eq!(first.label.as_deref(), Some("Kickoff"));
        assert_eq!(second.label, None);
    }

    #[test]
    fn test_blank_label_is_none() {
        let mut history = VersionHistory::new();
        assert_eq!(history.save_version(&session(), Some("   ")).label, None);
    }

    #[test]
    fn test_snapshot_is_isolated() {
        let mut history = VersionHistory::new();
        let mut live = session();
        history.save_version(&live, None);

        live.answer_mut("q1").unwrap().status = AnswerStatus::Answered;

        let restored = history.load_version(1).unwrap();
        assert_eq!(restored.answered_count(), 0);

        let mut copy = history.load_version(1).unwrap();
        copy.answer_mut("q2").unwrap().findings = "edited".to_string();
        assert_eq!(history.load_version(1).unwrap().answer("q2").unwrap().findings, "");
    }

    #[test]
    fn test_truncate_reuses_numbers() {
        let mut history = VersionHistory::new();
        history.save_version(&session(), None);
        history.save_version(&session(), None);

        history.truncate(1);
        history.truncate(5);

        assert_eq!(history.len(), 1);
        assert_eq!(history.save_version(&session(), None).version_number, 2);
    }

    #[test]
    fn test_missing_version() {
        let history = VersionHistory::new();
        assert!(matches!(
            history.load_version(3),
            Err(DiscoveryError::VersionNotFound(3))
        ));
    }

    #[test]
    fn test_list_is_ascending_with_summary_fields() {
        let mut history = VersionHistory::new();
        let mut live = session();
        live.metadata_mut().client_name = "Acme".to_string();
        history.save_version(&live, Some("empty"));
        live.answer_mut("q1").unwrap().status = AnswerStatus::Answered;
        history.save_version(&live, Some("one answered"));

        let listed = history.list_versions();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].version_number, 1);
        assert_eq!(listed[1].version_number, 2);
        assert_eq!(listed[1].answered_count, 1);
        assert_eq!(listed[1].client_name, "Acme");
    }

    #[test]
    fn test_persist_and_restore() {
        let mut storage = MemoryStorage::new();
        let mut history = VersionHistory::new();
        history.save_version(&session(), Some("v1"));
        history.save_version(&session(), Some("v2"));
        history.persist(&mut storage).unwrap();

        let mut restored = VersionHistory::restore(&storage).unwrap();
        assert_eq!(restored.list_versions(), history.list_versions());
        assert_eq!(restored.save_version(&session(), None).version_number, 3);
    }

    #[test]
    fn test_restore_empty_storage() {
        let storage = MemoryStorage::new();
        assert!(VersionHistory::restore(&storage).unwrap().is_empty());
    }
}
