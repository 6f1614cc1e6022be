//! Session state store
//!
//! The only place a `Session` changes. Every successful mutation stamps
//! `lastModified` and then notifies subscribers synchronously; failed
//! operations leave the session untouched and notify nobody.

use chrono::Utc;

use crate::catalog::Catalog;
use crate::codec::json;
use crate::error::{DiscoveryError, DiscoveryResult};
use crate::file_storage::{SessionStorage, SESSION_KEY};
use crate::models::{AnswerPatch, AnswerStatus, DiscoveryMethod, MetadataPatch, Session};

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn Fn(&Session)>;

pub struct StateStore {
    catalog: Catalog,
    session: Session,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl StateStore {
    /// A store holding a fresh session for `catalog`
    pub fn new(catalog: Catalog) -> Self {
        let session = Session::new(&catalog);
        Self::with_session(catalog, session)
    }

    /// A store holding `session`, normalized against `catalog`
    pub fn with_session(catalog: Catalog, session: Session) -> Self {
        let session = session.normalize(&catalog);
        Self {
            catalog,
            session,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn check_question(&self, question_id: &str) -> DiscoveryResult<()> {
        if self.catalog.contains(question_id) {
            Ok(())
        } else {
            Err(DiscoveryError::UnknownQuestion(question_id.to_string()))
        }
    }

    fn notify(&self) {
        for (_, listener) in &self.listeners {
            listener(&self.session);
        }
    }

    /// Merge `patch` into the record for `question_id`
    pub fn set_answer(&mut self, question_id: &str, patch: AnswerPatch) -> DiscoveryResult<()> {
        self.check_question(question_id)?;
        let now = Utc::now();
        let record = self
            .session
            .answer_mut(question_id)
            .ok_or_else(|| DiscoveryError::UnknownQuestion(question_id.to_string()))?;
        patch.apply_to(record, now);
        self.session.touch(now);
        log::debug!("Updated answer for {}", question_id);
        self.notify();
        Ok(())
    }

    pub fn set_status(&mut self, question_id: &str, status: AnswerStatus) -> DiscoveryResult<()> {
        self.set_answer(question_id, AnswerPatch::default().with_status(status))
    }

    /// Add `method` to the record if absent, remove it if present
    pub fn toggle_method(
        &mut self,
        question_id: &str,
        method: DiscoveryMethod,
    ) -> DiscoveryResult<()> {
        self.check_question(question_id)?;
        let mut methods = self
            .session
            .answer(question_id)
            .map(|r| r.discovery_methods.clone())
            .unwrap_or_default();
        if !methods.remove(&method) {
            methods.insert(method);
        }
        self.set_answer(question_id, AnswerPatch::default().with_methods(methods))
    }

    pub fn set_metadata(&mut self, patch: MetadataPatch) {
        // lastModified is owned by the store
        let patch = MetadataPatch {
            last_modified: None,
            ..patch
        };
        patch.apply_to(self.session.metadata_mut());
        self.session.touch(Utc::now());
        self.notify();
    }

    /// Discard everything and start a fresh session
    pub fn reset(&mut self) {
        self.session = Session::new(&self.catalog);
        log::info!("Session reset");
        self.notify();
    }

    /// Commit an imported or restored session in one assignment
    pub fn replace_session(&mut self, session: Session) {
        self.session = session.normalize(&self.catalog);
        self.session.touch(Utc::now());
        log::info!(
            "Session replaced ({} of {} answered)",
            self.session.answered_count(),
            self.session.len()
        );
        self.notify();
    }

    /// Put back a session taken before a change that could not be persisted
    pub(crate) fn roll_back(&mut self, previous: Session) {
        if self.session != previous {
            self.session = previous;
            log::warn!("Session rolled back");
            self.notify();
        }
    }

    pub fn subscribe(&mut self, listener: impl Fn(&Session) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns whether the subscription existed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Write the session to `storage` as a current-version export document
    pub fn persist(&self, storage: &mut dyn SessionStorage) -> DiscoveryResult<()> {
        let text = self.stored_text()?;
        storage.save(SESSION_KEY, &text)
    }

    pub(crate) fn stored_text(&self) -> DiscoveryResult<String> {
        json::export_json(&self.catalog, &self.session)
    }

    /// Load the stored session, or start fresh when nothing is stored
    pub fn restore(catalog: Catalog, storage: &dyn SessionStorage) -> DiscoveryResult<Self> {
        match storage.load(SESSION_KEY)? {
            Some(text) => {
                let fresh = Session::new(&catalog);
                let session = json::deserialize(&catalog, &fresh, &text)?;
                log::info!("Restored session ({} answered)", session.answered_count());
                Ok(Self::with_session(catalog, session))
            }
            None => {
                log::info!("No stored session, starting fresh");
                Ok(Self::new(catalog))
            }
        }
    }
}

impl std::fmt::Debug for StateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStore")
            .field("session", &self.session)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_storage::MemoryStorage;
    use std::cell::Cell;
    use std::rc::Rc;

    fn store() -> StateStore {
        StateStore::new(Catalog::standard())
    }

    #[test]
    fn test_set_answer_merges_and_stamps() {
        let mut store = store();
        let before = store.session().metadata().last_modified;

        store
            .set_answer("q3", AnswerPatch::findings("Spreadsheets and email"))
            .unwrap();

        let record = store.session().answer("q3").unwrap();
        assert_eq!(record.findings, "Spreadsheets and email");
        assert!(record.last_updated.is_some());
        // Findings alone never change status
        assert_eq!(record.status, AnswerStatus::Open);
        assert!(store.session().metadata().last_modified >= before);
    }

    #[test]
    fn test_unknown_question_leaves_session_unchanged() {
        let mut store = store();
        let before = store.session().clone();

        let result = store.set_answer("q99", AnswerPatch::findings("x"));
        assert!(matches!(result, Err(DiscoveryError::UnknownQuestion(ref id)) if id == "q99"));
        assert!(store.toggle_method("q99", DiscoveryMethod::Survey).is_err());
        assert!(store.set_status("nope", AnswerStatus::Answered).is_err());
        assert_eq!(store.session(), &before);
    }

    #[test]
    fn test_set_status() {
        let mut store = store();
        store.set_status("q1", AnswerStatus::Answered).unwrap();
        assert!(store.session().answer("q1").unwrap().is_answered());

        store.set_status("q1", AnswerStatus::Open).unwrap();
        assert!(!store.session().answer("q1").unwrap().is_answered());
    }

    #[test]
    fn test_toggle_method() {
        let mut store = store();
        store.toggle_method("q2", DiscoveryMethod::Workshop).unwrap();
        assert!(store
            .session()
            .answer("q2")
            .unwrap()
            .discovery_methods
            .contains(&DiscoveryMethod::Workshop));

        store.toggle_method("q2", DiscoveryMethod::Workshop).unwrap();
        assert!(store.session().answer("q2").unwrap().discovery_methods.is_empty());
    }

    #[test]
    fn test_set_metadata_preserves_missing_fields() {
        let mut store = store();
        store.set_metadata(MetadataPatch {
            client_name: Some("Acme".to_string()),
            coach_name: Some("Sam".to_string()),
            ..Default::default()
        });
        store.set_metadata(MetadataPatch {
            client_name: Some("Acme Corp".to_string()),
            ..Default::default()
        });

        assert_eq!(store.session().metadata().client_name, "Acme Corp");
        assert_eq!(store.session().metadata().coach_name, "Sam");
    }

    #[test]
    fn test_reset() {
        let mut store = store();
        store.set_status("q1", AnswerStatus::Answered).unwrap();
        store.reset();
        assert_eq!(store.session().answered_count(), 0);
        assert!(store.session().is_well_formed(store.catalog()));
    }

    #[test]
    fn test_replace_session_normalizes() {
        let mut store = store();
        let mut other = Session::new(&Catalog::standard());
        other.answer_mut("q4").unwrap().status = AnswerStatus::Answered;
        let other = other.normalize(&Catalog::empty());
        assert!(other.is_empty());

        store.replace_session(other);
        assert!(store.session().is_well_formed(store.catalog()));
        assert_eq!(store.session().answered_count(), 0);
    }

    #[test]
    fn test_replace_session_never_moves_last_modified_back() {
        let mut store = store();
        let older = store.session().clone();
        store.set_status("q1", AnswerStatus::Answered).unwrap();
        let stamped = store.session().metadata().last_modified;

        store.replace_session(older);

        assert_eq!(store.session().answered_count(), 0);
        assert!(store.session().metadata().last_modified >= stamped);
    }

    #[test]
    fn test_roll_back_restores_previous_session() {
        let mut store = store();
        let previous = store.session().clone();
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        store.subscribe(move |_| counter.set(counter.get() + 1));

        store.roll_back(previous.clone());
        assert_eq!(calls.get(), 0);

        store.set_status("q2", AnswerStatus::Answered).unwrap();
        store.roll_back(previous.clone());

        assert_eq!(store.session(), &previous);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_subscribers_notified_on_success_only() {
        let mut store = store();
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let id = store.subscribe(move |_| counter.set(counter.get() + 1));

        store.set_status("q1", AnswerStatus::Answered).unwrap();
        let _ = store.set_status("q404", AnswerStatus::Answered);
        store.reset();
        assert_eq!(calls.get(), 2);

        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.reset();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_persist_and_restore() {
        let mut storage = MemoryStorage::new();
        let mut store = store();
        store
            .set_answer(
                "q7",
                AnswerPatch::findings("Cut month-end close to 3 days")
                    .with_methods([DiscoveryMethod::DataAnalysis])
                    .with_status(AnswerStatus::Answered),
            )
            .unwrap();
        store.set_metadata(MetadataPatch {
            client_name: Some("Acme".to_string()),
            ..Default::default()
        });

        store.persist(&mut storage).unwrap();
        let restored = StateStore::restore(Catalog::standard(), &storage).unwrap();

        assert_eq!(restored.session(), store.session());
    }

    #[test]
    fn test_restore_without_stored_session() {
        let storage = MemoryStorage::new();
        let restored = StateStore::restore(Catalog::standard(), &storage).unwrap();
        assert_eq!(restored.session().answered_count(), 0);
    }

    #[test]
    fn test_restore_corrupt_session_fails() {
        let mut storage = MemoryStorage::new();
        storage.save(SESSION_KEY, "{{{").unwrap();

        let result = StateStore::restore(Catalog::standard(), &storage);
        assert!(matches!(result, Err(DiscoveryError::MalformedDocument(_))));
    }
}
