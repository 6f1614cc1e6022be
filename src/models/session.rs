//! Discovery session aggregate
//!
//! A `Session` holds engagement metadata plus exactly one `AnswerRecord` per
//! catalog question. Mutation goes through the `StateStore`; the crate-private
//! mutators here exist for the store and the document codec.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::{AnswerStatus, DiscoveryMethod};
use crate::catalog::{Catalog, QuestionDefinition};

/// Engagement metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default)]
    pub client_name: String,
    #[serde(rename = "coach", alias = "coachName", default)]
    pub coach_name: String,
    #[serde(default)]
    pub engagement_date: Option<NaiveDate>,
    pub last_modified: DateTime<Utc>,
}

impl Metadata {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            client_name: String::new(),
            coach_name: String::new(),
            engagement_date: None,
            last_modified: now,
        }
    }

    /// Client name for display, with a placeholder when unset
    pub fn client_display_name(&self) -> &str {
        let name = self.client_name.trim();
        if name.is_empty() {
            "the client"
        } else {
            name
        }
    }
}

/// Partial metadata used for edits and import merges.
/// `None` fields leave the existing value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataPatch {
    pub client_name: Option<String>,
    #[serde(rename = "coach")]
    pub coach_name: Option<String>,
    pub engagement_date: Option<NaiveDate>,
    pub last_modified: Option<DateTime<Utc>>,
}

impl MetadataPatch {
    pub fn is_empty(&self) -> bool {
        self.client_name.is_none()
            && self.coach_name.is_none()
            && self.engagement_date.is_none()
            && self.last_modified.is_none()
    }

    /// Merge this patch over `metadata`; patch values win
    pub fn apply_to(&self, metadata: &mut Metadata) {
        if let Some(ref client_name) = self.client_name {
            metadata.client_name = client_name.clone();
        }
        if let Some(ref coach_name) = self.coach_name {
            metadata.coach_name = coach_name.clone();
        }
        if let Some(date) = self.engagement_date {
            metadata.engagement_date = Some(date);
        }
        if let Some(last_modified) = self.last_modified {
            metadata.last_modified = last_modified;
        }
    }
}

/// One question's recorded answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    pub question_id: String,
    #[serde(default)]
    pub findings: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub discovery_methods: BTreeSet<DiscoveryMethod>,
    #[serde(default)]
    pub status: AnswerStatus,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl AnswerRecord {
    /// A fresh, unanswered record
    pub fn open(question_id: &str) -> Self {
        Self {
            question_id: question_id.to_string(),
            findings: String::new(),
            notes: String::new(),
            discovery_methods: BTreeSet::new(),
            status: AnswerStatus::Open,
            last_updated: None,
        }
    }

    pub fn is_answered(&self) -> bool {
        self.status == AnswerStatus::Answered
    }

    pub fn has_findings(&self) -> bool {
        !self.findings.trim().is_empty()
    }
}

/// Field-level edit of an `AnswerRecord`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerPatch {
    pub findings: Option<String>,
    pub notes: Option<String>,
    pub discovery_methods: Option<BTreeSet<DiscoveryMethod>>,
    pub status: Option<AnswerStatus>,
}

impl AnswerPatch {
    pub fn findings(text: impl Into<String>) -> Self {
        Self {
            findings: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_methods(mut self, methods: impl IntoIterator<Item = DiscoveryMethod>) -> Self {
        self.discovery_methods = Some(methods.into_iter().collect());
        self
    }

    pub fn with_status(mut self, status: AnswerStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub(crate) fn apply_to(self, record: &mut AnswerRecord, now: DateTime<Utc>) {
        if let Some(findings) = self.findings {
            record.findings = findings;
        }
        if let Some(notes) = self.notes {
            record.notes = notes;
        }
        if let Some(methods) = self.discovery_methods {
            record.discovery_methods = methods;
        }
        if let Some(status) = self.status {
            record.status = status;
        }
        record.last_updated = Some(now);
    }
}

/// Full discovery state of one engagement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    metadata: Metadata,
    answers: BTreeMap<String, AnswerRecord>,
}

impl Session {
    /// A fresh session with every catalog question open
    pub fn new(catalog: &Catalog) -> Self {
        Self::with_timestamp(catalog, Utc::now())
    }

    pub(crate) fn with_timestamp(catalog: &Catalog, now: DateTime<Utc>) -> Self {
        let answers = catalog
            .questions()
            .iter()
            .map(|q| (q.id.clone(), AnswerRecord::open(&q.id)))
            .collect();

        Self {
            metadata: Metadata::new(now),
            answers,
        }
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn answer(&self, question_id: &str) -> Option<&AnswerRecord> {
        self.answers.get(question_id)
    }

    /// All records, keyed order
    pub fn answers(&self) -> impl Iterator<Item = &AnswerRecord> {
        self.answers.values()
    }

    /// Records paired with their definitions, in catalog order
    pub fn answers_in_order<'a>(
        &'a self,
        catalog: &'a Catalog,
    ) -> impl Iterator<Item = (&'a QuestionDefinition, &'a AnswerRecord)> + 'a {
        catalog
            .questions()
            .iter()
            .filter_map(move |q| self.answers.get(&q.id).map(|record| (q, record)))
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn answered_count(&self) -> usize {
        self.answers.values().filter(|r| r.is_answered()).count()
    }

    /// Union of discovery methods across all records
    pub fn methods_used(&self) -> BTreeSet<DiscoveryMethod> {
        self.answers
            .values()
            .flat_map(|r| r.discovery_methods.iter().copied())
            .collect()
    }

    /// Whether the session holds exactly one record per catalog question
    pub fn is_well_formed(&self, catalog: &Catalog) -> bool {
        self.answers.len() == catalog.len()
            && catalog.questions().iter().all(|q| {
                self.answers
                    .get(&q.id)
                    .map_or(false, |r| r.question_id == q.id)
            })
    }

    pub(crate) fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }

    pub(crate) fn answer_mut(&mut self, question_id: &str) -> Option<&mut AnswerRecord> {
        self.answers.get_mut(question_id)
    }

    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        self.metadata.last_modified = now;
    }

    /// Drop orphan records and add open records for missing catalog ids
    pub(crate) fn normalize(mut self, catalog: &Catalog) -> Self {
        let before = self.answers.len();
        self.answers.retain(|id, _| catalog.contains(id));
        let dropped = before - self.answers.len();
        if dropped > 0 {
            log::warn!("Dropped {} answer records not present in the catalog", dropped);
        }

        for question in catalog.questions() {
            let record = self
                .answers
                .entry(question.id.clone())
                .or_insert_with(|| AnswerRecord::open(&question.id));
            record.question_id = question.id.clone();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn small_catalog() -> Catalog {
        Catalog::new(
            vec![
                QuestionDefinition {
                    id: "a".to_string(),
                    phase: 1,
                    prompt: "First".to_string(),
                },
                QuestionDefinition {
                    id: "b".to_string(),
                    phase: 2,
                    prompt: "Second".to_string(),
                },
            ],
            BTreeMap::new(),
        )
    }

    #[test]
    fn test_new_session_is_all_open() {
        let catalog = Catalog::standard();
        let session = Session::new(&catalog);

        assert_eq!(session.len(), 32);
        assert_eq!(session.answered_count(), 0);
        assert!(session.is_well_formed(&catalog));
        assert!(session.answers().all(|r| r.status == AnswerStatus::Open));
    }

    #[test]
    fn test_answers_in_catalog_order() {
        let catalog = Catalog::standard();
        let session = Session::new(&catalog);

        let ids: Vec<&str> = session
            .answers_in_order(&catalog)
            .map(|(q, _)| q.id.as_str())
            .take(3)
            .collect();
        // BTreeMap key order would put q10 before q2
        assert_eq!(ids, vec!["q1", "q2", "q3"]);
    }

    #[test]
    fn test_patch_merges_only_present_fields() {
        let mut record = AnswerRecord::open("q1");
        record.notes = "keep me".to_string();
        let now = Utc::now();

        AnswerPatch::findings("New finding").apply_to(&mut record, now);

        assert_eq!(record.findings, "New finding");
        assert_eq!(record.notes, "keep me");
        assert_eq!(record.status, AnswerStatus::Open);
        assert_eq!(record.last_updated, Some(now));
    }

    #[test]
    fn test_metadata_patch_merge() {
        let mut metadata = Metadata::new(Utc::now());
        metadata.coach_name = "Dana".to_string();

        let patch = MetadataPatch {
            client_name: Some("Acme".to_string()),
            ..Default::default()
        };
        patch.apply_to(&mut metadata);

        assert_eq!(metadata.client_name, "Acme");
        assert_eq!(metadata.coach_name, "Dana");
    }

    #[test]
    fn test_metadata_serializes_coach_and_accepts_alias() {
        let metadata = Metadata {
            client_name: "Acme".to_string(),
            coach_name: "Sam".to_string(),
            engagement_date: None,
            last_modified: Utc::now(),
        };
        let value = serde_json::to_value(&metadata).unwrap();
        assert_eq!(value["coach"], "Sam");
        assert!(value.get("coachName").is_none());

        let parsed: Metadata = serde_json::from_str(
            r#"{"clientName":"Acme","coachName":"Lee","lastModified":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(parsed.coach_name, "Lee");
    }

    #[test]
    fn test_normalize_repairs_membership() {
        let catalog = small_catalog();
        let mut session = Session::new(&Catalog::standard());
        session
            .answers
            .insert("a".to_string(), AnswerRecord::open("a"));

        let session = session.normalize(&catalog);

        assert!(session.is_well_formed(&catalog));
        assert!(session.answer("q1").is_none());
        assert!(session.answer("b").is_some());
    }

    #[test]
    fn test_methods_used_is_union() {
        let catalog = small_catalog();
        let mut session = Session::new(&catalog);
        session
            .answer_mut("a")
            .unwrap()
            .discovery_methods
            .insert(DiscoveryMethod::Survey);
        session
            .answer_mut("b")
            .unwrap()
            .discovery_methods
            .extend([DiscoveryMethod::Survey, DiscoveryMethod::Workshop]);

        let used: Vec<DiscoveryMethod> = session.methods_used().into_iter().collect();
        assert_eq!(used, vec![DiscoveryMethod::Survey, DiscoveryMethod::Workshop]);
    }
}
