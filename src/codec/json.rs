// Versioned JSON export/import

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

use super::{reconcile, DocumentFormat, ImportOutcome};
use crate::analysis::{compute_coverage, recommended_techniques, CoverageReport};
use crate::catalog::Catalog;
use crate::error::{DiscoveryError, DiscoveryResult};
use crate::models::{AnswerRecord, AnswerStatus, DiscoveryMethod, Metadata, MetadataPatch, Session};

/// Schema version written by every export
pub const CURRENT_VERSION: &str = "2.0";

/// Legacy schema version (no analysis block, optional status/methods)
pub const LEGACY_VERSION: &str = "1.0";

/// Metadata field aliases seen in older documents: (alias, canonical)
pub const METADATA_ALIASES: &[(&str, &str)] = &[
    ("coachName", "coach"),
    ("client", "clientName"),
    ("date", "engagementDate"),
];

/// Schema versions the importer understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaVersion {
    V1_0,
    V2_0,
}

impl SchemaVersion {
    /// Read the `version` field; absent or unrecognized versions are read as 1.0
    pub fn detect(root: &Map<String, Value>) -> Self {
        match root.get("version") {
            None | Some(Value::Null) => SchemaVersion::V1_0,
            Some(Value::String(v)) if v == CURRENT_VERSION => SchemaVersion::V2_0,
            Some(Value::String(v)) if v == LEGACY_VERSION => SchemaVersion::V1_0,
            Some(other) => {
                log::warn!(
                    "Unknown export schema version {}, reading as {}",
                    other,
                    LEGACY_VERSION
                );
                SchemaVersion::V1_0
            }
        }
    }
}

// ============================================================================
// Export
// ============================================================================

/// Current (2.0) export document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub version: String,
    pub export_date: DateTime<Utc>,
    pub metadata: Metadata,
    pub questions: Vec<ExportQuestion>,
    pub analysis: ExportAnalysis,
}

/// One question, flattened with its catalog definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportQuestion {
    pub question_id: String,
    pub phase: u8,
    pub text: String,
    pub findings: String,
    pub notes: String,
    pub discovery_methods: Vec<DiscoveryMethod>,
    pub status: AnswerStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportAnalysis {
    pub coverage: ExportCoverage,
    pub phase_completion: BTreeMap<u8, f64>,
    pub recommended_techniques: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportCoverage {
    pub total_questions: usize,
    pub answered_questions: usize,
    pub coverage_percentage: f64,
}

impl ExportDocument {
    /// Build an export document stamped with the current time
    pub fn build(catalog: &Catalog, session: &Session, coverage: &CoverageReport) -> Self {
        Self::build_at(catalog, session, coverage, Utc::now())
    }

    pub fn build_at(
        catalog: &Catalog,
        session: &Session,
        coverage: &CoverageReport,
        export_date: DateTime<Utc>,
    ) -> Self {
        let questions = session
            .answers_in_order(catalog)
            .map(|(definition, record)| ExportQuestion {
                question_id: record.question_id.clone(),
                phase: definition.phase,
                text: definition.prompt.clone(),
                findings: record.findings.clone(),
                notes: record.notes.clone(),
                discovery_methods: record.discovery_methods.iter().copied().collect(),
                status: record.status,
                last_updated: record.last_updated,
            })
            .collect();

        let analysis = ExportAnalysis {
            coverage: ExportCoverage {
                total_questions: coverage.total_questions,
                answered_questions: coverage.answered_questions,
                coverage_percentage: coverage.coverage_percentage,
            },
            phase_completion: coverage.phase_completion.clone(),
            recommended_techniques: recommended_techniques(session)
                .into_iter()
                .map(|t| t.name.to_string())
                .collect(),
        };

        Self {
            version: CURRENT_VERSION.to_string(),
            export_date,
            metadata: session.metadata().clone(),
            questions,
            analysis,
        }
    }
}

/// Build the 2.0 export document for `session`
pub fn serialize(catalog: &Catalog, session: &Session, coverage: &CoverageReport) -> ExportDocument {
    ExportDocument::build(catalog, session, coverage)
}

/// Serialize `session` as pretty-printed 2.0 JSON
pub fn export_json(catalog: &Catalog, session: &Session) -> DiscoveryResult<String> {
    let coverage = compute_coverage(catalog, session);
    let document = serialize(catalog, session, &coverage);

    serde_json::to_string_pretty(&document).map_err(|e| {
        DiscoveryError::Serialization(format!("Failed to serialize export document: {}", e))
    })
}

// ============================================================================
// Import
// ============================================================================

/// 1.0 question entry: status and methods may be missing
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyQuestion {
    #[serde(alias = "id")]
    question_id: String,
    #[serde(default)]
    findings: Option<String>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    discovery_methods: Option<Vec<String>>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    last_updated: Option<DateTime<Utc>>,
}

/// 2.0 question entry
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionV2 {
    question_id: String,
    #[serde(default)]
    findings: String,
    #[serde(default)]
    notes: String,
    #[serde(default)]
    discovery_methods: Vec<String>,
    #[serde(default)]
    status: AnswerStatus,
    #[serde(default)]
    last_updated: Option<DateTime<Utc>>,
}

impl QuestionV2 {
    fn into_record(self) -> AnswerRecord {
        AnswerRecord {
            discovery_methods: parse_methods(&self.discovery_methods),
            question_id: self.question_id,
            findings: self.findings,
            notes: self.notes,
            status: self.status,
            last_updated: self.last_updated,
        }
    }
}

/// Migration from 1.0 to 2.0: fill in status and discovery methods
fn migrate_v1_to_v2(legacy: LegacyQuestion) -> QuestionV2 {
    let findings = legacy.findings.unwrap_or_default();

    let status = match legacy.status.as_deref().map(str::parse::<AnswerStatus>) {
        Some(Ok(status)) => status,
        Some(Err(e)) => {
            log::warn!("{} on question '{}'; inferring from findings", e, legacy.question_id);
            AnswerStatus::from_findings(&findings)
        }
        None => AnswerStatus::from_findings(&findings),
    };

    QuestionV2 {
        question_id: legacy.question_id,
        findings,
        notes: legacy.notes.unwrap_or_default(),
        discovery_methods: legacy.discovery_methods.unwrap_or_default(),
        status,
        last_updated: legacy.last_updated,
    }
}

/// Known method tags; unknown tags are dropped with a warning
fn parse_methods(tags: &[String]) -> BTreeSet<DiscoveryMethod> {
    tags.iter()
        .filter_map(|tag| match tag.parse::<DiscoveryMethod>() {
            Ok(method) => Some(method),
            Err(e) => {
                log::warn!("{}; ignoring", e);
                None
            }
        })
        .collect()
}

/// Rename alias keys to their canonical names. A canonical key already
/// present wins over its alias.
pub fn resolve_aliases(mut object: Map<String, Value>) -> Map<String, Value> {
    for (alias, canonical) in METADATA_ALIASES {
        if let Some(value) = object.remove(*alias) {
            if object.contains_key(*canonical) {
                log::debug!(
                    "Ignoring metadata alias '{}' because '{}' is present",
                    alias,
                    canonical
                );
            } else {
                object.insert(canonical.to_string(), value);
            }
        }
    }
    object
}

/// Parse an engagement date written as `YYYY-MM-DD` or a full timestamp
pub(crate) fn parse_engagement_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .or_else(|| text.get(..10).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()))
}

/// Drop or normalize date fields that would otherwise fail the whole import
fn normalize_dates(object: &mut Map<String, Value>) {
    match object.get("engagementDate") {
        Some(Value::String(text)) if text.trim().is_empty() => {
            object.remove("engagementDate");
        }
        Some(Value::String(text)) => match parse_engagement_date(text) {
            Some(date) => {
                object.insert("engagementDate".to_string(), Value::String(date.to_string()));
            }
            None => {
                log::warn!("Unreadable engagement date '{}'; keeping current value", text);
                object.remove("engagementDate");
            }
        },
        Some(Value::Null) | None => {}
        Some(other) => {
            log::warn!("Unexpected engagement date {}; keeping current value", other);
            object.remove("engagementDate");
        }
    }

    let valid_timestamp = match object.get("lastModified") {
        Some(Value::String(text)) => DateTime::parse_from_rfc3339(text).is_ok(),
        Some(Value::Null) | None => true,
        Some(_) => false,
    };
    if !valid_timestamp {
        log::warn!("Unreadable lastModified timestamp; keeping current value");
        object.remove("lastModified");
    }
}

fn metadata_patch(raw: Option<&Value>) -> DiscoveryResult<MetadataPatch> {
    let object = match raw {
        None | Some(Value::Null) => return Ok(MetadataPatch::default()),
        Some(Value::Object(map)) => map.clone(),
        Some(other) => {
            return Err(DiscoveryError::malformed(format!(
                "metadata must be an object, found {}",
                other
            )))
        }
    };

    let mut object = resolve_aliases(object);
    normalize_dates(&mut object);

    serde_json::from_value(Value::Object(object))
        .map_err(|e| DiscoveryError::malformed(format!("Invalid metadata: {}", e)))
}

fn question_records(
    version: SchemaVersion,
    raw: Option<&Value>,
) -> DiscoveryResult<Vec<AnswerRecord>> {
    let questions = match raw {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => Value::Array(items.clone()),
        Some(_) => return Err(DiscoveryError::malformed("questions must be a list")),
    };

    let records = match version {
        SchemaVersion::V2_0 => {
            let questions: Vec<QuestionV2> = serde_json::from_value(questions)
                .map_err(|e| DiscoveryError::malformed(format!("Invalid question entry: {}", e)))?;
            questions.into_iter().map(QuestionV2::into_record).collect()
        }
        SchemaVersion::V1_0 => {
            let legacy: Vec<LegacyQuestion> = serde_json::from_value(questions)
                .map_err(|e| DiscoveryError::malformed(format!("Invalid question entry: {}", e)))?;
            log::info!(
                "Migrating {} questions from schema {} to {}",
                legacy.len(),
                LEGACY_VERSION,
                CURRENT_VERSION
            );
            legacy
                .into_iter()
                .map(migrate_v1_to_v2)
                .map(QuestionV2::into_record)
                .collect()
        }
    };

    Ok(records)
}

/// Import a JSON export against the live session
pub fn import_json(
    catalog: &Catalog,
    current: &Session,
    raw: &str,
) -> DiscoveryResult<ImportOutcome> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| DiscoveryError::malformed(format!("Not valid JSON: {}", e)))?;

    let root = match value {
        Value::Object(map) => map,
        _ => return Err(DiscoveryError::malformed("Expected a JSON object at the top level")),
    };

    let version = SchemaVersion::detect(&root);
    let patch = metadata_patch(root.get("metadata"))?;
    let records = question_records(version, root.get("questions"))?;

    Ok(reconcile(catalog, current, patch, records, DocumentFormat::Json))
}

/// Import a JSON export and return the reconciled session
pub fn deserialize(catalog: &Catalog, current: &Session, raw: &str) -> DiscoveryResult<Session> {
    import_json(catalog, current, raw).map(|outcome| outcome.session)
}
