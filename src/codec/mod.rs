//! Document interchange
//!
//! Maps a `Session` to and from its external representations:
//!
//! - **JSON** (`json`) - versioned export/import; 2.0 is written, 1.0 and 2.0 are read
//! - **Markdown** (`markdown`) - human-authored discovery notes with status glyphs, import only
//!
//! The format is chosen from the file extension, never sniffed from content.
//! Every import is computed against a copy of the live session; nothing is
//! committed until the caller hands the result to the `StateStore`.

pub mod json;
pub mod markdown;

pub use json::{export_json, serialize, ExportDocument, CURRENT_VERSION, LEGACY_VERSION};

use crate::catalog::Catalog;
use crate::error::{DiscoveryError, DiscoveryResult};
use crate::models::{AnswerRecord, MetadataPatch, Session};

/// Supported document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Markdown,
}

impl DocumentFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "md" | "markdown" => Some(Self::Markdown),
            _ => None,
        }
    }

    /// Detect format from file path
    pub fn from_path(path: &str) -> Option<Self> {
        std::path::Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            DocumentFormat::Json => "JSON",
            DocumentFormat::Markdown => "Markdown",
        }
    }
}

/// Result of a successful import, not yet committed
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    /// The reconciled session
    pub session: Session,
    /// Questions applied to catalog records
    pub imported_questions: usize,
    /// Questions dropped because their id is not in the catalog
    pub skipped_questions: usize,
    pub format: DocumentFormat,
}

/// Build the imported session: question state starts from a fresh all-open
/// session, metadata merges over the current metadata. Records for ids
/// outside the catalog are skipped; a repeated id keeps its last record.
pub(crate) fn reconcile(
    catalog: &Catalog,
    current: &Session,
    metadata: MetadataPatch,
    records: Vec<AnswerRecord>,
    format: DocumentFormat,
) -> ImportOutcome {
    let mut session = Session::new(catalog);
    *session.metadata_mut() = current.metadata().clone();
    metadata.apply_to(session.metadata_mut());

    let mut imported_questions = 0;
    let mut skipped_questions = 0;

    for record in records {
        match session.answer_mut(&record.question_id) {
            Some(slot) => {
                *slot = record;
                imported_questions += 1;
            }
            None => {
                log::debug!("Skipping question '{}' not in the catalog", record.question_id);
                skipped_questions += 1;
            }
        }
    }

    log::info!(
        "Imported {} questions from {} ({} skipped)",
        imported_questions,
        format.display_name(),
        skipped_questions
    );

    ImportOutcome {
        session,
        imported_questions,
        skipped_questions,
        format,
    }
}

/// Import decoded `text` in the given format
pub fn import_document(
    catalog: &Catalog,
    current: &Session,
    text: &str,
    format: DocumentFormat,
) -> DiscoveryResult<ImportOutcome> {
    match format {
        DocumentFormat::Json => json::import_json(catalog, current, text),
        DocumentFormat::Markdown => Ok(markdown::import_markdown(catalog, current, text)),
    }
}

/// Import raw file bytes; bytes that are not UTF-8 are malformed in any format
pub fn import_bytes(
    catalog: &Catalog,
    current: &Session,
    bytes: &[u8],
    format: DocumentFormat,
) -> DiscoveryResult<ImportOutcome> {
    let text = std::str::from_utf8(bytes).map_err(|e| {
        DiscoveryError::malformed(format!("{} document is not valid UTF-8: {}", format.display_name(), e))
    })?;
    import_document(catalog, current, text, format)
}

/// Import a file's contents, detecting the format from its name
pub fn import_file(
    catalog: &Catalog,
    current: &Session,
    file_name: &str,
    bytes: &[u8],
) -> DiscoveryResult<ImportOutcome> {
    let format = DocumentFormat::from_path(file_name)
        .ok_or_else(|| DiscoveryError::UnsupportedFormat(file_name.to_string()))?;
    import_bytes(catalog, current, bytes, format)
}
