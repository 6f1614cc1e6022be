// Import, export and summary commands

use super::{notify, Notification, Workspace};
use crate::analysis::{compute_coverage, CoverageReport};
use crate::codec::{self, DocumentFormat};
use crate::summary::{generate_summary, SummaryDocument};

/// Import a document's raw bytes, detecting the format from `file_name`.
/// The live session is replaced only when the whole document parsed and
/// the result was saved.
pub fn import_document(workspace: &mut Workspace, file_name: &str, bytes: &[u8]) -> Notification {
    let store = workspace.store();
    let outcome = match codec::import_file(store.catalog(), store.session(), file_name, bytes) {
        Ok(outcome) => outcome,
        Err(err) => return Notification::failure("Import", &err),
    };

    let imported = outcome.imported_questions;
    let format = outcome.format;
    let result = workspace
        .commit(|ws| {
            ws.store.replace_session(outcome.session);
            Ok(())
        })
        .map(|_| {
            let noun = if imported == 1 { "question" } else { "questions" };
            format!("Imported {} {} from {}", imported, noun, format.display_name())
        });
    notify("Import", result)
}

/// Export the live session as current-version JSON
pub fn export_document(workspace: &Workspace) -> (Notification, Option<String>) {
    let store = workspace.store();
    match codec::export_json(store.catalog(), store.session()) {
        Ok(text) => {
            let answered = store.session().answered_count();
            (
                Notification::success(format!(
                    "Exported {} answered questions as {}",
                    answered,
                    DocumentFormat::Json.display_name()
                )),
                Some(text),
            )
        }
        Err(err) => (Notification::failure("Export", &err), None),
    }
}

/// Summary report, limited to the configured number of recommendations
pub fn summarize(workspace: &Workspace) -> (Notification, SummaryDocument) {
    let store = workspace.store();
    let summary = generate_summary(store.catalog(), store.session())
        .limit_recommendations(workspace.config().max_recommendations);
    (Notification::success("Summary generated"), summary)
}

pub fn coverage(workspace: &Workspace) -> CoverageReport {
    let store = workspace.store();
    compute_coverage(store.catalog(), store.session())
}
