// Answer and metadata editing commands

use super::{notify, Notification, Workspace};
use crate::models::{AnswerPatch, AnswerStatus, DiscoveryMethod, MetadataPatch};

/// Record findings (and optionally notes) for a question
pub fn record_answer(
    workspace: &mut Workspace,
    question_id: &str,
    findings: &str,
    notes: Option<&str>,
) -> Notification {
    let mut patch = AnswerPatch::findings(findings);
    if let Some(notes) = notes {
        patch = patch.with_notes(notes);
    }

    let result = workspace
        .commit(|ws| ws.store.set_answer(question_id, patch))
        .map(|_| format!("Saved answer for {}", question_id.to_uppercase()));
    notify("Save answer", result)
}

pub fn update_status(
    workspace: &mut Workspace,
    question_id: &str,
    status: AnswerStatus,
) -> Notification {
    let result = workspace
        .commit(|ws| ws.store.set_status(question_id, status))
        .map(|_| format!("Marked {} as {}", question_id.to_uppercase(), status));
    notify("Update status", result)
}

pub fn toggle_method(
    workspace: &mut Workspace,
    question_id: &str,
    method: DiscoveryMethod,
) -> Notification {
    let result = workspace
        .commit(|ws| ws.store.toggle_method(question_id, method))
        .map(|_| {
            let enabled = workspace
                .store()
                .session()
                .answer(question_id)
                .map_or(false, |r| r.discovery_methods.contains(&method));
            let verb = if enabled { "Added" } else { "Removed" };
            format!("{} {} on {}", verb, method.display_name(), question_id.to_uppercase())
        });
    notify("Toggle method", result)
}

pub fn update_metadata(workspace: &mut Workspace, patch: MetadataPatch) -> Notification {
    if patch.is_empty() {
        return Notification::success("Nothing to update");
    }
    let result = workspace
        .commit(|ws| {
            ws.store.set_metadata(patch);
            Ok(())
        })
        .map(|_| "Engagement details updated".to_string());
    notify("Update engagement details", result)
}

/// Start over with an empty session; versions are kept
pub fn reset_session(workspace: &mut Workspace) -> Notification {
    let result = workspace
        .commit(|ws| {
            ws.store.reset();
            ws.apply_default_coach();
            Ok(())
        })
        .map(|_| "Session reset".to_string());
    notify("Reset", result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{flaky_workspace, workspace};
    use crate::commands::NotificationKind;

    #[test]
    fn test_record_answer() {
        let mut ws = workspace();
        let notification = record_answer(&mut ws, "q3", "Spreadsheets", Some("ask finance"));

        assert!(notification.is_success());
        assert_eq!(notification.message, "Saved answer for Q3");
        let record = ws.store().session().answer("q3").unwrap();
        assert_eq!(record.findings, "Spreadsheets");
        assert_eq!(record.notes, "ask finance");
    }

    #[test]
    fn test_unknown_question_fails() {
        let mut ws = workspace();
        let notification = record_answer(&mut ws, "q77", "x", None);

        assert_eq!(notification.kind, NotificationKind::Failure);
        assert!(notification.message.contains("Unknown question"));
    }

    #[test]
    fn test_toggle_method_messages() {
        let mut ws = workspace();
        let added = toggle_method(&mut ws, "q1", DiscoveryMethod::Survey);
        let removed = toggle_method(&mut ws, "q1", DiscoveryMethod::Survey);

        assert_eq!(added.message, "Added Surveys on Q1");
        assert_eq!(removed.message, "Removed Surveys on Q1");
    }

    #[test]
    fn test_status_and_reset() {
        let mut ws = workspace();
        assert!(update_status(&mut ws, "q2", AnswerStatus::Answered).is_success());
        assert_eq!(ws.store().session().answered_count(), 1);

        assert!(reset_session(&mut ws).is_success());
        assert_eq!(ws.store().session().answered_count(), 0);
    }

    #[test]
    fn test_update_metadata() {
        let mut ws = workspace();
        let notification = update_metadata(
            &mut ws,
            MetadataPatch {
                client_name: Some("Acme".to_string()),
                ..Default::default()
            },
        );

        assert!(notification.is_success());
        assert_eq!(ws.store().session().metadata().client_name, "Acme");
    }

    #[test]
    fn test_failed_save_keeps_previous_answers() {
        let (mut ws, failing) = flaky_workspace();
        assert!(record_answer(&mut ws, "q1", "Manual re-keying", None).is_success());
        failing.set(true);
        let before = ws.store().session().clone();

        let answer = record_answer(&mut ws, "q1", "Overwritten", None);
        let status = update_status(&mut ws, "q2", AnswerStatus::Answered);
        let method = toggle_method(&mut ws, "q3", DiscoveryMethod::Survey);
        let reset = reset_session(&mut ws);

        for notification in [answer, status, method, reset] {
            assert_eq!(notification.kind, NotificationKind::Failure);
            assert!(notification.message.contains("Storage failure"));
        }
        assert_eq!(ws.store().session(), &before);
    }
}
