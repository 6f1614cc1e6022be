// Version history commands

use super::{notify, Notification, Workspace};
use crate::versions::VersionSummary;

pub fn save_version(workspace: &mut Workspace, label: Option<&str>) -> Notification {
    let result = workspace
        .commit(|ws| Ok(ws.history.save_version(ws.store.session(), label)))
        .map(|snapshot| format!("Version {} saved", snapshot.version_number));
    notify("Save version", result)
}

pub fn list_versions(workspace: &Workspace) -> Vec<VersionSummary> {
    workspace.history().list_versions()
}

/// Replace the live session with a copy of version `version_number`
pub fn load_version(workspace: &mut Workspace, version_number: u32) -> Notification {
    let result = workspace
        .commit(|ws| {
            let session = ws.history.load_version(version_number)?;
            ws.store.replace_session(session);
            Ok(())
        })
        .map(|_| format!("Version {} loaded", version_number));
    notify("Load version", result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{flaky_workspace, workspace};
    use crate::commands::NotificationKind;
    use crate::models::AnswerStatus;

    #[test]
    fn test_save_and_load_version() {
        let mut ws = workspace();
        assert_eq!(save_version(&mut ws, Some("Kickoff")).message, "Version 1 saved");

        ws.store_mut().set_status("q1", AnswerStatus::Answered).unwrap();
        assert_eq!(save_version(&mut ws, None).message, "Version 2 saved");

        let notification = load_version(&mut ws, 1);
        assert_eq!(notification.message, "Version 1 loaded");
        assert_eq!(ws.store().session().answered_count(), 0);

        let listed = list_versions(&ws);
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].label.as_deref(), Some("Kickoff"));
    }

    #[test]
    fn test_load_missing_version() {
        let mut ws = workspace();
        let notification = load_version(&mut ws, 9);
        assert!(!notification.is_success());
        assert!(notification.message.contains("Version not found"));
    }

    #[test]
    fn test_failed_save_does_not_consume_version_number() {
        let (mut ws, failing) = flaky_workspace();
        failing.set(true);

        let notification = save_version(&mut ws, Some("Kickoff"));
        assert_eq!(notification.kind, NotificationKind::Failure);
        assert!(list_versions(&ws).is_empty());

        failing.set(false);
        assert_eq!(save_version(&mut ws, None).message, "Version 1 saved");
    }

    #[test]
    fn test_failed_load_keeps_live_session() {
        let (mut ws, failing) = flaky_workspace();
        assert!(save_version(&mut ws, None).is_success());
        ws.store_mut().set_status("q4", AnswerStatus::Answered).unwrap();
        failing.set(true);
        let before = ws.store().session().clone();

        let notification = load_version(&mut ws, 1);

        assert_eq!(notification.kind, NotificationKind::Failure);
        assert_eq!(ws.store().session(), &before);
    }
}
