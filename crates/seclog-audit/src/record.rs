//! Translation of change events into activity records.
//!
//! Pure functions: no I/O, and identical input always yields identical
//! output, including key order.

use seclog_core::{ActivityData, ActivityRecord, ChangeEvent, PermissionEntry};

/// Key of the actor line.
pub const MESSAGE_KEY: &str = "Message";
/// Key of the target content line.
pub const TARGET_KEY: &str = "Target";
/// Key of the save type line.
pub const CHANGE_KEY: &str = "Change";

/// One line per permission entry, in source order.
///
/// `None` when the event carries no permission list.
pub fn describe_entries(event: &ChangeEvent) -> Option<Vec<String>> {
    event
        .entries
        .as_ref()
        .map(|entries| entries.iter().map(describe_entry).collect())
}

fn describe_entry(entry: &PermissionEntry) -> String {
    format!(
        "{} {} access level set to {}.",
        entry.entity_type, entry.name, entry.access
    )
}

/// Build the activity record for a change made by `actor`.
///
/// The first three keys are always `Message`, `Target` and `Change`; each
/// permission entry then gets its own numbered `Change-N` key (1-based) so
/// that the renderer, which shows entries in insertion order, lists them one
/// per line.
pub fn build_record(actor: &str, event: &ChangeEvent) -> ActivityRecord {
    let mut data = ActivityData::new();
    data.insert(MESSAGE_KEY, format!("Access rights changed by '{}'.", actor));
    data.insert(TARGET_KEY, format!("Content id '{}'.", event.content));
    data.insert(CHANGE_KEY, format!("Save type '{}'.", event.save_type));

    if let Some(lines) = describe_entries(event) {
        for (i, line) in lines.into_iter().enumerate() {
            data.insert(format!("{}-{}", CHANGE_KEY, i + 1), line);
        }
    }

    ActivityRecord::content_security(event.save_type, data)
}

/// Human-readable one-line summary of a change, for diagnostics.
pub fn summary_line(actor: &str, event: &ChangeEvent) -> String {
    let changes = match describe_entries(event) {
        Some(lines) => lines.join(" "),
        None => "<unknown>".to_string(),
    };

    format!(
        "Access rights changed by '{}' to content id {}, save type: {}. Following changes were made: {}.",
        actor, event.content, event.save_type, changes
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use seclog_core::{AccessLevel, ContentId, EntityType, SaveType};

    fn event_with(entries: Option<Vec<PermissionEntry>>) -> ChangeEvent {
        ChangeEvent {
            content: ContentId::new(42),
            save_type: SaveType::ReadProtected,
            entries,
            creator: None,
        }
    }

    #[test]
    fn test_build_record_end_to_end() {
        let event = event_with(Some(vec![PermissionEntry::new(
            EntityType::User,
            "bob",
            AccessLevel::READ,
        )]));

        let record = build_record("alice", &event);

        let entries: Vec<(&str, &str)> = record.data.iter().collect();
        assert_eq!(
            entries,
            vec![
                ("Message", "Access rights changed by 'alice'."),
                ("Target", "Content id '42'."),
                ("Change", "Save type 'ReadProtected'."),
                ("Change-1", "User bob access level set to Read."),
            ]
        );
        assert_eq!(record.action, SaveType::ReadProtected);
        assert_eq!(record.action_code(), 32);
    }

    #[test]
    fn test_build_record_without_entries() {
        let record = build_record("alice", &event_with(None));

        assert_eq!(record.data.len(), 3);
        assert!(!record.data.keys().any(|k| k.starts_with("Change-")));
    }

    #[test]
    fn test_build_record_with_empty_entries() {
        let record = build_record("alice", &event_with(Some(vec![])));
        assert_eq!(record.data.len(), 3);
    }

    #[test]
    fn test_build_record_numbers_entries_in_order() {
        let event = event_with(Some(vec![
            PermissionEntry::new(EntityType::Role, "Editors", AccessLevel::READ | AccessLevel::EDIT),
            PermissionEntry::new(EntityType::User, "bob", AccessLevel::NO_ACCESS),
            PermissionEntry::new(EntityType::VisitorGroup, "Returning", AccessLevel::READ),
        ]));

        let record = build_record("alice", &event);

        assert_eq!(record.data.len(), 6);
        assert_eq!(
            record.data.get("Change-1"),
            Some("Role Editors access level set to Read, Edit.")
        );
        assert_eq!(
            record.data.get("Change-2"),
            Some("User bob access level set to NoAccess.")
        );
        assert_eq!(
            record.data.get("Change-3"),
            Some("VisitorGroup Returning access level set to Read.")
        );
    }

    #[test]
    fn test_build_record_keeps_version_in_target() {
        let mut event = event_with(None);
        event.content = ContentId::with_version(42, 7);

        let record = build_record("alice", &event);
        assert_eq!(record.data.get("Target"), Some("Content id '42_7'."));
    }

    #[test]
    fn test_build_record_ignores_creator() {
        let mut event = event_with(None);
        event.creator = Some("someone-else".to_string());

        let record = build_record("alice", &event);
        assert_eq!(
            record.data.get("Message"),
            Some("Access rights changed by 'alice'.")
        );
    }

    #[test]
    fn test_build_record_is_deterministic() {
        let event = event_with(Some(vec![
            PermissionEntry::new(EntityType::User, "a", AccessLevel::READ),
            PermissionEntry::new(EntityType::User, "b", AccessLevel::EDIT),
        ]));
        assert_eq!(build_record("x", &event), build_record("x", &event));
    }

    #[test]
    fn test_summary_line() {
        let event = event_with(Some(vec![
            PermissionEntry::new(EntityType::User, "bob", AccessLevel::READ),
            PermissionEntry::new(EntityType::Role, "Admins", AccessLevel::FULL_ACCESS),
        ]));

        assert_eq!(
            summary_line("alice", &event),
            "Access rights changed by 'alice' to content id 42, save type: ReadProtected. \
             Following changes were made: User bob access level set to Read. \
             Role Admins access level set to FullAccess.."
        );
    }

    #[test]
    fn test_summary_line_unknown_changes() {
        assert!(summary_line("alice", &event_with(None))
            .ends_with("Following changes were made: <unknown>."));
    }
}
