use chrono::{DateTime, Utc};
use serde_json::Value;
use shared::domain::{AuditEvent, AuditEventType, UserId};

use crate::{directory::UserDirectory, views::relative_time};

pub const EMPTY_TEXT: &str = "No audit events recorded.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntryView {
    pub type_label: String,
    pub description: String,
    pub age: String,
    /// Pretty-printed payload; `None` when the payload is empty.
    pub payload: Option<String>,
}

fn payload_str<'a>(event: &'a AuditEvent, key: &str) -> Option<&'a str> {
    event.payload.get(key).and_then(Value::as_str)
}

pub fn describe(event: &AuditEvent, directory: &UserDirectory) -> String {
    let actor = directory
        .name_of(&event.actor_user_id)
        .unwrap_or("System");

    match event.event_type {
        AuditEventType::Create => format!("{actor} created the post"),
        AuditEventType::Triage => format!("{actor} triaged the post"),
        AuditEventType::Assign => {
            let assignee = payload_str(event, "assignee_id")
                .and_then(|id| directory.name_of(&UserId::from(id)))
                .unwrap_or("Unknown");
            format!("{actor} assigned to {assignee}")
        }
        AuditEventType::StatusChange => format!(
            "{actor} changed status to {}",
            payload_str(event, "status").unwrap_or_default()
        ),
        AuditEventType::Note => format!("{actor} added a note"),
        AuditEventType::OutreachEvent => format!(
            "{actor} logged outreach: {}",
            payload_str(event, "kind").unwrap_or_default()
        ),
        AuditEventType::Import => format!("{actor} imported via CSV"),
    }
}

/// Entries newest first. The stored log is left in call order.
pub fn entries(
    events: &[AuditEvent],
    directory: &UserDirectory,
    now: DateTime<Utc>,
) -> Vec<AuditEntryView> {
    let mut sorted: Vec<&AuditEvent> = events.iter().collect();
    sorted.sort_by(|a, b| b.at.cmp(&a.at));
    sorted
        .into_iter()
        .map(|event| AuditEntryView {
            type_label: event.event_type.label().replace('_', " "),
            description: describe(event, directory),
            age: relative_time(event.at, now),
            payload: (!event.payload.is_empty())
                .then(|| serde_json::to_string_pretty(&event.payload).ok())
                .flatten(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::{json, Map};

    use crate::store::payload;

    fn event(actor: &str, event_type: AuditEventType, body: Value, at: DateTime<Utc>) -> AuditEvent {
        AuditEvent {
            id: format!("audit-{}", at.timestamp()).into(),
            post_id: "1".into(),
            actor_user_id: actor.into(),
            event_type,
            payload: payload(body),
            at,
        }
    }

    #[test]
    fn assign_names_both_users() {
        let directory = UserDirectory::demo();
        let entry = event("1", AuditEventType::Assign, json!({ "assignee_id": "3" }), Utc::now());
        assert_eq!(describe(&entry, &directory), "Sarah Chen assigned to Emily Johnson");
    }

    #[test]
    fn unknown_users_fall_back() {
        let directory = UserDirectory::demo();
        let entry = event("system", AuditEventType::Assign, json!({ "assignee_id": "99" }), Utc::now());
        assert_eq!(describe(&entry, &directory), "System assigned to Unknown");

        let entry = event("2", AuditEventType::StatusChange, json!({ "status": "Converted" }), Utc::now());
        assert_eq!(describe(&entry, &directory), "Mike Rodriguez changed status to Converted");

        let entry = event("4", AuditEventType::OutreachEvent, json!({ "kind": "initial_dm" }), Utc::now());
        assert_eq!(describe(&entry, &directory), "David Park logged outreach: initial_dm");

        let entry = event("4", AuditEventType::Import, json!({}), Utc::now());
        assert_eq!(describe(&entry, &directory), "David Park imported via CSV");
    }

    #[test]
    fn entries_are_newest_first_with_readable_types() {
        let directory = UserDirectory::demo();
        let now = Utc::now();
        let log = vec![
            event("1", AuditEventType::Create, json!({ "source": "import" }), now - Duration::hours(5)),
            event("1", AuditEventType::StatusChange, json!({ "status": "Assigned" }), now - Duration::minutes(5)),
            event("1", AuditEventType::Note, Value::Object(Map::new()), now - Duration::hours(1)),
        ];

        let views = entries(&log, &directory, now);

        let types: Vec<&str> = views.iter().map(|v| v.type_label.as_str()).collect();
        assert_eq!(types, vec!["status change", "note", "create"]);
        assert_eq!(views[0].age, "5 minutes ago");
        assert_eq!(views[1].payload, None);
        assert_eq!(
            views[2].payload.as_deref(),
            Some("{\n  \"source\": \"import\"\n}")
        );
        assert_eq!(log[0].event_type, AuditEventType::Create);
    }

    #[test]
    fn empty_log_has_no_entries() {
        assert!(entries(&[], &UserDirectory::demo(), Utc::now()).is_empty());
        assert_eq!(EMPTY_TEXT, "No audit events recorded.");
    }
}
