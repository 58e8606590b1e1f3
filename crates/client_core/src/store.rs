//! In-memory post collection and its review lifecycle.
//!
//! Every mutation merges a field update into each targeted post, stamps
//! `last_update` and appends exactly one audit entry per post. Unknown ids are
//! skipped without complaint; no operation can fail. Nothing here reaches the
//! review API: edits live only in this store.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};
use shared::domain::{
    AuditEvent, AuditEventId, AuditEventType, Label, Note, NoteId, OutreachEvent,
    OutreachEventId, OutreachKind, Post, PostFilter, PostId, RiskLevel, Status, UserId,
};
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

use crate::{
    demo,
    notifications::{Notification, Notifier},
};

/// Who is acting. Every audit entry written by a [`PostStore`] is attributed
/// to the session's actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    actor: UserId,
}

impl Session {
    pub fn new(actor: impl Into<UserId>) -> Self {
        Self {
            actor: actor.into(),
        }
    }

    pub fn actor(&self) -> &UserId {
        &self.actor
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationMode {
    /// Edits are applied to the local copy only and never sent upstream.
    LocalOnly,
}

pub(crate) fn payload(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn fresh_id(prefix: &str) -> String {
    format!("{prefix}_{}", Uuid::new_v4().simple())
}

enum Change {
    Assign(UserId),
    FalsePositive,
    Status(Status),
    Risk(RiskLevel),
    Note(String),
    Outreach { kind: OutreachKind, details: String },
}

impl Change {
    /// Applies the field update and returns the matching audit type/payload.
    fn apply(
        &self,
        post: &mut Post,
        actor: &UserId,
        now: DateTime<Utc>,
    ) -> (AuditEventType, Map<String, Value>) {
        match self {
            Change::Assign(user) => {
                post.assignee_id = Some(user.clone());
                post.status = Status::Assigned;
                (AuditEventType::Assign, payload(json!({ "assignee_id": user })))
            }
            Change::FalsePositive => {
                post.label = Some(Label::NotRelevant);
                post.status = Status::ClosedNoFit;
                (
                    AuditEventType::Triage,
                    payload(json!({
                        "label": Label::NotRelevant,
                        "status": Status::ClosedNoFit,
                    })),
                )
            }
            Change::Status(status) => {
                post.status = *status;
                (AuditEventType::StatusChange, payload(json!({ "status": status })))
            }
            Change::Risk(risk) => {
                post.risk_level = Some(*risk);
                (AuditEventType::Triage, payload(json!({ "risk_level": risk })))
            }
            Change::Note(text) => {
                let id = NoteId::new(fresh_id("note"));
                post.notes.push(Note {
                    id: id.clone(),
                    post_id: post.id.clone(),
                    author_user_id: actor.clone(),
                    text: text.clone(),
                    at: now,
                });
                (AuditEventType::Note, payload(json!({ "note_id": id })))
            }
            Change::Outreach { kind, details } => {
                post.outreach_events.push(OutreachEvent {
                    id: OutreachEventId::new(fresh_id("outreach")),
                    post_id: post.id.clone(),
                    actor_user_id: actor.clone(),
                    kind: *kind,
                    details: details.clone(),
                    at: now,
                });
                (AuditEventType::OutreachEvent, payload(json!({ "kind": kind })))
            }
        }
    }
}

pub struct PostStore {
    posts: Vec<Post>,
    session: Session,
    notifier: Notifier,
}

impl PostStore {
    pub fn new(posts: Vec<Post>, session: Session) -> Self {
        Self::with_notifier(posts, session, Notifier::new())
    }

    pub fn with_notifier(posts: Vec<Post>, session: Session, notifier: Notifier) -> Self {
        Self {
            posts,
            session,
            notifier,
        }
    }

    /// Store seeded with the demo posts.
    pub fn demo(session: Session) -> Self {
        Self::new(demo::demo_posts(), session)
    }

    pub fn mode(&self) -> MutationMode {
        MutationMode::LocalOnly
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn set_session(&mut self, session: Session) {
        self.session = session;
    }

    pub fn subscribe_notifications(&self) -> broadcast::Receiver<Notification> {
        self.notifier.subscribe()
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn get(&self, id: &PostId) -> Option<&Post> {
        self.posts.iter().find(|post| &post.id == id)
    }

    pub fn by_assignee(&self, user: &UserId) -> Vec<&Post> {
        self.posts
            .iter()
            .filter(|post| post.assignee_id.as_ref() == Some(user))
            .collect()
    }

    pub fn by_status(&self, status: Status) -> Vec<&Post> {
        self.posts.iter().filter(|post| post.status == status).collect()
    }

    pub fn filter(&self, filter: &PostFilter) -> Vec<&Post> {
        self.posts.iter().filter(|post| filter.matches(post)).collect()
    }

    /// Replaces the whole collection, e.g. to restore the demo seed.
    pub fn reset(&mut self, posts: Vec<Post>) {
        debug!(count = posts.len(), "resetting post store");
        self.posts = posts;
    }

    pub fn assign(&mut self, id: &PostId, user: &UserId) {
        self.apply(std::slice::from_ref(id), &Change::Assign(user.clone()));
        self.notifier.notify(Notification::new(
            "Post assigned",
            "Post has been successfully assigned.",
        ));
    }

    pub fn assign_many(&mut self, ids: &[PostId], user: &UserId) {
        self.apply(ids, &Change::Assign(user.clone()));
        self.notifier.notify(Notification::new(
            "Posts assigned",
            format!("{} posts have been assigned.", ids.len()),
        ));
    }

    pub fn mark_false_positive(&mut self, id: &PostId) {
        self.apply(std::slice::from_ref(id), &Change::FalsePositive);
        self.notifier.notify(Notification::new(
            "Marked as false positive",
            "Post has been marked as not relevant.",
        ));
    }

    pub fn mark_false_positive_many(&mut self, ids: &[PostId]) {
        self.apply(ids, &Change::FalsePositive);
        self.notifier.notify(Notification::new(
            "Marked as false positives",
            format!("{} posts have been marked as not relevant.", ids.len()),
        ));
    }

    pub fn set_status(&mut self, id: &PostId, status: Status) {
        self.apply(std::slice::from_ref(id), &Change::Status(status));
        self.notifier.notify(Notification::new(
            "Status updated",
            format!("Post status changed to {status}."),
        ));
    }

    pub fn set_status_many(&mut self, ids: &[PostId], status: Status) {
        self.apply(ids, &Change::Status(status));
        self.notifier.notify(Notification::new(
            "Status updated",
            format!("{} posts status changed to {status}.", ids.len()),
        ));
    }

    pub fn set_risk(&mut self, id: &PostId, risk: RiskLevel) {
        self.apply(std::slice::from_ref(id), &Change::Risk(risk));
        self.notifier.notify(Notification::new(
            "Risk level updated",
            format!("Post risk level changed to {risk}."),
        ));
    }

    pub fn set_risk_many(&mut self, ids: &[PostId], risk: RiskLevel) {
        self.apply(ids, &Change::Risk(risk));
        self.notifier.notify(Notification::new(
            "Risk level updated",
            format!("{} posts risk level changed to {risk}.", ids.len()),
        ));
    }

    pub fn add_note(&mut self, id: &PostId, text: impl Into<String>) {
        self.apply(std::slice::from_ref(id), &Change::Note(text.into()));
        self.notifier.notify(Notification::new(
            "Note added",
            "Note has been added to the post.",
        ));
    }

    pub fn log_outreach(&mut self, id: &PostId, kind: OutreachKind, details: impl Into<String>) {
        self.apply(
            std::slice::from_ref(id),
            &Change::Outreach {
                kind,
                details: details.into(),
            },
        );
        self.notifier.notify(Notification::new(
            "Outreach logged",
            format!("Outreach event {kind} recorded."),
        ));
    }

    /// Applies `change` once to every distinct post named in `ids` and
    /// returns how many posts were touched.
    fn apply(&mut self, ids: &[PostId], change: &Change) -> usize {
        let targets: HashSet<&PostId> = ids.iter().collect();
        let actor = self.session.actor.clone();
        let now = Utc::now();
        let mut touched = 0;

        for post in self.posts.iter_mut().filter(|post| targets.contains(&post.id)) {
            let (event_type, payload) = change.apply(post, &actor, now);
            post.last_update = now;
            post.audit.push(AuditEvent {
                id: AuditEventId::new(fresh_id("audit")),
                post_id: post.id.clone(),
                actor_user_id: actor.clone(),
                event_type,
                payload,
                at: now,
            });
            touched += 1;
        }

        debug!(
            requested = ids.len(),
            touched,
            actor = %actor,
            "applied local post mutation"
        );
        touched
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
