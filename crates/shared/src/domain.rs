use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ParseTaxonomyError;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl FromStr for $name {
            type Err = std::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.to_string()))
            }
        }
    };
}

id_newtype!(PostId);
id_newtype!(UserId);
id_newtype!(AuditEventId);
id_newtype!(NoteId);
id_newtype!(OutreachEventId);

/// Lowercases `value` and collapses every run of non-alphanumerics into a
/// single `-`, so `"Closed – No Fit"` and `closed-no-fit` compare equal.
pub fn slug(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut pending_dash = false;
    for ch in value.chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.extend(ch.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    out
}

/// Closed enumerations whose wire form is a fixed display label.
macro_rules! labeled_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub const fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = ParseTaxonomyError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = slug(s);
                Self::ALL
                    .iter()
                    .copied()
                    .find(|candidate| slug(candidate.label()) == wanted)
                    .ok_or_else(|| ParseTaxonomyError::new($kind, s))
            }
        }
    };
}

labeled_enum!(
    Platform, "platform" {
        Reddit => "reddit",
        Youtube => "youtube",
    }
);

labeled_enum!(
    /// Workflow status of a post under review.
    Status, "status" {
        New => "New",
        Assigned => "Assigned",
        InOutreach => "In Outreach",
        WaitingReply => "Waiting Reply",
        Converted => "Converted",
        ClosedNoFit => "Closed – No Fit",
    }
);

labeled_enum!(
    RiskLevel, "risk level" {
        Crisis => "Crisis",
        High => "High",
        Medium => "Medium",
        Low => "Low",
    }
);

labeled_enum!(
    Label, "label" {
        PotentialLead => "Potential Lead",
        NotRelevant => "Not Relevant",
    }
);

labeled_enum!(
    Role, "role" {
        Admin => "admin",
        Reviewer => "reviewer",
    }
);

labeled_enum!(
    /// Closed set of audit entry kinds.
    AuditEventType, "audit event type" {
        Create => "create",
        Triage => "triage",
        Assign => "assign",
        StatusChange => "status_change",
        Note => "note",
        OutreachEvent => "outreach_event",
        Import => "import",
    }
);

labeled_enum!(
    OutreachKind, "outreach kind" {
        InitialDm => "initial_dm",
        FollowUp => "follow_up",
        ReplyReceived => "reply_received",
        CallScheduled => "call_scheduled",
        IntakeCompleted => "intake_completed",
        Other => "other",
    }
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Where a post was found: a subreddit for Reddit, a channel for YouTube.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subreddit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
}

impl PostSource {
    pub fn subreddit(name: impl Into<String>) -> Self {
        Self {
            subreddit: Some(name.into()),
            channel: None,
        }
    }

    pub fn channel(name: impl Into<String>) -> Self {
        Self {
            subreddit: None,
            channel: Some(name.into()),
        }
    }

    pub fn locator(&self) -> Option<&str> {
        self.subreddit.as_deref().or(self.channel.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub post_id: PostId,
    pub author_user_id: UserId,
    pub text: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutreachEvent {
    pub id: OutreachEventId,
    pub post_id: PostId,
    pub actor_user_id: UserId,
    pub kind: OutreachKind,
    pub details: String,
    pub at: DateTime<Utc>,
}

/// One immutable entry of a post's audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: AuditEventId,
    pub post_id: PostId,
    pub actor_user_id: UserId,
    #[serde(rename = "type")]
    pub event_type: AuditEventType,
    #[serde(default)]
    pub payload: Map<String, Value>,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub platform: Platform,
    pub source: PostSource,
    pub author: String,
    pub text: String,
    pub url: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keyword_hits: Vec<String>,
    /// 0 to 5.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance_score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<Label>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<UserId>,
    pub last_update: DateTime<Utc>,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub outreach_events: Vec<OutreachEvent>,
    #[serde(default)]
    pub audit: Vec<AuditEvent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at <= self.end
    }
}

/// Narrowing criteria for the local post collection. Unset fields match
/// everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    pub search: Option<String>,
    pub platform: Option<Platform>,
    pub date_range: Option<DateRange>,
    pub risk_level: Option<RiskLevel>,
    pub status: Option<Status>,
    pub label: Option<Label>,
    pub assignee: Option<UserId>,
    pub min_relevance: Option<u8>,
}

impl PostFilter {
    pub fn matches(&self, post: &Post) -> bool {
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            let hit = post.text.to_lowercase().contains(&needle)
                || post.author.to_lowercase().contains(&needle)
                || post
                    .source
                    .locator()
                    .is_some_and(|locator| locator.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        if self.platform.is_some_and(|p| p != post.platform) {
            return false;
        }
        if self
            .date_range
            .is_some_and(|range| !range.contains(post.timestamp))
        {
            return false;
        }
        if self.risk_level.is_some() && self.risk_level != post.risk_level {
            return false;
        }
        if self.status.is_some_and(|s| s != post.status) {
            return false;
        }
        if self.label.is_some() && self.label != post.label {
            return false;
        }
        if self.assignee.is_some() && self.assignee != post.assignee_id {
            return false;
        }
        if let Some(min) = self.min_relevance {
            if post.relevance_score.map_or(true, |score| score < min) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_status_uses_en_dash_on_the_wire() {
        let raw = serde_json::to_string(&Status::ClosedNoFit).expect("serialize");
        assert_eq!(raw, "\"Closed – No Fit\"");
        let back: Status = serde_json::from_str(&raw).expect("deserialize");
        assert_eq!(back, Status::ClosedNoFit);
    }

    #[test]
    fn labels_parse_from_display_text_and_slugs() {
        assert_eq!("closed-no-fit".parse::<Status>().unwrap(), Status::ClosedNoFit);
        assert_eq!("In Outreach".parse::<Status>().unwrap(), Status::InOutreach);
        assert_eq!("medium".parse::<RiskLevel>().unwrap(), RiskLevel::Medium);
        assert_eq!("not_relevant".parse::<Label>().unwrap(), Label::NotRelevant);
        assert_eq!(
            "status_change".parse::<AuditEventType>().unwrap(),
            AuditEventType::StatusChange
        );

        let err = "escalated".parse::<Status>().unwrap_err();
        assert_eq!(err.to_string(), "unknown status `escalated`");
    }

    #[test]
    fn audit_event_type_field_is_named_type() {
        let event = AuditEvent {
            id: "audit_1".into(),
            post_id: "1".into(),
            actor_user_id: "system".into(),
            event_type: AuditEventType::Create,
            payload: Map::new(),
            at: Utc::now(),
        };
        let value = serde_json::to_value(&event).expect("serialize");
        assert_eq!(value["type"], "create");
        assert!(value.get("event_type").is_none());
    }

    #[test]
    fn source_locator_prefers_subreddit() {
        assert_eq!(PostSource::subreddit("r/depression").locator(), Some("r/depression"));
        assert_eq!(PostSource::channel("AnxietySupport").locator(), Some("AnxietySupport"));
        assert_eq!(PostSource::default().locator(), None);
    }
}
