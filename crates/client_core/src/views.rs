use chrono::{DateTime, Local, TimeZone, Utc};
use shared::{
    domain::{Label, Platform, Post, RiskLevel},
    protocol::{CommentRecord, MediaItemRecord, Score},
    taxonomy::{self, PLACEHOLDER},
};

use crate::directory::UserDirectory;

pub const BODY_PREVIEW: usize = 200;
pub const MEDIA_BODY_PREVIEW: usize = 400;
pub const MEDIA_ID_PREVIEW: usize = 10;
pub const COMMENT_ID_PREVIEW: usize = 8;

/// Keeps the first `max` characters and marks the cut with `...`.
pub fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit}")
    } else {
        format!("{n} {unit}s")
    }
}

/// Coarse age of `at` relative to `now`: `"5 minutes ago"`, `"in 2 hours"`.
pub fn relative_time(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = at.signed_duration_since(now);
    let secs = delta.num_seconds().abs();
    let span = match secs {
        s if s < 60 => "less than a minute".to_string(),
        s if s < 3_600 => plural(s / 60, "minute"),
        s if s < 86_400 => plural(s / 3_600, "hour"),
        s if s < 30 * 86_400 => plural(s / 86_400, "day"),
        s if s < 365 * 86_400 => plural(s / (30 * 86_400), "month"),
        s => plural(s / (365 * 86_400), "year"),
    };
    if delta.num_seconds() > 0 {
        format!("in {span}")
    } else {
        format!("{span} ago")
    }
}

pub fn format_timestamp_in<Tz: TimeZone>(at: DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.with_timezone(tz).format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Absolute time in the machine's local zone.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    format_timestamp_in(at, &Local)
}

pub fn score_out_of_five(score: Option<&Score>) -> String {
    score.map_or_else(|| PLACEHOLDER.to_string(), |score| format!("{score}/5"))
}

fn or_placeholder(value: Option<&str>) -> String {
    value
        .filter(|value| !value.is_empty())
        .unwrap_or(PLACEHOLDER)
        .to_string()
}

pub fn processing_status_tone(code: i64) -> &'static str {
    match code {
        0 => "new",
        1 => "status-in-progress",
        2 => "processed",
        3 => "failed",
        _ => "default",
    }
}

pub fn risk_tone(risk: RiskLevel) -> &'static str {
    match risk {
        RiskLevel::Crisis => "risk-crisis",
        RiskLevel::High => "risk-high",
        RiskLevel::Medium => "risk-medium",
        RiskLevel::Low => "risk-low",
    }
}

pub fn label_tone(label: Label) -> &'static str {
    match label {
        Label::PotentialLead => "label-potential",
        Label::NotRelevant => "label-not-relevant",
    }
}

pub fn platform_tone(platform: Platform) -> &'static str {
    match platform {
        Platform::Reddit => "platform-reddit",
        Platform::Youtube => "platform-youtube",
    }
}

/// One line of the media item queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItemRow {
    pub id: String,
    pub content_id: String,
    pub platform: &'static str,
    pub platform_tone: &'static str,
    pub title: String,
    pub body: String,
    pub author: String,
    pub risk: &'static str,
    pub risk_tone: Option<&'static str>,
    pub status: &'static str,
    pub status_tone: &'static str,
    pub score: String,
    pub created: String,
    pub fetched: String,
}

impl MediaItemRow {
    pub fn from_record(record: &MediaItemRecord, now: DateTime<Utc>) -> Self {
        Self {
            id: truncate(&record.id, MEDIA_ID_PREVIEW),
            content_id: or_placeholder(record.content_id.as_deref()),
            platform: record.platform.label(),
            platform_tone: platform_tone(record.platform),
            title: record.title.clone(),
            body: truncate(record.body.as_deref().unwrap_or_default(), MEDIA_BODY_PREVIEW),
            author: or_placeholder(record.author.as_deref()),
            risk: taxonomy::risk_level_label(record.risk_level),
            risk_tone: record
                .risk_level
                .and_then(taxonomy::risk_level_from_code)
                .map(risk_tone),
            status: taxonomy::processing_status_label(Some(record.processing_status)),
            status_tone: processing_status_tone(record.processing_status),
            score: score_out_of_five(record.score.as_ref()),
            created: relative_time(record.created_at_platform, now),
            fetched: format_timestamp(record.fetched_at),
        }
    }
}

/// One line of the comments table, including the classifier's verdicts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentRow {
    pub id: String,
    pub comment_id: String,
    pub media_item: String,
    pub author: String,
    pub body: String,
    pub platform: &'static str,
    pub platform_tone: &'static str,
    pub status: &'static str,
    pub status_tone: &'static str,
    pub score: String,
    pub risk: &'static str,
    pub result: &'static str,
    pub category: &'static str,
    pub subtype: &'static str,
    pub relevance: &'static str,
    pub urgency: &'static str,
    pub created: String,
    pub fetched: String,
}

impl CommentRow {
    pub fn from_record(record: &CommentRecord, now: DateTime<Utc>) -> Self {
        Self {
            id: truncate(&record.id, COMMENT_ID_PREVIEW),
            comment_id: record.comment_id.clone(),
            media_item: or_placeholder(record.media_item_id_ext.as_deref()),
            author: or_placeholder(record.author.as_deref()),
            body: truncate(record.body.as_deref().unwrap_or_default(), BODY_PREVIEW),
            platform: record.platform.label(),
            platform_tone: platform_tone(record.platform),
            status: taxonomy::processing_status_label(Some(record.processing_status)),
            status_tone: processing_status_tone(record.processing_status),
            score: score_out_of_five(record.score.as_ref()),
            risk: taxonomy::risk_level_label(record.risk_level),
            result: taxonomy::processing_result_label(record.processing_result),
            category: taxonomy::category_label(record.category),
            subtype: taxonomy::subtype_label(record.subtype),
            relevance: taxonomy::relevance_label(record.relevance),
            urgency: taxonomy::urgency_label(record.urgency),
            created: relative_time(record.created_at_platform, now),
            fetched: format_timestamp(record.fetched_at),
        }
    }
}

/// One line of the local review queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRow {
    pub id: String,
    pub platform: &'static str,
    pub platform_tone: &'static str,
    pub source: String,
    pub author: String,
    pub text: String,
    pub keywords: String,
    pub relevance: String,
    pub risk: &'static str,
    pub risk_tone: Option<&'static str>,
    pub label: &'static str,
    pub label_tone: Option<&'static str>,
    pub status: &'static str,
    pub assignee: String,
    pub updated: String,
}

impl PostRow {
    pub fn from_post(post: &Post, directory: &UserDirectory, now: DateTime<Utc>) -> Self {
        let assignee = match &post.assignee_id {
            Some(id) => directory.name_of(id).unwrap_or(id.as_str()).to_string(),
            None => "Unassigned".to_string(),
        };
        Self {
            id: post.id.to_string(),
            platform: post.platform.label(),
            platform_tone: platform_tone(post.platform),
            source: or_placeholder(post.source.locator()),
            author: post.author.clone(),
            text: truncate(&post.text, BODY_PREVIEW),
            keywords: post.keyword_hits.join(", "),
            relevance: post
                .relevance_score
                .map_or_else(|| PLACEHOLDER.to_string(), |score| format!("{score}/5")),
            risk: post.risk_level.map_or(PLACEHOLDER, RiskLevel::label),
            risk_tone: post.risk_level.map(risk_tone),
            label: post.label.map_or(PLACEHOLDER, Label::label),
            label_tone: post.label.map(label_tone),
            status: post.status.label(),
            assignee,
            updated: relative_time(post.last_update, now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset};
    use shared::domain::{PostId, Status};

    use crate::demo;

    fn comment() -> CommentRecord {
        CommentRecord {
            id: "0f8e2c4a-9b1d-4c55-a0e7-3d2f1b6c9a88".into(),
            comment_id: "t1_xyz".into(),
            media_item_id_ext: None,
            author: None,
            body: Some("x".repeat(250)),
            platform: Platform::Youtube,
            processing_status: 2,
            score: Some(Score::Number(3.0)),
            risk_level: Some(4),
            processing_category: None,
            processing_result: Some(1),
            relevance: Some(9),
            urgency: None,
            category: Some(0),
            subtype: Some(1),
            created_at_platform: Utc::now() - Duration::hours(3),
            fetched_at: Utc::now(),
            processed_at: None,
            url: None,
        }
    }

    #[test]
    fn truncate_marks_cut_text_only() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly10!", 10), "exactly10!");
        assert_eq!(truncate("0123456789abc", 10), "0123456789...");
        assert_eq!(truncate("Zürich café", 3), "Zür...");
    }

    #[test]
    fn relative_time_reads_in_both_directions() {
        let now = Utc::now();
        assert_eq!(relative_time(now - Duration::minutes(5), now), "5 minutes ago");
        assert_eq!(relative_time(now + Duration::hours(2), now), "in 2 hours");
        assert_eq!(relative_time(now - Duration::seconds(10), now), "less than a minute ago");
        assert_eq!(relative_time(now - Duration::days(1), now), "1 day ago");
        assert_eq!(relative_time(now - Duration::days(400), now), "1 year ago");
    }

    #[test]
    fn absolute_time_uses_given_zone() {
        let at = DateTime::parse_from_rfc3339("2024-08-20T10:30:00Z")
            .expect("timestamp")
            .with_timezone(&Utc);
        let tz = FixedOffset::east_opt(2 * 3_600).expect("offset");
        assert_eq!(format_timestamp_in(at, &tz), "2024-08-20 12:30:00");
    }

    #[test]
    fn comment_row_maps_codes_and_placeholders() {
        let row = CommentRow::from_record(&comment(), Utc::now());

        assert_eq!(row.id, "0f8e2c4a...");
        assert_eq!(row.body.chars().count(), BODY_PREVIEW + 3);
        assert_eq!(row.author, PLACEHOLDER);
        assert_eq!(row.media_item, PLACEHOLDER);
        assert_eq!(row.status, "Processed");
        assert_eq!(row.status_tone, "processed");
        assert_eq!(row.score, "3/5");
        assert_eq!(row.risk, "Crisis");
        assert_eq!(row.result, "Potential Lead");
        assert_eq!(row.relevance, PLACEHOLDER);
        assert_eq!(row.urgency, PLACEHOLDER);
        assert_eq!(row.platform_tone, "platform-youtube");
        assert_eq!(row.created, "3 hours ago");
    }

    #[test]
    fn media_item_row_without_score_or_risk() {
        let record = MediaItemRecord {
            id: "abcdefghijklmnop".into(),
            content_id: None,
            content_type: None,
            platform: Platform::Reddit,
            title: "Title".into(),
            body: None,
            author: Some(String::new()),
            score: None,
            risk_level: None,
            processing_status: 7,
            created_at_platform: Utc::now(),
            fetched_at: Utc::now(),
            url: None,
            comments: Vec::new(),
        };
        let row = MediaItemRow::from_record(&record, Utc::now());

        assert_eq!(row.id, "abcdefghij...");
        assert_eq!(row.body, "");
        assert_eq!(row.author, PLACEHOLDER);
        assert_eq!(row.score, PLACEHOLDER);
        assert_eq!(row.risk_tone, None);
        assert_eq!(row.status, PLACEHOLDER);
        assert_eq!(row.status_tone, "default");
    }

    #[test]
    fn post_row_resolves_assignee_names() {
        let directory = UserDirectory::demo();
        let posts = demo::demo_posts();
        let now = Utc::now();

        let assigned = posts
            .iter()
            .find(|post| post.assignee_id.is_some())
            .expect("assigned post");
        let row = PostRow::from_post(assigned, &directory, now);
        assert_eq!(
            Some(row.assignee.as_str()),
            assigned.assignee_id.as_ref().and_then(|id| directory.name_of(id))
        );

        let mut unassigned = assigned.clone();
        unassigned.id = PostId::from("x");
        unassigned.assignee_id = None;
        unassigned.status = Status::New;
        unassigned.label = None;
        let row = PostRow::from_post(&unassigned, &directory, now);
        assert_eq!(row.assignee, "Unassigned");
        assert_eq!(row.label, PLACEHOLDER);
        assert_eq!(row.label_tone, None);
        assert_eq!(row.status, "New");
    }
}
