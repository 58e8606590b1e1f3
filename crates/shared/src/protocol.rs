use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::Platform;

pub const MAX_WORKER_LIMIT: u32 = 50;
pub const MIN_WORKER_LIMIT: u32 = 1;

/// Timestamps from the ingestion workers. RFC 3339 is preferred; naive
/// timestamps are read as UTC.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{de::Error, Deserialize, Deserializer};

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
            .map(|naive| naive.and_utc())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp `{raw}`")))
    }

    pub mod option {
        use super::*;

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
        where
            D: Deserializer<'de>,
        {
            match Option::<String>::deserialize(deserializer)? {
                None => Ok(None),
                Some(raw) => parse(&raw)
                    .map(Some)
                    .ok_or_else(|| D::Error::custom(format!("invalid timestamp `{raw}`"))),
            }
        }
    }
}

/// Classifier score; some workers send it as a number, some as a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Score {
    Number(f64),
    Text(String),
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Score::Number(value) if value.fract() == 0.0 => write!(f, "{value:.0}"),
            Score::Number(value) => write!(f, "{value}"),
            Score::Text(value) => f.write_str(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentRecord {
    pub id: String,
    pub comment_id: String,
    #[serde(default)]
    pub media_item_id_ext: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    pub platform: Platform,
    pub processing_status: i64,
    #[serde(default, alias = "risk_score")]
    pub score: Option<Score>,
    #[serde(default)]
    pub risk_level: Option<i64>,
    #[serde(default)]
    pub processing_category: Option<i64>,
    #[serde(default)]
    pub processing_result: Option<i64>,
    #[serde(default)]
    pub relevance: Option<i64>,
    #[serde(default)]
    pub urgency: Option<i64>,
    #[serde(default)]
    pub category: Option<i64>,
    #[serde(default)]
    pub subtype: Option<i64>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at_platform: DateTime<Utc>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub fetched_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "timestamp::option::deserialize")]
    pub processed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub url: Option<String>,
}

/// An ingested post or video as served by `/api/media_item`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItemRecord {
    pub id: String,
    #[serde(default)]
    pub content_id: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    pub platform: Platform,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub score: Option<Score>,
    #[serde(default)]
    pub risk_level: Option<i64>,
    pub processing_status: i64,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at_platform: DateTime<Utc>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub fetched_at: DateTime<Utc>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub comments: Vec<CommentRecord>,
}

/// Query string of the paginated list endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    pub limit: u32,
    pub offset: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_item_uuid: Option<String>,
}

impl PageRequest {
    /// Request for 1-based `page`.
    pub fn for_page(page: u32, page_size: u32) -> Self {
        Self {
            limit: page_size,
            offset: u64::from(page.max(1) - 1) * u64::from(page_size),
            media_item_uuid: None,
        }
    }

    pub fn scoped_to(mut self, media_item_uuid: impl Into<String>) -> Self {
        self.media_item_uuid = Some(media_item_uuid.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunWorkersRequest {
    pub engines: Vec<Platform>,
    pub keywords: Vec<String>,
    pub limit: u32,
}

impl RunWorkersRequest {
    /// Engines go out YouTube first, then Reddit, whatever order they were
    /// selected in.
    pub fn new(reddit: bool, youtube: bool, keywords: Vec<String>, limit: u32) -> Self {
        let mut engines = Vec::with_capacity(2);
        if youtube {
            engines.push(Platform::Youtube);
        }
        if reddit {
            engines.push(Platform::Reddit);
        }
        Self {
            engines,
            keywords,
            limit,
        }
    }

    pub fn limit_in_range(&self) -> bool {
        (MIN_WORKER_LIMIT..=MAX_WORKER_LIMIT).contains(&self.limit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobId {
    Number(i64),
    Text(String),
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobId::Number(value) => write!(f, "{value}"),
            JobId::Text(value) => f.write_str(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunWorkersResponse {
    pub job_id: JobId,
}

/// Whatever `/api/worker/process-comments` answered with; the body has no
/// fixed schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessCommentsResponse(pub Value);
