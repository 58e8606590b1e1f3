use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
    Client, RequestBuilder,
};
use serde::de::DeserializeOwned;
use shared::{
    error::{ApiError, ErrorCode},
    protocol::{
        CommentRecord, MediaItemRecord, PageRequest, ProcessCommentsResponse, RunWorkersRequest,
        RunWorkersResponse, MAX_WORKER_LIMIT, MIN_WORKER_LIMIT,
    },
};
use tracing::{info, warn};
use url::Url;

pub mod actions;
pub mod audit_trail;
pub mod config;
pub mod demo;
pub mod directory;
pub mod error;
pub mod listing;
pub mod notifications;
pub mod store;
pub mod views;
pub mod workers;

pub use error::ApiClientError;
pub use listing::{FetchOutcome, ListView, PageFetcher, Pager};
pub use notifications::{Notification, Notifier};
pub use store::{MutationMode, PostStore, Session};

const TUNNEL_BYPASS_HEADER: &str = "ngrok-skip-browser-warning";
const MEDIA_ITEMS_PATH: &str = "/api/media_item";
const COMMENTS_PATH: &str = "/api/comments";
const PROCESS_COMMENTS_PATH: &str = "/api/worker/process-comments";
const RUN_WORKERS_PATH: &str = "/api/worker/run-workers";
const ERROR_BODY_PREVIEW: usize = 200;

/// Read side of the review backend plus the two worker triggers.
#[async_trait]
pub trait ReviewApi: Send + Sync {
    async fn list_media_items(
        &self,
        request: &PageRequest,
    ) -> Result<Vec<MediaItemRecord>, ApiClientError>;
    async fn get_media_item(&self, id: &str) -> Result<MediaItemRecord, ApiClientError>;
    async fn list_comments(
        &self,
        request: &PageRequest,
    ) -> Result<Vec<CommentRecord>, ApiClientError>;
    async fn process_comments(&self) -> Result<ProcessCommentsResponse, ApiClientError>;
    async fn run_workers(
        &self,
        request: &RunWorkersRequest,
    ) -> Result<RunWorkersResponse, ApiClientError>;
}

#[async_trait]
impl<A: ReviewApi> PageFetcher<MediaItemRecord> for A {
    async fn fetch_page(
        &self,
        request: &PageRequest,
    ) -> Result<Vec<MediaItemRecord>, ApiClientError> {
        self.list_media_items(request).await
    }
}

#[async_trait]
impl<A: ReviewApi> PageFetcher<CommentRecord> for A {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Vec<CommentRecord>, ApiClientError> {
        self.list_comments(request).await
    }
}

/// One media item together with a page of its own comments.
pub struct MediaItemPage {
    pub item: MediaItemRecord,
    pub comments: ListView<CommentRecord>,
}

impl MediaItemPage {
    /// Fetches the item, then the requested page of comments scoped to it.
    /// A failed comments fetch leaves the item in place and shows up in
    /// `comments.last_error()`.
    pub async fn open<A: ReviewApi>(
        api: &A,
        id: &str,
        page_size: u32,
        page: u32,
    ) -> Result<Self, ApiClientError> {
        let item = api.get_media_item(id).await?;
        let mut comments = ListView::scoped(page_size, id);
        comments.load_page(api, page).await;
        Ok(Self { item, comments })
    }
}

pub struct HttpReviewApi {
    http: Client,
    base_url: String,
    tunnel_bypass: bool,
}

impl HttpReviewApi {
    pub fn new(base_url: &str) -> Result<Self, ApiClientError> {
        Self::with_options(base_url, Duration::from_secs(30), true)
    }

    pub fn from_settings(settings: &config::Settings) -> Result<Self, ApiClientError> {
        Self::with_options(
            &settings.api_base_url,
            settings.request_timeout(),
            settings.tunnel_bypass_header,
        )
    }

    pub fn with_options(
        base_url: &str,
        timeout: Duration,
        tunnel_bypass: bool,
    ) -> Result<Self, ApiClientError> {
        let base_url = config::normalize_base_url(base_url);
        Url::parse(&base_url)?;
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| ApiClientError::Transport {
                endpoint: base_url.clone(),
                source,
            })?;
        Ok(Self {
            http,
            base_url,
            tunnel_bypass,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiClientError> {
        Ok(Url::parse(&format!("{}{path}", self.base_url))?)
    }

    fn decorate(&self, builder: RequestBuilder) -> RequestBuilder {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if self.tunnel_bypass {
            headers.insert(TUNNEL_BYPASS_HEADER, HeaderValue::from_static("true"));
        }
        builder.headers(headers)
    }

    /// Sends the request and decodes the body as `T`. A body that does not
    /// match `T` is reported as a schema error rather than partially used.
    async fn send_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        builder: RequestBuilder,
    ) -> Result<T, ApiClientError> {
        let transport = |source: reqwest::Error| ApiClientError::Transport {
            endpoint: endpoint.to_string(),
            source,
        };
        let res = self.decorate(builder).send().await.map_err(transport)?;
        let status = res.status();
        let body = res.bytes().await.map_err(transport)?;

        if !status.is_success() {
            let error = ApiError::new(
                ErrorCode::from_status(status.as_u16()),
                error_message(&body),
            );
            warn!(endpoint, status = status.as_u16(), error = %error.message, "review api error");
            return Err(ApiClientError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                error,
            });
        }

        serde_json::from_slice(&body).map_err(|source| {
            warn!(endpoint, error = %source, "review api response failed schema check");
            ApiClientError::Schema {
                endpoint: endpoint.to_string(),
                source,
            }
        })
    }
}

/// Pulls a human-readable message out of an error body: `detail` or
/// `message` when it is JSON, otherwise the start of the raw text.
fn error_message(body: &[u8]) -> String {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_slice(body) {
        for key in ["detail", "message", "error"] {
            if let Some(serde_json::Value::String(message)) = map.get(key) {
                return message.clone();
            }
        }
    }
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        return "empty response body".to_string();
    }
    text.chars().take(ERROR_BODY_PREVIEW).collect()
}

#[async_trait]
impl ReviewApi for HttpReviewApi {
    async fn list_media_items(
        &self,
        request: &PageRequest,
    ) -> Result<Vec<MediaItemRecord>, ApiClientError> {
        info!(limit = request.limit, offset = request.offset, "fetching media items");
        let url = self.endpoint(MEDIA_ITEMS_PATH)?;
        self.send_json(MEDIA_ITEMS_PATH, self.http.get(url).query(request))
            .await
    }

    async fn get_media_item(&self, id: &str) -> Result<MediaItemRecord, ApiClientError> {
        info!(media_item = id, "fetching media item");
        let mut url = self.endpoint(MEDIA_ITEMS_PATH)?;
        url.path_segments_mut()
            .map_err(|()| ApiClientError::Validation("api base url cannot carry a path".into()))?
            .push(id);
        self.send_json(MEDIA_ITEMS_PATH, self.http.get(url)).await
    }

    async fn list_comments(
        &self,
        request: &PageRequest,
    ) -> Result<Vec<CommentRecord>, ApiClientError> {
        info!(
            limit = request.limit,
            offset = request.offset,
            media_item = request.media_item_uuid.as_deref().unwrap_or("-"),
            "fetching comments"
        );
        let url = self.endpoint(COMMENTS_PATH)?;
        self.send_json(COMMENTS_PATH, self.http.get(url).query(request))
            .await
    }

    async fn process_comments(&self) -> Result<ProcessCommentsResponse, ApiClientError> {
        info!("triggering comment processing");
        let url = self.endpoint(PROCESS_COMMENTS_PATH)?;
        self.send_json(PROCESS_COMMENTS_PATH, self.http.get(url))
            .await
    }

    async fn run_workers(
        &self,
        request: &RunWorkersRequest,
    ) -> Result<RunWorkersResponse, ApiClientError> {
        if !request.limit_in_range() {
            return Err(ApiClientError::Validation(format!(
                "limit must be between {MIN_WORKER_LIMIT} and {MAX_WORKER_LIMIT}, got {}",
                request.limit
            )));
        }
        info!(
            engines = ?request.engines,
            keywords = ?request.keywords,
            limit = request.limit,
            "starting ingestion workers"
        );
        let url = self.endpoint(RUN_WORKERS_PATH)?;
        self.send_json(RUN_WORKERS_PATH, self.http.post(url).json(request))
            .await
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
