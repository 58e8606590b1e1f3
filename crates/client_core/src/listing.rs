//! Paginated list state shared by the queue, comments and media-item
//! screens.
//!
//! A view owns one fetched page, the free-text filter applied to it, and the
//! page cursor. Each fetch is issued under a generation ticket; when a
//! response arrives for anything but the newest ticket it is dropped.

use async_trait::async_trait;
use shared::{
    domain::Post,
    protocol::{CommentRecord, MediaItemRecord, PageRequest},
};
use tracing::{debug, warn};

use crate::error::ApiClientError;

/// Client-side match against an already lowercased needle.
pub trait Searchable {
    fn matches_search(&self, needle: &str) -> bool;
}

fn contains(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|text| text.to_lowercase().contains(needle))
}

impl Searchable for MediaItemRecord {
    fn matches_search(&self, needle: &str) -> bool {
        contains(Some(&self.title), needle) || contains(self.body.as_deref(), needle)
    }
}

impl Searchable for CommentRecord {
    fn matches_search(&self, needle: &str) -> bool {
        contains(self.body.as_deref(), needle)
            || contains(self.author.as_deref(), needle)
            || contains(Some(&self.comment_id), needle)
    }
}

impl Searchable for Post {
    fn matches_search(&self, needle: &str) -> bool {
        contains(Some(&self.text), needle)
            || contains(Some(&self.author), needle)
            || contains(self.source.locator(), needle)
    }
}

#[async_trait]
pub trait PageFetcher<T>: Send + Sync {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Vec<T>, ApiClientError>;
}

/// 1-based page cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    page: u32,
    page_size: u32,
    last_page_len: Option<usize>,
}

impl Pager {
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            last_page_len: None,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn request(&self) -> PageRequest {
        PageRequest::for_page(self.page, self.page_size)
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// A short (or not yet fetched) page means there is nothing after it.
    pub fn has_next(&self) -> bool {
        self.last_page_len
            .is_some_and(|len| len >= self.page_size as usize)
    }

    pub fn record_page_len(&mut self, len: usize) {
        self.last_page_len = Some(len);
    }

    pub fn next(&mut self) -> bool {
        if !self.has_next() {
            return false;
        }
        self.page += 1;
        true
    }

    pub fn previous(&mut self) -> bool {
        if !self.has_previous() {
            return false;
        }
        self.page -= 1;
        true
    }

    pub fn go_to(&mut self, page: u32) -> bool {
        let page = page.max(1);
        if page == self.page {
            return false;
        }
        self.page = page;
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    pub request: PageRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    /// A newer fetch was started after this one; the response was dropped.
    Stale,
    Failed,
}

pub struct ListView<T> {
    pager: Pager,
    scope: Option<String>,
    records: Vec<T>,
    search: String,
    loading: bool,
    generation: u64,
    last_error: Option<String>,
}

impl<T: Searchable> ListView<T> {
    pub fn new(page_size: u32) -> Self {
        Self {
            pager: Pager::new(page_size),
            scope: None,
            records: Vec::new(),
            search: String::new(),
            loading: false,
            generation: 0,
            last_error: None,
        }
    }

    /// View limited to the children of one media item.
    pub fn scoped(page_size: u32, media_item_uuid: impl Into<String>) -> Self {
        let mut view = Self::new(page_size);
        view.scope = Some(media_item_uuid.into());
        view
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search = text.into();
    }

    /// Rows of the current page that pass the free-text filter.
    pub fn visible(&self) -> Vec<&T> {
        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return self.records.iter().collect();
        }
        self.records
            .iter()
            .filter(|record| record.matches_search(&needle))
            .collect()
    }

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        self.loading = true;
        let mut request = self.pager.request();
        request.media_item_uuid = self.scope.clone();
        debug!(
            generation = self.generation,
            limit = request.limit,
            offset = request.offset,
            "list fetch started"
        );
        FetchTicket {
            generation: self.generation,
            request,
        }
    }

    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<T>, ApiClientError>,
    ) -> FetchOutcome {
        if ticket.generation != self.generation {
            warn!(
                stale = ticket.generation,
                current = self.generation,
                "dropping stale list response"
            );
            return FetchOutcome::Stale;
        }

        self.loading = false;
        match result {
            Ok(records) => {
                self.pager.record_page_len(records.len());
                self.records = records;
                self.last_error = None;
                FetchOutcome::Applied
            }
            Err(err) => {
                warn!(error = %err, "list fetch failed");
                self.last_error = Some(err.to_string());
                FetchOutcome::Failed
            }
        }
    }

    pub async fn load(&mut self, fetcher: &dyn PageFetcher<T>) -> FetchOutcome {
        let ticket = self.begin_fetch();
        let result = fetcher.fetch_page(&ticket.request).await;
        self.complete_fetch(ticket, result)
    }

    /// Moves to `page` and fetches it. Refetches when `page` is already the
    /// current one.
    pub async fn load_page(&mut self, fetcher: &dyn PageFetcher<T>, page: u32) -> FetchOutcome {
        let ticket = self
            .go_to_page(page)
            .unwrap_or_else(|| self.begin_fetch());
        let result = fetcher.fetch_page(&ticket.request).await;
        self.complete_fetch(ticket, result)
    }

    /// Advances the cursor and starts a fetch for the new page, or returns
    /// `None` when already on the last page.
    pub fn next_page(&mut self) -> Option<FetchTicket> {
        self.pager.next().then(|| self.begin_fetch())
    }

    pub fn previous_page(&mut self) -> Option<FetchTicket> {
        self.pager.previous().then(|| self.begin_fetch())
    }

    pub fn go_to_page(&mut self, page: u32) -> Option<FetchTicket> {
        self.pager.go_to(page).then(|| self.begin_fetch())
    }
}

#[cfg(test)]
#[path = "tests/listing_tests.rs"]
mod tests;
