use shared::protocol::{ProcessCommentsResponse, RunWorkersRequest, RunWorkersResponse};
use tracing::{info, warn};

use crate::{
    directory::parse_keywords,
    error::ApiClientError,
    notifications::{Notification, Notifier},
    ReviewApi,
};

pub const PROCESS_COMMENTS_BATCH: usize = 10;
pub const DEFAULT_WORKER_LIMIT: u32 = 5;
pub const ERROR_TITLE: &str = "Some error happened";
const REFRESH_HINT: &str = "Refresh page to see new data";

/// Inputs of the "Run Workers" dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerForm {
    pub reddit: bool,
    pub youtube: bool,
    pub keywords: String,
    pub limit: u32,
}

impl Default for WorkerForm {
    fn default() -> Self {
        Self {
            reddit: false,
            youtube: false,
            keywords: String::new(),
            limit: DEFAULT_WORKER_LIMIT,
        }
    }
}

impl WorkerForm {
    pub fn request(&self) -> RunWorkersRequest {
        RunWorkersRequest::new(
            self.reddit,
            self.youtube,
            parse_keywords(&self.keywords),
            self.limit,
        )
    }
}

/// Generic failure notice; the detail only goes to the log.
pub fn notify_failure(notifier: &Notifier, err: &ApiClientError) {
    warn!(error = %err, "review api call failed");
    notifier.notify(Notification::title_only(ERROR_TITLE));
}

pub async fn run_workers(
    api: &dyn ReviewApi,
    notifier: &Notifier,
    request: &RunWorkersRequest,
) -> Result<RunWorkersResponse, ApiClientError> {
    match api.run_workers(request).await {
        Ok(response) => {
            info!(job_id = %response.job_id, "ingestion job started");
            notifier.notify(Notification::new(
                format!("Job started: ID -{}", response.job_id),
                REFRESH_HINT,
            ));
            Ok(response)
        }
        Err(err) => {
            notify_failure(notifier, &err);
            Err(err)
        }
    }
}

pub async fn process_comments(
    api: &dyn ReviewApi,
    notifier: &Notifier,
) -> Result<ProcessCommentsResponse, ApiClientError> {
    match api.process_comments().await {
        Ok(response) => {
            notifier.notify(Notification::new(
                format!("{PROCESS_COMMENTS_BATCH} Comments processed"),
                REFRESH_HINT,
            ));
            Ok(response)
        }
        Err(err) => {
            notify_failure(notifier, &err);
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;
    use shared::{
        domain::Platform,
        error::{ApiError, ErrorCode},
        protocol::{CommentRecord, JobId, MediaItemRecord, PageRequest},
    };

    #[derive(Default)]
    struct FakeWorkers {
        fail: bool,
        started: Mutex<Vec<RunWorkersRequest>>,
    }

    impl FakeWorkers {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn outage(&self) -> ApiClientError {
            ApiClientError::Status {
                endpoint: "/api/worker".into(),
                status: 503,
                error: ApiError::new(ErrorCode::Internal, "down"),
            }
        }
    }

    #[async_trait]
    impl ReviewApi for FakeWorkers {
        async fn list_media_items(
            &self,
            _request: &PageRequest,
        ) -> Result<Vec<MediaItemRecord>, ApiClientError> {
            Ok(Vec::new())
        }

        async fn get_media_item(&self, _id: &str) -> Result<MediaItemRecord, ApiClientError> {
            Err(self.outage())
        }

        async fn list_comments(
            &self,
            _request: &PageRequest,
        ) -> Result<Vec<CommentRecord>, ApiClientError> {
            Ok(Vec::new())
        }

        async fn process_comments(&self) -> Result<ProcessCommentsResponse, ApiClientError> {
            if self.fail {
                return Err(self.outage());
            }
            Ok(ProcessCommentsResponse(json!({ "ok": true })))
        }

        async fn run_workers(
            &self,
            request: &RunWorkersRequest,
        ) -> Result<RunWorkersResponse, ApiClientError> {
            if self.fail {
                return Err(self.outage());
            }
            self.started.lock().expect("lock").push(request.clone());
            Ok(RunWorkersResponse {
                job_id: JobId::Number(42),
            })
        }
    }

    #[test]
    fn form_builds_request_from_keyword_text() {
        let form = WorkerForm {
            reddit: true,
            youtube: true,
            keywords: "relapse, therapy cost ,".into(),
            ..WorkerForm::default()
        };
        let request = form.request();
        assert_eq!(request.engines, vec![Platform::Youtube, Platform::Reddit]);
        assert_eq!(request.keywords, vec!["relapse", "therapy cost"]);
        assert_eq!(request.limit, DEFAULT_WORKER_LIMIT);
    }

    #[tokio::test]
    async fn run_workers_announces_job_id() {
        let api = FakeWorkers::default();
        let notifier = Notifier::new();
        let mut rx = notifier.subscribe();

        let request = RunWorkersRequest::new(true, false, vec!["panic".into()], 5);
        run_workers(&api, &notifier, &request).await.expect("started");

        assert_eq!(
            rx.try_recv().expect("notice"),
            Notification::new("Job started: ID -42", "Refresh page to see new data")
        );
        assert_eq!(api.started.lock().expect("lock").len(), 1);
    }

    #[tokio::test]
    async fn process_comments_reports_fixed_batch() {
        let api = FakeWorkers::default();
        let notifier = Notifier::new();
        let mut rx = notifier.subscribe();

        process_comments(&api, &notifier).await.expect("processed");

        assert_eq!(rx.try_recv().expect("notice").title, "10 Comments processed");
    }

    #[tokio::test]
    async fn failures_show_generic_notice() {
        let api = FakeWorkers::failing();
        let notifier = Notifier::new();
        let mut rx = notifier.subscribe();

        let request = RunWorkersRequest::new(false, true, vec!["x".into()], 5);
        assert!(run_workers(&api, &notifier, &request).await.is_err());
        assert!(process_comments(&api, &notifier).await.is_err());

        for _ in 0..2 {
            assert_eq!(
                rx.try_recv().expect("notice"),
                Notification::title_only(ERROR_TITLE)
            );
        }
    }
}
