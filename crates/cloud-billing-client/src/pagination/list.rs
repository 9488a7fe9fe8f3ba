//! Single-page invoker for paged list endpoints.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use super::{Page, PageSource};
use crate::decode::DecodeFn;
use crate::error::Result;
use crate::executor::RequestExecutor;
use crate::request::{ApiRequest, QueryParams};

/// Wraps one paged list endpoint: a fixed GET path, fixed filter parameters,
/// the name of the cursor parameter, and a decode function for the item type.
///
/// Each [`fetch`](PageSource::fetch) performs exactly one request. Errors
/// from the executor and the decoder are passed through untouched.
pub struct PagedList<T> {
    executor: Arc<dyn RequestExecutor>,
    segments: Vec<String>,
    headers: Vec<(String, String)>,
    filter: QueryParams,
    cursor_param: String,
    decode: DecodeFn<T>,
}

impl<T> PagedList<T> {
    /// Create an invoker for the endpoint at `segments`.
    pub fn new<I, S>(
        executor: Arc<dyn RequestExecutor>,
        segments: I,
        filter: QueryParams,
        cursor_param: impl Into<String>,
        decode: DecodeFn<T>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            executor,
            segments: segments.into_iter().map(Into::into).collect(),
            headers: Vec::new(),
            filter,
            cursor_param: cursor_param.into(),
            decode,
        }
    }

    /// Headers sent with every page request.
    #[must_use]
    pub fn with_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = headers;
        self
    }

    /// The request for the page starting at `cursor`.
    fn request(&self, cursor: Option<&str>) -> ApiRequest {
        let mut query = self.filter.clone();
        if let Some(cursor) = cursor {
            query.push(self.cursor_param.as_str(), cursor);
        }

        ApiRequest::get(self.segments.iter().cloned())
            .with_headers(&self.headers)
            .with_query(query)
    }
}

impl<T> fmt::Debug for PagedList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PagedList")
            .field("path", &format!("/{}", self.segments.join("/")))
            .field("filter", &self.filter)
            .field("cursor_param", &self.cursor_param)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<T: Send + 'static> PageSource for PagedList<T> {
    type Item = T;

    fn cursor_param(&self) -> &str {
        &self.cursor_param
    }

    fn filter(&self) -> &QueryParams {
        &self.filter
    }

    async fn fetch(&self, cursor: Option<&str>) -> Result<Page<T>> {
        let request = self.request(cursor);
        let body = self.executor.execute(request).await?.into_success()?;
        (self.decode)(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode_page;
    use crate::pagination::Pager;
    use crate::error::ClientError;
    use crate::request::RawResponse;
    use cloud_billing_core::{InstanceUsage, InstancesUsage};
    use std::sync::Mutex;

    /// Records requests and replays a fixed response.
    struct Recording {
        response: RawResponse,
        requests: Mutex<Vec<ApiRequest>>,
    }

    #[async_trait]
    impl RequestExecutor for Recording {
        async fn execute(&self, request: ApiRequest) -> Result<RawResponse> {
            self.requests.lock().unwrap().push(request);
            Ok(self.response.clone())
        }
    }

    fn list(executor: Arc<Recording>) -> PagedList<InstanceUsage> {
        PagedList::new(
            executor,
            ["v4", "accounts", "acc", "resource_instances", "usage", "2024-01"],
            QueryParams::new().with("_limit", 2).with("region", "us-south"),
            "_start",
            decode_page::<InstancesUsage, InstanceUsage>,
        )
        .with_headers(vec![("Accept-Language".to_string(), "de".to_string())])
    }

    fn recording(status: u16, body: &str) -> Arc<Recording> {
        Arc::new(Recording {
            response: RawResponse {
                status,
                body: body.as_bytes().to_vec(),
            },
            requests: Mutex::new(Vec::new()),
        })
    }

    #[tokio::test]
    async fn first_page_has_no_cursor() {
        let executor = recording(200, r#"{"limit":2,"count":0,"resources":[]}"#);
        let page = list(executor.clone()).fetch(None).await.unwrap();
        assert!(page.items.is_empty());

        let requests = executor.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.method, reqwest::Method::GET);
        assert_eq!(
            request.path(),
            "/v4/accounts/acc/resource_instances/usage/2024-01"
        );
        assert!(!request.query.contains("_start"));
        assert_eq!(request.query.get("region"), Some("us-south"));
        assert_eq!(
            request.headers,
            vec![("Accept-Language".to_string(), "de".to_string())]
        );
    }

    #[tokio::test]
    async fn cursor_is_appended_to_filter() {
        let executor = recording(200, r#"{"resources":[]}"#);
        list(executor.clone()).fetch(Some("abc")).await.unwrap();

        let requests = executor.requests.lock().unwrap();
        let query = &requests[0].query;
        assert_eq!(query.get("_start"), Some("abc"));
        assert_eq!(query.get("_limit"), Some("2"));
    }

    #[tokio::test]
    async fn non_success_status_is_api_error() {
        let executor = recording(403, r#"{"errors":[{"code":"forbidden","message":"no"}]}"#);
        let result = list(executor).fetch(None).await;
        assert!(matches!(
            result,
            Err(ClientError::Api { status: 403, .. })
        ));
    }

    #[tokio::test]
    async fn bad_body_is_decode_error() {
        for body in ["[]", "[null, null, null, null, []]", "{\"resources\": 42}"] {
            let result = list(recording(200, body)).fetch(None).await;
            assert!(
                matches!(result, Err(ClientError::Decode(_))),
                "expected {body} to be rejected"
            );
        }
    }

    #[tokio::test]
    async fn array_body_does_not_end_pagination() {
        let mut pager = Pager::new(list(recording(200, "[]"))).unwrap();

        assert!(matches!(pager.get_next().await, Err(ClientError::Decode(_))));
        assert!(pager.has_next());
        assert_eq!(pager.cursor(), None);
    }
}
