//! Restartable cursor pager.

use std::time::Duration;

use super::{extract_cursor, Page, PageSource};
use crate::error::{ClientError, Result};

/// Where a [`Pager`] stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PagerState {
    /// Another fetch is permitted, starting at `cursor` (`None` before the
    /// first page).
    Active {
        /// Cursor for the next fetch.
        cursor: Option<String>,
    },
    /// No further requests will be issued. Terminal.
    Exhausted,
}

/// Lazily walks a paged listing one page per call.
///
/// The pager is bound to one [`PageSource`] whose filter is fixed; only the
/// cursor changes between calls. Advancing takes `&mut self`, so a pager
/// never has more than one request in flight. A failed fetch leaves the state
/// untouched and the same page can be requested again.
#[derive(Debug)]
pub struct Pager<S> {
    source: S,
    state: PagerState,
}

impl<S: PageSource> Pager<S> {
    /// Create a pager positioned before the first page.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Configuration`] if the source's filter already
    /// sets the cursor parameter.
    pub fn new(source: S) -> Result<Self> {
        if source.filter().contains(source.cursor_param()) {
            return Err(ClientError::Configuration(format!(
                "filter must not set the cursor parameter {:?}; \
                 pagination always starts at the first page",
                source.cursor_param()
            )));
        }

        Ok(Self {
            source,
            state: PagerState::Active { cursor: None },
        })
    }

    /// Whether another fetch is permitted.
    ///
    /// `true` does not promise a non-empty page: the server may answer the
    /// next fetch with zero items and no next link.
    #[must_use]
    pub fn has_next(&self) -> bool {
        matches!(self.state, PagerState::Active { .. })
    }

    /// Cursor the next fetch will use.
    #[must_use]
    pub fn cursor(&self) -> Option<&str> {
        match &self.state {
            PagerState::Active { cursor } => cursor.as_deref(),
            PagerState::Exhausted => None,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &PagerState {
        &self.state
    }

    /// The underlying page source.
    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch the next page, including its metadata.
    ///
    /// On success the cursor is taken from the page's next link; a missing
    /// link or cursor parameter exhausts the pager.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Exhausted`] if the pager is exhausted.
    /// - Transport and decode errors from the source. State is unchanged.
    /// - [`ClientError::MalformedLink`] if the next link cannot be parsed.
    ///   The pager is exhausted and the page is dropped.
    /// - [`ClientError::RepeatedCursor`] if the next link points back at the
    ///   cursor just used. The pager is exhausted and the page is dropped.
    pub async fn get_next_page(&mut self) -> Result<Page<S::Item>> {
        let PagerState::Active { cursor } = &self.state else {
            return Err(ClientError::Exhausted);
        };

        let current = cursor.clone();
        let page = self.source.fetch(current.as_deref()).await?;

        let next_cursor = match page.next_link.as_deref() {
            Some(link) => match extract_cursor(link, self.source.cursor_param()) {
                Ok(cursor) => cursor,
                Err(e) => {
                    self.state = PagerState::Exhausted;
                    return Err(e);
                }
            },
            None => None,
        };

        if let Some(next) = next_cursor
            .as_ref()
            .filter(|next| current.as_ref() == Some(*next))
        {
            let cursor = next.clone();
            self.state = PagerState::Exhausted;
            return Err(ClientError::RepeatedCursor { cursor });
        }

        tracing::debug!(
            items = page.items.len(),
            has_next = next_cursor.is_some(),
            "fetched page"
        );

        self.state = match next_cursor {
            Some(cursor) => PagerState::Active {
                cursor: Some(cursor),
            },
            None => PagerState::Exhausted,
        };

        Ok(page)
    }

    /// Fetch the next page and return its items.
    ///
    /// # Errors
    ///
    /// See [`Pager::get_next_page`].
    pub async fn get_next(&mut self) -> Result<Vec<S::Item>> {
        self.get_next_page().await.map(|page| page.items)
    }

    /// [`Pager::get_next`] bounded by a deadline.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Timeout`] if the fetch does not finish in
    /// time; the state is unchanged and the call can be retried. Otherwise
    /// see [`Pager::get_next_page`].
    pub async fn get_next_with_timeout(&mut self, deadline: Duration) -> Result<Vec<S::Item>> {
        match tokio::time::timeout(deadline, self.get_next()).await {
            Ok(result) => result,
            Err(_) => Err(ClientError::Timeout { after: deadline }),
        }
    }

    /// Fetch every remaining page and concatenate the items in page order.
    ///
    /// A server that keeps returning the cursor it was just given ends the
    /// walk with [`ClientError::RepeatedCursor`]. Longer cycles are not
    /// detected; bound the walk with [`Pager::get_next`] if that matters.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Exhausted`] if called on an exhausted pager,
    /// otherwise the first error from [`Pager::get_next`]. Items gathered so
    /// far are discarded and the pager stays where that call left it.
    pub async fn get_all(&mut self) -> Result<Vec<S::Item>> {
        if !self.has_next() {
            return Err(ClientError::Exhausted);
        }

        let mut items = Vec::new();
        while self.has_next() {
            items.extend(self.get_next().await?);
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::QueryParams;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Scripted source: replays queued results and records the cursors it saw.
    struct Scripted {
        filter: QueryParams,
        responses: Mutex<VecDeque<Result<Page<u32>>>>,
        cursors: Mutex<Vec<Option<String>>>,
    }

    impl Scripted {
        fn new(responses: Vec<Result<Page<u32>>>) -> Self {
            Self {
                filter: QueryParams::new().with("account_id", "acc"),
                responses: Mutex::new(responses.into()),
                cursors: Mutex::new(Vec::new()),
            }
        }

        fn seen(&self) -> Vec<Option<String>> {
            self.cursors.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageSource for Scripted {
        type Item = u32;

        fn cursor_param(&self) -> &str {
            "_start"
        }

        fn filter(&self) -> &QueryParams {
            &self.filter
        }

        async fn fetch(&self, cursor: Option<&str>) -> Result<Page<u32>> {
            self.cursors.lock().unwrap().push(cursor.map(str::to_string));
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected fetch")
        }
    }

    fn page(items: &[u32], next: Option<&str>) -> Result<Page<u32>> {
        let page = Page::new(items.to_vec());
        Ok(match next {
            Some(link) => page.with_next_link(link),
            None => page,
        })
    }

    fn server_error() -> Result<Page<u32>> {
        Err(ClientError::Api {
            status: 503,
            code: "unavailable".to_string(),
            message: "try later".to_string(),
        })
    }

    #[tokio::test]
    async fn two_page_walk() {
        let mut pager = Pager::new(Scripted::new(vec![
            page(&[1, 2, 3], Some("https://h/v4/usage?_start=abc")),
            page(&[4, 5], None),
        ]))
        .unwrap();

        assert!(pager.has_next());
        assert_eq!(pager.cursor(), None);

        assert_eq!(pager.get_next().await.unwrap(), vec![1, 2, 3]);
        assert_eq!(pager.cursor(), Some("abc"));
        assert!(pager.has_next());

        assert_eq!(pager.get_next().await.unwrap(), vec![4, 5]);
        assert!(!pager.has_next());
        assert_eq!(pager.state(), &PagerState::Exhausted);

        assert!(matches!(pager.get_next().await, Err(ClientError::Exhausted)));
        assert_eq!(
            pager.source().seen(),
            vec![None, Some("abc".to_string())]
        );
    }

    #[tokio::test]
    async fn get_all_flattens_in_page_order() {
        let mut pager = Pager::new(Scripted::new(vec![
            page(&[1, 2, 3], Some("/v4/usage?_start=abc")),
            page(&[4, 5], None),
        ]))
        .unwrap();

        assert_eq!(pager.get_all().await.unwrap(), vec![1, 2, 3, 4, 5]);
        assert!(!pager.has_next());
        assert!(matches!(pager.get_all().await, Err(ClientError::Exhausted)));
    }

    #[tokio::test]
    async fn get_all_over_many_pages() {
        let sizes = [4usize, 0, 7, 1, 3];
        let mut responses = Vec::new();
        let mut next_item = 0u32;
        for (i, size) in sizes.iter().enumerate() {
            let items: Vec<u32> = (next_item..next_item + *size as u32).collect();
            next_item += *size as u32;
            let link = (i + 1 < sizes.len()).then(|| format!("/v4/usage?_start=c{i}"));
            responses.push(page(&items, link.as_deref()));
        }

        let mut pager = Pager::new(Scripted::new(responses)).unwrap();
        let all = pager.get_all().await.unwrap();

        assert_eq!(all.len(), sizes.iter().sum::<usize>());
        assert_eq!(all, (0..next_item).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn cursor_threads_through_each_call() {
        let mut pager = Pager::new(Scripted::new(vec![
            page(&[1], Some("/u?_start=c1")),
            page(&[2], Some("/u?_start=c2&_limit=1")),
            page(&[3], Some("https://h/u?_limit=1&_start=c3")),
            page(&[], None),
        ]))
        .unwrap();

        while pager.has_next() {
            pager.get_next().await.unwrap();
        }

        assert_eq!(
            pager.source().seen(),
            vec![
                None,
                Some("c1".to_string()),
                Some("c2".to_string()),
                Some("c3".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn failure_keeps_cursor_for_retry() {
        let mut pager = Pager::new(Scripted::new(vec![
            page(&[1], Some("/u?_start=abc")),
            server_error(),
            Err(ClientError::Decode(
                serde_json::from_str::<u32>("x").unwrap_err(),
            )),
            page(&[2], None),
        ]))
        .unwrap();

        pager.get_next().await.unwrap();
        assert!(pager.get_next().await.unwrap_err().is_retryable());
        assert_eq!(pager.cursor(), Some("abc"));
        assert!(pager.has_next());

        assert!(matches!(pager.get_next().await, Err(ClientError::Decode(_))));
        assert_eq!(pager.cursor(), Some("abc"));

        assert_eq!(pager.get_next().await.unwrap(), vec![2]);
        assert_eq!(
            pager.source().seen(),
            vec![
                None,
                Some("abc".to_string()),
                Some("abc".to_string()),
                Some("abc".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn first_page_failure_stays_at_start() {
        let mut pager = Pager::new(Scripted::new(vec![server_error(), page(&[9], None)])).unwrap();

        assert!(pager.get_next().await.is_err());
        assert_eq!(pager.state(), &PagerState::Active { cursor: None });
        assert_eq!(pager.get_next().await.unwrap(), vec![9]);
        assert_eq!(pager.source().seen(), vec![None, None]);
    }

    #[tokio::test]
    async fn get_all_stops_at_first_error() {
        let mut pager = Pager::new(Scripted::new(vec![
            page(&[1, 2], Some("/u?_start=p2")),
            server_error(),
            page(&[3], None),
        ]))
        .unwrap();

        assert!(matches!(
            pager.get_all().await,
            Err(ClientError::Api { status: 503, .. })
        ));
        assert_eq!(pager.cursor(), Some("p2"));

        // Resuming picks up where the failed call left off.
        assert_eq!(pager.get_all().await.unwrap(), vec![3]);
    }

    #[tokio::test]
    async fn link_without_cursor_exhausts() {
        let mut pager = Pager::new(Scripted::new(vec![page(
            &[1],
            Some("https://h/v4/usage?_limit=10"),
        )]))
        .unwrap();

        assert_eq!(pager.get_next().await.unwrap(), vec![1]);
        assert!(!pager.has_next());
    }

    #[tokio::test]
    async fn malformed_link_is_surfaced() {
        let mut pager =
            Pager::new(Scripted::new(vec![page(&[1, 2], Some("not a url"))])).unwrap();

        match pager.get_next().await {
            Err(ClientError::MalformedLink { link, .. }) => assert_eq!(link, "not a url"),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(!pager.has_next());
        assert!(matches!(pager.get_next().await, Err(ClientError::Exhausted)));
    }

    #[tokio::test]
    async fn repeated_cursor_stops_the_walk() {
        let mut pager = Pager::new(Scripted::new(vec![
            page(&[1], Some("/u?_start=same")),
            page(&[2], Some("/u?_start=same")),
        ]))
        .unwrap();

        assert_eq!(pager.get_next().await.unwrap(), vec![1]);
        match pager.get_next().await {
            Err(ClientError::RepeatedCursor { cursor }) => assert_eq!(cursor, "same"),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(!pager.has_next());
        assert_eq!(pager.source().seen().len(), 2);
    }

    #[tokio::test]
    async fn get_all_terminates_on_looping_links() {
        let mut pager = Pager::new(Scripted::new(vec![
            page(&[1], Some("/u?_start=a")),
            page(&[2], Some("/u?_start=b")),
            page(&[3], Some("/u?_start=b")),
        ]))
        .unwrap();

        assert!(matches!(
            pager.get_all().await,
            Err(ClientError::RepeatedCursor { .. })
        ));
        assert!(!pager.has_next());
    }

    #[tokio::test]
    async fn empty_last_page() {
        let mut pager = Pager::new(Scripted::new(vec![page(&[], None)])).unwrap();
        assert!(pager.has_next());
        assert!(pager.get_next().await.unwrap().is_empty());
        assert!(!pager.has_next());
    }

    #[tokio::test]
    async fn exhaustion_is_monotonic() {
        let mut pager = Pager::new(Scripted::new(vec![page(&[1], None)])).unwrap();
        pager.get_next().await.unwrap();

        for _ in 0..3 {
            assert!(!pager.has_next());
            assert!(pager.get_next().await.is_err());
            assert!(pager.get_all().await.is_err());
            assert!(pager
                .get_next_with_timeout(Duration::from_secs(1))
                .await
                .is_err());
        }
        assert!(!pager.has_next());
        assert_eq!(pager.source().seen().len(), 1);
    }

    #[test]
    fn rejects_preseeded_cursor() {
        let mut source = Scripted::new(vec![]);
        source.filter.push("_start", "abc");

        match Pager::new(source) {
            Err(ClientError::Configuration(message)) => assert!(message.contains("_start")),
            other => panic!("unexpected: {:?}", other.map(|p| p.state().clone())),
        }
    }

    /// Source whose fetch never completes.
    struct Stalled {
        filter: QueryParams,
    }

    #[async_trait]
    impl PageSource for Stalled {
        type Item = u32;

        fn cursor_param(&self) -> &str {
            "_start"
        }

        fn filter(&self) -> &QueryParams {
            &self.filter
        }

        async fn fetch(&self, _cursor: Option<&str>) -> Result<Page<u32>> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_leaves_state_unchanged() {
        let mut pager = Pager::new(Stalled {
            filter: QueryParams::new(),
        })
        .unwrap();

        let result = pager.get_next_with_timeout(Duration::from_millis(250)).await;
        assert!(matches!(
            result,
            Err(ClientError::Timeout { after }) if after == Duration::from_millis(250)
        ));
        assert_eq!(pager.state(), &PagerState::Active { cursor: None });
    }
}
