use thiserror::Error;
use tokio_util::sync::CancellationToken;

use super::retry::{RetryError, RetryPolicy};
use crate::flickr::{self, ParseError, PhotoSearch, ResultPage};

/// Flickr refuses to serve more than this many results per page.
pub const MAX_PER_PAGE: u32 = 500;

#[derive(Debug, Error)]
pub enum PageError {
    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: flickr::Error },

    #[error("request rejected: {0}")]
    Rejected(flickr::Error),

    #[error("malformed response: {0}")]
    Malformed(#[from] ParseError),

    #[error("cancelled")]
    Cancelled,
}

impl From<RetryError<flickr::Error>> for PageError {
    fn from(err: RetryError<flickr::Error>) -> Self {
        match err {
            RetryError::Exhausted { attempts, last } => PageError::Exhausted { attempts, last },
            RetryError::Rejected(err) => PageError::Rejected(err),
            RetryError::Cancelled => PageError::Cancelled,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub tags: Vec<String>,
    pub per_page: u32,
}

impl Query {
    pub fn new(tags: Vec<String>, requested: u32) -> Self {
        Self {
            tags,
            per_page: requested.min(MAX_PER_PAGE),
        }
    }
}

pub struct PageFetcher<S> {
    search: S,
    retry: RetryPolicy,
}

impl<S: PhotoSearch> PageFetcher<S> {
    pub fn new(search: S, retry: RetryPolicy) -> Self {
        Self { search, retry }
    }

    pub fn search(&self) -> &S {
        &self.search
    }

    // A response that arrives but can't be parsed is not retried.
    pub async fn fetch_page(
        &self,
        query: &Query,
        page: u32,
        cancel: &CancellationToken,
    ) -> Result<ResultPage, PageError> {
        let raw = self
            .retry
            .run(cancel, flickr::Error::is_transient, move |_| {
                self.search.search(&query.tags, query.per_page, page)
            })
            .await?;

        Ok(ResultPage::parse(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use reqwest::StatusCode;
    use serde_json::{Value, json};

    use super::*;

    /// Fails `failures` times with a 503, then answers `body`.
    struct Flaky {
        failures: Mutex<u32>,
        calls: Mutex<Vec<(u32, u32)>>,
        body: Value,
    }

    impl Flaky {
        fn new(failures: u32, body: Value) -> Self {
            Self {
                failures: Mutex::new(failures),
                calls: Mutex::new(Vec::new()),
                body,
            }
        }

        fn calls(&self) -> Vec<(u32, u32)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PhotoSearch for Flaky {
        async fn search(&self, _tags: &[String], per_page: u32, page: u32) -> flickr::Result<Value> {
            self.calls.lock().unwrap().push((per_page, page));

            let mut failures = self.failures.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                return Err(flickr::Error::Status(StatusCode::SERVICE_UNAVAILABLE));
            }

            Ok(self.body.clone())
        }
    }

    fn body() -> Value {
        json!({"photos": {"pages": 1, "perpage": 1, "photo": [
            {"farm": 5, "id": "1", "secret": "a", "server": "10"}
        ]}})
    }

    #[test]
    fn page_size_is_capped() {
        assert_eq!(Query::new(vec!["dog".into()], 2).per_page, 2);
        assert_eq!(Query::new(vec!["dog".into()], 500).per_page, 500);
        assert_eq!(Query::new(vec!["dog".into()], 1200).per_page, 500);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_until_the_search_answers() {
        let fetcher = PageFetcher::new(Flaky::new(2, body()), RetryPolicy::default());
        let query = Query::new(vec!["dog".into()], 10);

        let page = fetcher
            .fetch_page(&query, 1, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(fetcher.search().calls(), vec![(10, 1); 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_retries_surface_as_error() {
        let fetcher = PageFetcher::new(Flaky::new(u32::MAX, body()), RetryPolicy::default());
        let query = Query::new(vec!["dog".into()], 10);

        let err = fetcher
            .fetch_page(&query, 1, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, PageError::Exhausted { attempts: 5, .. }));
        assert_eq!(fetcher.search().calls().len(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_body_is_not_retried() {
        let body = json!({"photos": {"perpage": 1, "photo": []}});
        let fetcher = PageFetcher::new(Flaky::new(0, body), RetryPolicy::default());
        let query = Query::new(vec!["dog".into()], 10);

        let err = fetcher
            .fetch_page(&query, 1, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, PageError::Malformed(ParseError("photos.pages"))));
        assert_eq!(fetcher.search().calls().len(), 1);
    }
}
