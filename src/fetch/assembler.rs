use std::time::Duration;

use serde::{Serialize, Serializer};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use super::{
    page::{PageError, PageFetcher, Query},
    retry::pause,
};
use crate::flickr::PhotoSearch;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Urls(Vec<Option<String>>),
    Unavailable,
}

impl FetchOutcome {
    pub fn len(&self) -> usize {
        match self {
            FetchOutcome::Urls(urls) => urls.len(),
            FetchOutcome::Unavailable => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, FetchOutcome::Unavailable)
    }

    pub fn urls(&self) -> Option<&[Option<String>]> {
        match self {
            FetchOutcome::Urls(urls) => Some(urls.as_slice()),
            FetchOutcome::Unavailable => None,
        }
    }
}

// An unavailable class is written as `null`.
impl Serialize for FetchOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.urls().serialize(serializer)
    }
}

/// Collection stopped by cancellation. `partial` holds what was gathered,
/// truncated to the target, or `None` if the first page was never read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cancelled {
    pub partial: Option<FetchOutcome>,
}

pub struct CollectionAssembler<S> {
    pages: PageFetcher<S>,
    page_delay: Duration,
}

impl<S: PhotoSearch> CollectionAssembler<S> {
    pub fn new(pages: PageFetcher<S>, page_delay: Duration) -> Self {
        Self { pages, page_delay }
    }

    pub fn pages(&self) -> &PageFetcher<S> {
        &self.pages
    }

    /// The first page's `pages * perpage` caps the target. A later page that
    /// fails only loses its own items.
    pub async fn collect(
        &self,
        tags: &[String],
        requested: u32,
        cancel: &CancellationToken,
    ) -> Result<FetchOutcome, Cancelled> {
        if requested == 0 {
            return Ok(FetchOutcome::Urls(Vec::new()));
        }

        let query = Query::new(tags.to_vec(), requested);

        let first = match self.pages.fetch_page(&query, 1, cancel).await {
            Ok(page) => page,
            Err(PageError::Cancelled) => return Err(Cancelled { partial: None }),
            Err(err) => {
                error!(tags = ?tags, error = %err, "invalid API response");
                return Ok(FetchOutcome::Unavailable);
            }
        };

        let available = first.estimated_available();
        if available < u64::from(requested) {
            warn!(
                tags = ?tags,
                available,
                requested,
                "not enough resources available, fetching {available} url(s)"
            );
        }

        // Lossless: bounded by `requested`.
        let target = available.min(u64::from(requested)) as usize;
        let pages_needed = pages_needed(target, query.per_page, first.per_page);

        let mut urls = first.urls();

        for page in 2..=pages_needed {
            debug!(page, pages_needed, delay = ?self.page_delay, "pacing before next page");
            if !pause(self.page_delay, cancel).await {
                urls.truncate(target);
                return Err(Cancelled {
                    partial: Some(FetchOutcome::Urls(urls)),
                });
            }

            match self.pages.fetch_page(&query, page, cancel).await {
                Ok(result) => urls.extend(result.urls()),
                Err(PageError::Cancelled) => {
                    urls.truncate(target);
                    return Err(Cancelled {
                        partial: Some(FetchOutcome::Urls(urls)),
                    });
                }
                Err(err) => warn!(tags = ?tags, page, error = %err, "skipping page"),
            }
        }

        urls.truncate(target);

        Ok(FetchOutcome::Urls(urls))
    }
}

/// Pages to request for `target` items. Counts against the smaller of the
/// asked-for page size and what the first page reported, in case the remote
/// serves fewer per page than asked.
fn pages_needed(target: usize, per_page: u32, reported_per_page: u64) -> u32 {
    let honoured = match reported_per_page {
        0 => u64::from(per_page),
        reported => reported.min(u64::from(per_page)),
    };

    if honoured == 0 {
        return 1;
    }

    let pages = (target as u64).div_ceil(honoured).max(1);

    u32::try_from(pages).unwrap_or(u32::MAX)
}
