//! Paginated, rate-paced URL collection on top of [`PhotoSearch`].
//!
//! Everything here runs strictly one request at a time: classes in input
//! order, and pages of a class in increasing order starting at 1. The remote
//! enforces a request quota, so the only waits are the fixed retry delay and
//! the pause between pages. Both can be cut short by a [`CancellationToken`].
//!
//! [`PhotoSearch`]: crate::flickr::PhotoSearch
//! [`CancellationToken`]: tokio_util::sync::CancellationToken

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::{config::FetchOptions, flickr::PhotoSearch};

pub mod assembler;
pub mod orchestrator;
pub mod page;
pub mod retry;

pub use assembler::{Cancelled, CollectionAssembler, FetchOutcome};
pub use orchestrator::{ClassRequest, ClassUrlMap, FetchOrchestrator, FetchReport};
pub use page::{MAX_PER_PAGE, PageError, PageFetcher, Query};
pub use retry::{RetryError, RetryPolicy};

pub fn orchestrator<S: PhotoSearch>(
    search: S,
    options: &FetchOptions,
    cancel: CancellationToken,
) -> FetchOrchestrator<S> {
    let retry = RetryPolicy::new(
        options.max_attempts,
        Duration::from_millis(options.retry_delay_ms),
    );
    let pages = PageFetcher::new(search, retry);
    let assembler = CollectionAssembler::new(pages, Duration::from_millis(options.page_delay_ms));

    FetchOrchestrator::new(assembler, cancel)
}
