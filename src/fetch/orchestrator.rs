use serde::{Deserialize, Serialize, Serializer, ser::SerializeMap};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::assembler::{Cancelled, CollectionAssembler, FetchOutcome};
use crate::flickr::PhotoSearch;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRequest {
    pub name: String,
    pub count: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl ClassRequest {
    pub fn new<T: Into<String>>(name: T, count: i64) -> Self {
        Self {
            name: name.into(),
            count,
            tags: None,
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    pub fn query_tags(&self) -> Vec<String> {
        match &self.tags {
            Some(tags) if !tags.is_empty() => tags.clone(),
            _ => vec![self.name.clone()],
        }
    }

    /// Negative counts ask for nothing.
    pub fn requested(&self) -> u32 {
        u32::try_from(self.count.max(0)).unwrap_or(u32::MAX)
    }
}

/// Class name to outcome, in the order classes were first requested.
/// Inserting a name that is already present replaces its outcome in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassUrlMap {
    entries: Vec<(String, FetchOutcome)>,
}

impl ClassUrlMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: String, outcome: FetchOutcome) {
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = outcome,
            None => self.entries.push((name, outcome)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FetchOutcome> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, outcome)| outcome)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }
}

impl Serialize for ClassUrlMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, outcome) in &self.entries {
            map.serialize_entry(name, outcome)?;
        }
        map.end()
    }
}

/// With `cancelled` set, `urls` holds the finished classes plus the partial one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchReport {
    pub urls: ClassUrlMap,
    pub cancelled: bool,
}

pub struct FetchOrchestrator<S> {
    assembler: CollectionAssembler<S>,
    cancel: CancellationToken,
}

impl<S: PhotoSearch> FetchOrchestrator<S> {
    pub fn new(assembler: CollectionAssembler<S>, cancel: CancellationToken) -> Self {
        Self { assembler, cancel }
    }

    pub fn assembler(&self) -> &CollectionAssembler<S> {
        &self.assembler
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub async fn fetch_all(&self, requests: &[ClassRequest]) -> FetchReport {
        let mut report = FetchReport::default();

        for request in requests {
            if self.cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }

            let requested = request.requested();
            let outcome = self
                .assembler
                .collect(&request.query_tags(), requested, &self.cancel)
                .await;

            match outcome {
                Ok(outcome) => {
                    if outcome.is_unavailable() {
                        error!(class = %request.name, requested, "no urls available for class");
                    } else {
                        info!(
                            class = %request.name,
                            fetched = outcome.len(),
                            requested,
                            "fetched {} urls for the {} class",
                            outcome.len(),
                            request.name
                        );
                    }
                    report.urls.insert(request.name.clone(), outcome);
                }
                Err(Cancelled { partial }) => {
                    warn!(
                        class = %request.name,
                        fetched = partial.as_ref().map_or(0, FetchOutcome::len),
                        requested,
                        "stopped by user"
                    );
                    // Nothing was read for this class, so it gets no entry.
                    if let Some(partial) = partial {
                        report.urls.insert(request.name.clone(), partial);
                    }
                    report.cancelled = true;
                    break;
                }
            }
        }

        report
    }
}
