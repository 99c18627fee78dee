use async_trait::async_trait;
use dashmap::DashMap;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

use crate::models::Listing;
use crate::services::query::CandidateFilter;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid catalog: {0}")]
    Catalog(String),

    #[error("Catalog I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Catalog decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Read side of the listing catalog.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CandidateStore: Send + Sync {
    async fn find_candidates(&self, filter: &CandidateFilter) -> Result<Vec<Listing>>;
}

/// In-process catalog keyed by listing id.
///
/// Candidates come back in id order so unshuffled listings page stably.
#[derive(Debug, Default)]
pub struct InMemoryCandidateStore {
    listings: DashMap<String, Listing>,
}

impl InMemoryCandidateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listings(listings: impl IntoIterator<Item = Listing>) -> Self {
        let store = Self::new();
        for listing in listings {
            store.upsert(listing);
        }
        store
    }

    /// Replaces any listing with the same id.
    pub fn upsert(&self, listing: Listing) {
        self.listings.insert(listing.id.clone(), listing);
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    /// Loads a JSON array of listings, returning how many were read.
    pub async fn load_json_file(&self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let raw = tokio::fs::read(path).await?;
        let listings: Vec<Listing> = serde_json::from_slice(&raw)?;

        if let Some(blank) = listings.iter().position(|l| l.id.trim().is_empty()) {
            return Err(StoreError::Catalog(format!(
                "listing at index {} has an empty id",
                blank
            )));
        }

        let count = listings.len();
        for listing in listings {
            self.upsert(listing);
        }
        info!(path = %path.display(), count, "Loaded catalog snapshot");
        Ok(count)
    }
}

#[async_trait]
impl CandidateStore for InMemoryCandidateStore {
    async fn find_candidates(&self, filter: &CandidateFilter) -> Result<Vec<Listing>> {
        let mut matched: Vec<Listing> = self
            .listings
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        matched.sort_by(|a, b| a.id.cmp(&b.id));

        debug!(
            kind = filter.kind.as_str(),
            matched = matched.len(),
            total = self.listings.len(),
            "Evaluated candidate filter"
        );
        Ok(matched)
    }
}
