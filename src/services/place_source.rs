//! Trait for providers that search for venues in a city.

use anyhow::Result;
use venue_workability_rater::candidate::{Candidate, Source};

/// Abstraction over a place-search provider (e.g., Google Places, Yelp).
#[async_trait::async_trait]
pub trait PlaceSource: Send + Sync {
    /// Provider these candidates come from.
    fn source(&self) -> Source;

    /// Returns up to `max_results` café candidates for `city`, already
    /// normalized and filtered.
    async fn search(&self, city: &str, max_results: usize) -> Result<Vec<Candidate>>;
}
