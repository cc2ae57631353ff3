use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};
use venue_workability_rater::candidate::{Candidate, Source};
use venue_workability_rater::fetch::auth::ApiKey;
use venue_workability_rater::fetch::{BasicClient, HttpClient, fetch_json};
use venue_workability_rater::filter::should_skip_candidate;
use venue_workability_rater::normalize::normalize_yelp_business;

use crate::infra::fetch_concurrently;
use crate::services::place_source::PlaceSource;

const BASE_URL: &str = "https://api.yelp.com/v3";

/// Yelp caps `limit` on business search at 50.
const MAX_SEARCH_LIMIT: usize = 50;

/// Yelp Fusion business search + details + reviews.
pub struct YelpSource<C> {
    client: Arc<ApiKey<C>>,
    base_url: String,
    concurrency: usize,
}

impl YelpSource<BasicClient> {
    pub fn new(api_key: &str, concurrency: usize) -> Result<Self> {
        Self::with_client(BasicClient::new()?, api_key, BASE_URL, concurrency)
    }
}

impl<C: HttpClient + 'static> YelpSource<C> {
    pub fn with_client(inner: C, api_key: &str, base_url: &str, concurrency: usize) -> Result<Self> {
        Ok(Self {
            client: Arc::new(ApiKey::bearer(inner, api_key)?),
            base_url: base_url.trim_end_matches('/').to_string(),
            concurrency,
        })
    }
}

/// Fetches the details and reviews of one business. A failed reviews call
/// leaves the business with no reviews.
async fn fetch_business<C: HttpClient>(
    client: &C,
    base_url: &str,
    id: &str,
) -> Result<(Value, Vec<Value>)> {
    let details = fetch_json(client, &format!("{base_url}/businesses/{id}"), &[]).await?;

    let reviews = match fetch_json(client, &format!("{base_url}/businesses/{id}/reviews"), &[]).await {
        Ok(payload) => payload["reviews"].as_array().cloned().unwrap_or_default(),
        Err(e) => {
            debug!(id, error = %e, "Yelp reviews unavailable");
            Vec::new()
        }
    };

    Ok((details, reviews))
}

#[async_trait]
impl<C: HttpClient + 'static> PlaceSource for YelpSource<C> {
    fn source(&self) -> Source {
        Source::Yelp
    }

    #[tracing::instrument(skip(self), fields(source = "yelp"))]
    async fn search(&self, city: &str, max_results: usize) -> Result<Vec<Candidate>> {
        let limit = max_results.min(MAX_SEARCH_LIMIT).to_string();
        let data = fetch_json(
            &*self.client,
            &format!("{}/businesses/search", self.base_url),
            &[
                ("location", city),
                ("term", "coffee shop"),
                ("categories", "coffee,coffeeroasteries,cafes"),
                ("sort_by", "rating"),
                ("limit", limit.as_str()),
            ],
        )
        .await?;

        let ids: Vec<String> = data["businesses"]
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(|b| b["id"].as_str().map(str::to_string))
            .collect();
        if ids.is_empty() {
            warn!(city, "Yelp search returned no businesses");
        }

        let client = self.client.clone();
        let base_url = self.base_url.clone();
        let fetched = fetch_concurrently(ids, self.concurrency, move |id| {
            let client = client.clone();
            let base_url = base_url.clone();
            async move {
                let business = fetch_business(&*client, &base_url, &id).await?;
                Ok::<_, anyhow::Error>(Some(business))
            }
        })
        .await;

        let mut places = Vec::new();
        for (details, reviews) in fetched.into_iter().flatten() {
            let Some(candidate) = normalize_yelp_business(&details, &reviews) else {
                continue;
            };
            if should_skip_candidate(&candidate) {
                debug!(name = %candidate.name, "Skipping non-cafe candidate");
                continue;
            }
            places.push(candidate);
            if places.len() >= max_results {
                break;
            }
        }

        info!(count = places.len(), city, "Yelp returned cafés");
        Ok(places)
    }
}
