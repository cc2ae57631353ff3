use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use venue_workability_rater::candidate::{Candidate, Source};
use venue_workability_rater::fetch::auth::UrlParam;
use venue_workability_rater::fetch::{BasicClient, HttpClient, fetch_json};
use venue_workability_rater::filter::should_skip_candidate;
use venue_workability_rater::normalize::normalize_google_place;

use crate::infra::fetch_concurrently;
use crate::services::place_source::PlaceSource;

const BASE_URL: &str = "https://maps.googleapis.com/maps/api/place";

/// Google requires a short pause before a `next_page_token` becomes valid.
const PAGE_TOKEN_DELAY: Duration = Duration::from_secs(2);

static DETAIL_FIELDS: &[&str] = &[
    "place_id",
    "name",
    "formatted_address",
    "formatted_phone_number",
    "website",
    "geometry/location",
    "types",
    "opening_hours/weekday_text",
    "rating",
    "user_ratings_total",
    "price_level",
    "reviews",
    "address_components",
];

/// Google Places text search + place details.
pub struct GooglePlacesSource<C> {
    client: Arc<UrlParam<C>>,
    base_url: String,
    concurrency: usize,
    page_delay: Duration,
}

impl GooglePlacesSource<BasicClient> {
    pub fn new(api_key: String, concurrency: usize) -> Result<Self> {
        Ok(Self::with_client(BasicClient::new()?, api_key, BASE_URL, concurrency))
    }
}

impl<C: HttpClient + 'static> GooglePlacesSource<C> {
    pub fn with_client(inner: C, api_key: String, base_url: &str, concurrency: usize) -> Self {
        Self {
            client: Arc::new(UrlParam::new(inner, "key", api_key)),
            base_url: base_url.trim_end_matches('/').to_string(),
            concurrency,
            page_delay: PAGE_TOKEN_DELAY,
        }
    }

    #[cfg(test)]
    fn without_page_delay(mut self) -> Self {
        self.page_delay = Duration::ZERO;
        self
    }

    async fn fetch_details(&self, place_ids: Vec<String>) -> Vec<Value> {
        let client = self.client.clone();
        let url = format!("{}/details/json", self.base_url);
        let fields = DETAIL_FIELDS.join(",");

        fetch_concurrently(place_ids, self.concurrency, move |place_id| {
            let client = client.clone();
            let url = url.clone();
            let fields = fields.clone();
            async move {
                let payload = fetch_json(
                    &*client,
                    &url,
                    &[
                        ("place_id", place_id.as_str()),
                        ("fields", fields.as_str()),
                        ("reviews_no_translations", "true"),
                    ],
                )
                .await?;
                if payload["status"].as_str() != Some("OK") {
                    debug!(status = ?payload["status"].as_str(), "Place details unavailable");
                    return Ok(None);
                }
                Ok::<_, anyhow::Error>(Some(payload["result"].clone()))
            }
        })
        .await
        .into_iter()
        .flatten()
        .collect()
    }
}

#[async_trait]
impl<C: HttpClient + 'static> PlaceSource for GooglePlacesSource<C> {
    fn source(&self) -> Source {
        Source::Google
    }

    #[tracing::instrument(skip(self), fields(source = "google"))]
    async fn search(&self, city: &str, max_results: usize) -> Result<Vec<Candidate>> {
        let url = format!("{}/textsearch/json", self.base_url);
        let mut params: Vec<(&str, String)> = vec![
            ("query", format!("cafes for working in {city}")),
            ("type", "cafe".to_string()),
        ];
        let mut places = Vec::new();

        while places.len() < max_results {
            let pairs: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();
            let data = fetch_json(&*self.client, &url, &pairs).await?;

            let status = data["status"].as_str().unwrap_or("");
            if !matches!(status, "OK" | "ZERO_RESULTS") {
                warn!(
                    status,
                    error_message = data["error_message"].as_str().unwrap_or(""),
                    "Google Places error"
                );
                break;
            }

            let place_ids: Vec<String> = data["results"]
                .as_array()
                .into_iter()
                .flatten()
                .filter_map(|r| r["place_id"].as_str().map(str::to_string))
                .collect();

            for details in self.fetch_details(place_ids).await {
                let Some(candidate) = normalize_google_place(&details) else {
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

            let Some(token) = data["next_page_token"].as_str() else {
                break;
            };
            if places.len() >= max_results {
                break;
            }
            tokio::time::sleep(self.page_delay).await;
            params = vec![("pagetoken", token.to_string())];
        }

        info!(count = places.len(), city, "Google Places returned cafés");
        Ok(places)
    }
}
