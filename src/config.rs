//! Credentials for the place-search providers, read from the environment.

use std::env;

#[derive(Debug, Clone, Default)]
pub struct ScraperConfig {
    pub google_places_api_key: Option<String>,
    pub yelp_api_key: Option<String>,
}

impl ScraperConfig {
    /// Reads `GOOGLE_PLACES_API_KEY` and `YELP_API_KEY`. Unset or blank
    /// values come back as `None`.
    pub fn from_env() -> Self {
        Self {
            google_places_api_key: non_empty_var("GOOGLE_PLACES_API_KEY"),
            yelp_api_key: non_empty_var("YELP_API_KEY"),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
