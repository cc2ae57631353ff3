//! Per-source venue records produced by the place-search layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Upstream place-search provider a record or review came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Google,
    Yelp,
}

impl Source {
    pub fn as_str(self) -> &'static str {
        match self {
            Source::Google => "google",
            Source::Yelp => "yelp",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single captured review. Never mutated after capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewInput {
    pub source: Source,
    #[serde(default)]
    pub source_id: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub url: Option<String>,
}

impl ReviewInput {
    /// Review body, with a missing text treated as empty.
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

/// One source's normalized view of a venue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Candidate {
    pub name: String,
    pub address: String,
    pub city: Option<String>,
    pub neighborhood: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub hours: BTreeMap<String, String>,
    pub types: BTreeSet<String>,
    pub price_level: Option<u8>,
    pub rating_sources: BTreeMap<Source, Option<f64>>,
    pub review_counts: BTreeMap<Source, Option<u64>>,
    pub external_ids: BTreeMap<Source, Option<String>>,
    pub sources: BTreeSet<Source>,
    pub reviews: Vec<ReviewInput>,
}

impl Candidate {
    /// Identity used to collapse records of the same physical venue:
    /// `lowercase(trim(name)) | lowercase(trim(address))`.
    pub fn dedup_key(&self) -> String {
        format!(
            "{}|{}",
            self.name.trim().to_lowercase(),
            self.address.trim().to_lowercase()
        )
    }

    /// Rating reported by `source`, if present and numeric.
    pub fn rating_from(&self, source: Source) -> Option<f64> {
        self.rating_sources
            .get(&source)
            .copied()
            .flatten()
            .filter(|r| r.is_finite())
    }

    /// Mean of every non-null per-source rating.
    pub fn external_rating(&self) -> Option<f64> {
        let ratings: Vec<f64> = self
            .rating_sources
            .values()
            .filter_map(|r| *r)
            .filter(|r| r.is_finite())
            .collect();

        if ratings.is_empty() {
            None
        } else {
            Some(ratings.iter().sum::<f64>() / ratings.len() as f64)
        }
    }

    pub fn external_id(&self, source: Source) -> Option<&str> {
        self.external_ids
            .get(&source)
            .and_then(|id| id.as_deref())
            .filter(|id| !id.is_empty())
    }

    pub fn has_coordinates(&self) -> bool {
        matches!((self.lat, self.lng), (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_key_trims_and_lowercases() {
        let c = Candidate {
            name: "  Blue Bottle Coffee ".to_string(),
            address: "66 Mint St, San Francisco ".to_string(),
            ..Default::default()
        };
        assert_eq!(c.dedup_key(), "blue bottle coffee|66 mint st, san francisco");
    }

    #[test]
    fn test_external_rating_ignores_nulls() {
        let mut c = Candidate::default();
        c.rating_sources.insert(Source::Google, Some(4.6));
        c.rating_sources.insert(Source::Yelp, None);
        assert_eq!(c.external_rating(), Some(4.6));

        c.rating_sources.insert(Source::Yelp, Some(4.0));
        assert!((c.external_rating().unwrap() - 4.3).abs() < 1e-9);
    }

    #[test]
    fn test_external_rating_none_when_empty() {
        let mut c = Candidate::default();
        assert_eq!(c.external_rating(), None);
        c.rating_sources.insert(Source::Google, None);
        assert_eq!(c.external_rating(), None);
    }

    #[test]
    fn test_has_coordinates() {
        let mut c = Candidate::default();
        assert!(!c.has_coordinates());
        c.lat = Some(37.77);
        assert!(!c.has_coordinates());
        c.lng = Some(-122.41);
        assert!(c.has_coordinates());
    }

    #[test]
    fn test_source_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Source::Google).unwrap(), "\"google\"");
        let s: Source = serde_json::from_str("\"yelp\"").unwrap();
        assert_eq!(s, Source::Yelp);
    }
}
