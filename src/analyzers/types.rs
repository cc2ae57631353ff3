//! Data types used by the scoring pipeline.

use crate::analyzers::sentiment::Factor;
use crate::candidate::{ReviewInput, Source};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Label used for every factor before any evidence exists.
pub const UNKNOWN_LABEL: &str = "unknown";

/// Display score used for every factor before any evidence exists.
pub const NEUTRAL_SCORE: f64 = 5.0;

/// Per-factor mention counts across a venue's reviews.
pub type FactorMentions = BTreeMap<Factor, usize>;

/// Sentiment extracted from one review's text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentRecord {
    pub overall: f64,
    /// One entry per factor; unobserved factors hold `0.0`.
    pub factors: BTreeMap<Factor, f64>,
    /// Factors whose keywords occur in the text.
    pub keywords: Vec<Factor>,
}

impl SentimentRecord {
    /// The factor's score, or `None` when the review never mentions it.
    pub fn score(&self, factor: Factor) -> Option<f64> {
        if self.keywords.contains(&factor) {
            self.factors.get(&factor).copied()
        } else {
            None
        }
    }
}

/// Quality label and 0–10 display score for one factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmenityScore {
    pub label: String,
    pub score: f64,
}

impl Default for AmenityScore {
    fn default() -> Self {
        Self {
            label: UNKNOWN_LABEL.to_string(),
            score: NEUTRAL_SCORE,
        }
    }
}

/// Outlets carry an availability flag instead of a label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutletSummary {
    pub available: bool,
    pub score: f64,
}

impl Default for OutletSummary {
    fn default() -> Self {
        Self {
            available: false,
            score: NEUTRAL_SCORE,
        }
    }
}

/// Per-venue amenity profile. `Default` is the cold-start profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AmenitySummary {
    pub wifi: AmenityScore,
    pub outlets: OutletSummary,
    pub seating: AmenityScore,
    pub capacity: AmenityScore,
    pub drinks: AmenityScore,
    pub lighting: AmenityScore,
    pub noise: AmenityScore,
}

impl AmenitySummary {
    /// Display score of any factor, outlets included.
    pub fn score(&self, factor: Factor) -> f64 {
        match factor {
            Factor::Outlets => self.outlets.score,
            other => self.labeled(other).map_or(NEUTRAL_SCORE, |a| a.score),
        }
    }

    /// The labeled entry for `factor`; outlets have none.
    pub fn labeled(&self, factor: Factor) -> Option<&AmenityScore> {
        match factor {
            Factor::Wifi => Some(&self.wifi),
            Factor::Seating => Some(&self.seating),
            Factor::Capacity => Some(&self.capacity),
            Factor::Drinks => Some(&self.drinks),
            Factor::Lighting => Some(&self.lighting),
            Factor::Noise => Some(&self.noise),
            Factor::Outlets => None,
        }
    }

    pub(crate) fn labeled_mut(&mut self, factor: Factor) -> Option<&mut AmenityScore> {
        match factor {
            Factor::Wifi => Some(&mut self.wifi),
            Factor::Seating => Some(&mut self.seating),
            Factor::Capacity => Some(&mut self.capacity),
            Factor::Drinks => Some(&mut self.drinks),
            Factor::Lighting => Some(&mut self.lighting),
            Factor::Noise => Some(&mut self.noise),
            Factor::Outlets => None,
        }
    }
}

/// Inputs to the functional sub-score, after transformation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionalComponents {
    pub wifi: f64,
    pub seating: f64,
    pub outlets: f64,
    pub capacity: f64,
    pub drinks: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionalScore {
    pub score: f64,
    pub components: FunctionalComponents,
}

/// Inputs to the atmospheric sub-score, after transformation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtmosphericComponents {
    pub reputation: f64,
    pub noise: f64,
    pub lighting: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtmosphericScore {
    pub score: f64,
    pub components: AtmosphericComponents,
}

/// How much evidence backs the index and how it was smoothed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Confidence {
    pub reviews_analyzed: usize,
    pub smoothing_constant: f64,
    pub global_mean: f64,
    pub raw_score: f64,
    pub factor_mentions: FactorMentions,
}

/// Itemized breakdown of a workability score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub functional: FunctionalScore,
    pub atmospheric: AtmosphericScore,
    pub confidence: Confidence,
}

/// GeoJSON point, `[lng, lat]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: [f64; 2],
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            kind: "Point".to_string(),
            coordinates: [lng, lat],
        }
    }
}

/// A captured review together with its extracted sentiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzedReview {
    pub source: Source,
    pub source_id: Option<String>,
    pub author: String,
    pub rating: Option<f64>,
    pub text: String,
    pub sentiment: SentimentRecord,
    pub keywords: Vec<Factor>,
    pub date: DateTime<Utc>,
    pub url: Option<String>,
}

impl AnalyzedReview {
    pub fn new(review: ReviewInput, sentiment: SentimentRecord, analyzed_at: DateTime<Utc>) -> Self {
        Self {
            source: review.source,
            source_id: review.source_id,
            author: review
                .author
                .filter(|a| !a.trim().is_empty())
                .unwrap_or_else(|| "Anonymous".to_string()),
            rating: review.rating,
            text: review.text.unwrap_or_default(),
            keywords: sentiment.keywords.clone(),
            sentiment,
            date: review.date.unwrap_or(analyzed_at),
            url: review.url,
        }
    }
}

/// The merged, scored venue document that persists across runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalVenueDoc {
    pub name: String,
    pub address: String,
    pub city: String,
    pub neighborhood: String,
    pub coordinates: GeoPoint,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub hours: BTreeMap<String, String>,
    pub types: BTreeSet<String>,
    pub price_level: Option<u8>,
    pub sources: BTreeSet<Source>,
    pub google_maps_id: Option<String>,
    pub yelp_id: Option<String>,
    pub rating_sources: BTreeMap<Source, Option<f64>>,
    pub review_counts: BTreeMap<Source, Option<u64>>,
    pub rating: Option<f64>,
    pub amenities: AmenitySummary,
    pub metrics: Metrics,
    pub tags: Vec<String>,
    pub workability_score: f64,
    pub reviews: Vec<AnalyzedReview>,
    pub last_updated: DateTime<Utc>,
}

impl CanonicalVenueDoc {
    /// Same identity as [`crate::candidate::Candidate::dedup_key`].
    pub fn dedup_key(&self) -> String {
        format!(
            "{}|{}",
            self.name.trim().to_lowercase(),
            self.address.trim().to_lowercase()
        )
    }
}

/// One row of the per-run CSV index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueIndexEntry {
    pub name: String,
    pub address: String,
    pub city: String,
    pub workability_score: f64,
    pub rating: Option<f64>,
    pub reviews_analyzed: usize,
    pub tags: String,
    pub last_updated: DateTime<Utc>,
}

impl From<&CanonicalVenueDoc> for VenueIndexEntry {
    fn from(doc: &CanonicalVenueDoc) -> Self {
        Self {
            name: doc.name.clone(),
            address: doc.address.clone(),
            city: doc.city.clone(),
            workability_score: doc.workability_score,
            rating: doc.rating,
            reviews_analyzed: doc.metrics.confidence.reviews_analyzed,
            tags: doc.tags.join("; "),
            last_updated: doc.last_updated,
        }
    }
}

/// Top-level listing of every scored venue, published as `venues/index.json`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueIndex {
    pub generated_at: DateTime<Utc>,
    pub venues: Vec<VenueIndexEntry>,
}
