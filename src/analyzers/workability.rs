//! Hybrid Workability Index.
//!
//! Combines a venue's amenity scores and external reputation into one 0–10
//! index, then shrinks it toward a global prior according to how many reviews
//! back it:
//!
//! ```text
//! functional  = 0.35·sigmoid(wifi) + 0.25·seating + 0.20·outlets + 0.10·capacity + 0.10·drinks
//! atmospheric = 0.50·reputation + 0.25·gaussian(noise) + 0.25·lighting
//! raw         = 0.70·functional + 0.30·atmospheric
//! adjusted    = n/(n+K)·raw + K/(n+K)·M
//! ```

use crate::analyzers::types::{
    AmenitySummary, AtmosphericComponents, AtmosphericScore, Confidence, FactorMentions,
    FunctionalComponents, FunctionalScore, Metrics, NEUTRAL_SCORE,
};
use crate::analyzers::utility::{clamp_finite, round2};

/// Shrinkage strength, in pseudo-reviews.
pub const SMOOTHING_K: f64 = 8.0;

/// Population mean the index is pulled toward.
pub const GLOBAL_MEAN: f64 = 6.80;

/// External rating (out of 5) assumed when no source reports one.
pub const DEFAULT_EXTERNAL_RATING: f64 = 3.5;

/// Tags every scored venue carries.
pub const BASE_TAGS: [&str; 2] = ["Laptop-Friendly", "Study-Friendly"];

const WIFI_WEIGHT: f64 = 0.35;
const SEATING_WEIGHT: f64 = 0.25;
const OUTLETS_WEIGHT: f64 = 0.20;
const CAPACITY_WEIGHT: f64 = 0.10;
const DRINKS_WEIGHT: f64 = 0.10;

const REPUTATION_WEIGHT: f64 = 0.50;
const NOISE_WEIGHT: f64 = 0.25;
const LIGHTING_WEIGHT: f64 = 0.25;

const FUNCTIONAL_SHARE: f64 = 0.7;
const ATMOSPHERIC_SHARE: f64 = 0.3;

/// Everything the calculator needs about one venue.
#[derive(Debug, Clone, Copy)]
pub struct WorkabilityInput<'a> {
    pub amenities: &'a AmenitySummary,
    pub mentions: &'a FactorMentions,
    pub review_count: usize,
    /// Mean of the venue's per-source ratings, if any.
    pub external_rating: Option<f64>,
}

/// Final index plus its itemized breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkabilityResult {
    pub score: f64,
    pub metrics: Metrics,
}

/// Clamps a display score into `[0, 10]`, treating NaN as neutral.
fn display(score: f64) -> f64 {
    if score.is_nan() {
        NEUTRAL_SCORE
    } else {
        score.clamp(0.0, 10.0)
    }
}

/// Logistic curve centered on 5.0; wifi matters most at the extremes.
pub fn sigmoid_wifi(score: f64) -> f64 {
    let x = display(score);
    10.0 / (1.0 + (-0.5 * (x - 5.0)).exp())
}

/// Bell curve centered on 5.0; rewards a moderate noise score.
pub fn gaussian_noise(score: f64) -> f64 {
    let x = display(score);
    10.0 * (-(x - 5.0).powi(2) / 10.0).exp()
}

/// Maps a 0–5 external rating onto the 0–10 scale.
pub fn reputation(external_rating: Option<f64>) -> f64 {
    let rating = external_rating
        .filter(|r| r.is_finite())
        .unwrap_or(DEFAULT_EXTERNAL_RATING);
    clamp_finite(rating * 2.0, 0.0, 10.0)
}

/// Pulls `raw` toward [`GLOBAL_MEAN`] with weight `K / (n + K)`.
pub fn shrink(raw: f64, review_count: usize) -> f64 {
    let n = review_count as f64;
    let denominator = n + SMOOTHING_K;
    (n / denominator) * raw + (SMOOTHING_K / denominator) * GLOBAL_MEAN
}

impl FunctionalComponents {
    fn weighted(&self) -> f64 {
        WIFI_WEIGHT * self.wifi
            + SEATING_WEIGHT * self.seating
            + OUTLETS_WEIGHT * self.outlets
            + CAPACITY_WEIGHT * self.capacity
            + DRINKS_WEIGHT * self.drinks
    }
}

impl AtmosphericComponents {
    fn weighted(&self) -> f64 {
        REPUTATION_WEIGHT * self.reputation
            + NOISE_WEIGHT * self.noise
            + LIGHTING_WEIGHT * self.lighting
    }
}

/// Computes the workability index for one venue.
pub fn calculate_workability(input: WorkabilityInput<'_>) -> WorkabilityResult {
    let a = input.amenities;

    let functional = FunctionalComponents {
        wifi: sigmoid_wifi(a.wifi.score),
        seating: display(a.seating.score),
        outlets: display(a.outlets.score),
        capacity: display(a.capacity.score),
        drinks: display(a.drinks.score),
    };
    let functional_score = functional.weighted();

    let atmospheric = AtmosphericComponents {
        reputation: reputation(input.external_rating),
        noise: gaussian_noise(a.noise.score),
        lighting: display(a.lighting.score),
    };
    let atmospheric_score = atmospheric.weighted();

    let raw = FUNCTIONAL_SHARE * functional_score + ATMOSPHERIC_SHARE * atmospheric_score;
    let score = round2(clamp_finite(shrink(raw, input.review_count), 0.0, 10.0));

    let metrics = Metrics {
        functional: FunctionalScore {
            score: round2(functional_score),
            components: FunctionalComponents {
                wifi: round2(functional.wifi),
                seating: round2(functional.seating),
                outlets: round2(functional.outlets),
                capacity: round2(functional.capacity),
                drinks: round2(functional.drinks),
            },
        },
        atmospheric: AtmosphericScore {
            score: round2(atmospheric_score),
            components: AtmosphericComponents {
                reputation: round2(atmospheric.reputation),
                noise: round2(atmospheric.noise),
                lighting: round2(atmospheric.lighting),
            },
        },
        confidence: Confidence {
            reviews_analyzed: input.review_count,
            smoothing_constant: SMOOTHING_K,
            global_mean: GLOBAL_MEAN,
            raw_score: round2(raw),
            factor_mentions: input.mentions.clone(),
        },
    };

    WorkabilityResult { score, metrics }
}

/// Descriptive tags for a scored venue, base tags first.
///
/// Label-driven tags read the amenity labels; numeric tags read the
/// (rounded) components recorded in `metrics`.
pub fn derive_tags(amenities: &AmenitySummary, metrics: &Metrics) -> Vec<String> {
    let functional = &metrics.functional.components;
    let atmospheric = &metrics.atmospheric.components;

    let rules: [(&str, bool); 7] = [
        (
            "Fast Wi-Fi",
            matches!(amenities.wifi.label.as_str(), "excellent" | "good"),
        ),
        ("Many Outlets", amenities.outlets.available),
        ("Quiet", amenities.noise.label == "quiet"),
        (
            "Balanced Noise",
            (6.0..=8.5).contains(&atmospheric.noise),
        ),
        (
            "Spacious",
            amenities.seating.label == "comfortable" || functional.capacity >= 7.5,
        ),
        ("Great Coffee", functional.drinks >= 7.5),
        ("Well-Lit", atmospheric.lighting >= 7.0),
    ];

    BASE_TAGS
        .iter()
        .copied()
        .chain(rules.iter().filter(|(_, on)| *on).map(|(tag, _)| *tag))
        .map(str::to_string)
        .collect()
}
