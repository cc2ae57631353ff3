use crate::analyzers::aggregate::aggregate_amenities;
use crate::analyzers::lexicon::SentimentScorer;
use crate::analyzers::sentiment::analyze_review;
use crate::analyzers::types::{AnalyzedReview, CanonicalVenueDoc, GeoPoint, SentimentRecord};
use crate::analyzers::utility::round2;
use crate::analyzers::workability::{WorkabilityInput, calculate_workability, derive_tags};
use crate::candidate::{Candidate, Source};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Scores one merged venue into its canonical document.
///
/// The candidate must carry coordinates; callers filter with
/// [`Candidate::has_coordinates`] (see [`score_candidates`]). Missing
/// coordinates are written as `[0, 0]`.
pub fn score_venue<S: SentimentScorer + ?Sized>(
    scorer: &S,
    candidate: Candidate,
    now: DateTime<Utc>,
) -> CanonicalVenueDoc {
    let records: Vec<SentimentRecord> = candidate
        .reviews
        .iter()
        .map(|r| analyze_review(scorer, r.text()))
        .collect();

    let amenities = aggregate_amenities(&records);
    let external_rating = candidate.external_rating();

    let result = calculate_workability(WorkabilityInput {
        amenities: &amenities.summary,
        mentions: &amenities.mentions,
        review_count: records.len(),
        external_rating,
    });
    let tags = derive_tags(&amenities.summary, &result.metrics);

    debug!(
        venue = %candidate.name,
        reviews = records.len(),
        raw = result.metrics.confidence.raw_score,
        score = result.score,
        "Scored venue"
    );

    let google_maps_id = candidate.external_id(Source::Google).map(str::to_string);
    let yelp_id = candidate.external_id(Source::Yelp).map(str::to_string);

    let reviews = candidate
        .reviews
        .into_iter()
        .zip(records)
        .map(|(review, sentiment)| AnalyzedReview::new(review, sentiment, now))
        .collect();

    CanonicalVenueDoc {
        name: candidate.name,
        address: candidate.address,
        city: candidate.city.unwrap_or_default(),
        neighborhood: candidate.neighborhood.unwrap_or_default(),
        coordinates: GeoPoint::new(
            candidate.lat.unwrap_or_default(),
            candidate.lng.unwrap_or_default(),
        ),
        phone: candidate.phone,
        website: candidate.website,
        hours: candidate.hours,
        types: candidate.types,
        price_level: candidate.price_level,
        sources: candidate.sources,
        google_maps_id,
        yelp_id,
        rating_sources: candidate.rating_sources,
        review_counts: candidate.review_counts,
        rating: external_rating.map(round2),
        amenities: amenities.summary,
        metrics: result.metrics,
        tags,
        workability_score: result.score,
        reviews,
        last_updated: now,
    }
}

/// Scores every merged candidate that has coordinates, in order.
pub fn score_candidates<S: SentimentScorer + ?Sized>(
    scorer: &S,
    candidates: Vec<Candidate>,
) -> Vec<CanonicalVenueDoc> {
    let now = Utc::now();

    candidates
        .into_iter()
        .filter(|c| {
            let keep = c.has_coordinates();
            if !keep {
                debug!(venue = %c.name, "Skipping candidate without coordinates");
            }
            keep
        })
        .map(|c| score_venue(scorer, c, now))
        .collect()
}
