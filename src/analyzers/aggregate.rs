use crate::analyzers::grade::{bands_for, to_score};
use crate::analyzers::sentiment::Factor;
use crate::analyzers::types::{AmenityScore, AmenitySummary, FactorMentions, SentimentRecord};
use crate::analyzers::utility::mean;

/// Number of positive outlet mentions needed before outlets count as available.
pub const MIN_POSITIVE_OUTLET_MENTIONS: usize = 2;

/// Amenity profile plus the evidence behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct AmenityAggregate {
    pub summary: AmenitySummary,
    pub mentions: FactorMentions,
}

fn empty_mentions() -> FactorMentions {
    Factor::ALL.iter().map(|f| (*f, 0)).collect()
}

/// Reduces a venue's per-review sentiment into an [`AmenitySummary`].
///
/// Only reviews that observed a factor contribute to its mean. A venue with no
/// reviews gets the cold-start profile; a factor nobody mentioned keeps the
/// `unknown` / 5.0 default even when other factors have evidence.
///
/// An unmentioned factor is not graded from a 0.0 mean, which
/// would label it `spotty`, `moderate` or `limited` with no evidence. The
/// display score is 5.0 either way; only the label differs.
pub fn aggregate_amenities(records: &[SentimentRecord]) -> AmenityAggregate {
    let mut summary = AmenitySummary::default();
    let mut mentions = empty_mentions();

    if records.is_empty() {
        return AmenityAggregate { summary, mentions };
    }

    for factor in Factor::ALL {
        let scores: Vec<f64> = records.iter().filter_map(|r| r.score(factor)).collect();
        mentions.insert(factor, scores.len());

        if scores.is_empty() {
            continue;
        }

        let avg = mean(&scores);

        if factor == Factor::Outlets {
            let positive = scores.iter().filter(|s| **s > 0.0).count();
            summary.outlets.available = positive >= MIN_POSITIVE_OUTLET_MENTIONS;
            summary.outlets.score = to_score(avg);
            continue;
        }

        if let (Some(bands), Some(slot)) = (bands_for(factor), summary.labeled_mut(factor)) {
            *slot = AmenityScore {
                label: bands.classify(avg).to_string(),
                score: to_score(avg),
            };
        }
    }

    AmenityAggregate { summary, mentions }
}
