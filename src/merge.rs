//! Cross-source merge and deduplication of [`Candidate`] records.

use crate::candidate::{Candidate, Source};
use std::collections::HashMap;
use tracing::debug;

/// Collapses candidates from any number of sources into one record per venue.
///
/// Records sharing a [`Candidate::dedup_key`] are merged: `sources` and
/// `types` are unioned, review lists are concatenated as-is, scalar fields
/// keep the first non-empty value seen, and non-null rating / review-count
/// entries are unioned. The result is ordered by Google rating (missing
/// counts as 0, ties keep first-seen order) and truncated to `max_results`.
///
/// Candidates without coordinates are kept; dropping them is up to the caller.
pub fn merge_candidates<I>(candidate_lists: I, max_results: usize) -> Vec<Candidate>
where
    I: IntoIterator<Item = Vec<Candidate>>,
{
    let mut merged: Vec<Candidate> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut seen = 0usize;

    for candidates in candidate_lists {
        for candidate in candidates {
            seen += 1;
            let key = candidate.dedup_key();
            match index.get(&key) {
                Some(&i) => merge_into(&mut merged[i], candidate),
                None => {
                    index.insert(key, merged.len());
                    merged.push(candidate);
                }
            }
        }
    }

    merged.sort_by(|a, b| google_rating(b).total_cmp(&google_rating(a)));
    merged.truncate(max_results);

    debug!(
        input = seen,
        unique = index.len(),
        kept = merged.len(),
        "Merged candidates"
    );

    merged
}

fn google_rating(c: &Candidate) -> f64 {
    c.rating_from(Source::Google).unwrap_or(0.0)
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|v| v.trim().is_empty())
}

fn fill_string(target: &mut Option<String>, source: Option<String>) {
    if is_blank(target) && !is_blank(&source) {
        *target = source;
    }
}

fn merge_into(target: &mut Candidate, source: Candidate) {
    target.sources.extend(source.sources);
    target.types.extend(source.types);
    target.reviews.extend(source.reviews);

    fill_string(&mut target.phone, source.phone);
    fill_string(&mut target.website, source.website);
    fill_string(&mut target.neighborhood, source.neighborhood);
    fill_string(&mut target.city, source.city);

    if target.hours.is_empty() {
        target.hours = source.hours;
    }
    if target.lat.is_none() {
        target.lat = source.lat;
    }
    if target.lng.is_none() {
        target.lng = source.lng;
    }
    if target.price_level.is_none() {
        target.price_level = source.price_level;
    }

    for (src, id) in source.external_ids {
        let slot = target.external_ids.entry(src).or_insert(None);
        fill_string(slot, id);
    }

    for (src, rating) in source.rating_sources {
        if rating.is_some() {
            target.rating_sources.insert(src, rating);
        }
    }
    for (src, count) in source.review_counts {
        if count.is_some() {
            target.review_counts.insert(src, count);
        }
    }
}
