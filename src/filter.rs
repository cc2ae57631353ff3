//! Heuristics that keep food-first venues out of the results.

use crate::candidate::{Candidate, Source};

/// Name fragments typical of restaurants and bars.
static RESTAURANT_KEYWORDS: &[&str] = &[
    "restaurant",
    "steak",
    "steakhouse",
    "grill",
    "bar",
    "pub",
    "tavern",
    "bbq",
    "pizza",
    "burger",
    "diner",
    "cantina",
    "taqueria",
    "brasserie",
    "kitchen",
    "eatery",
    "bistro",
    "trattoria",
    "osteria",
    "brewery",
    "wine",
    "cocktail",
];

/// Name fragments that mark a venue as a café despite other hints.
static CAFE_KEYWORDS: &[&str] = &["cafe", "coffee", "espresso", "tea", "roaster", "latte"];

static CAFE_TYPES: &[&str] = &["cafe", "coffee_shop"];

static YELP_CAFE_CATEGORIES: &[&str] = &["coffee", "coffeeroasteries", "cafes"];

fn has_any(types: &[String], wanted: &[&str]) -> bool {
    types.iter().any(|t| wanted.contains(&t.as_str()))
}

/// Returns `true` when a candidate looks like a restaurant or bar rather than
/// a café.
pub fn should_skip_candidate(candidate: &Candidate) -> bool {
    let name = candidate.name.to_lowercase();
    let types: Vec<String> = candidate
        .types
        .iter()
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect();

    let restaurant_name = RESTAURANT_KEYWORDS.iter().any(|kw| name.contains(kw));
    let cafe_name = CAFE_KEYWORDS.iter().any(|kw| name.contains(kw));
    if restaurant_name && !cafe_name {
        return true;
    }

    if has_any(&types, &["restaurant"]) && !has_any(&types, CAFE_TYPES) {
        return true;
    }

    let yelp_only = candidate.sources.len() == 1 && candidate.sources.contains(&Source::Yelp);
    if yelp_only && !types.is_empty() && !has_any(&types, YELP_CAFE_CATEGORIES) {
        return true;
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: &str, types: &[&str], source: Source) -> Candidate {
        let mut c = Candidate {
            name: name.to_string(),
            ..Default::default()
        };
        c.types = types.iter().map(|t| t.to_string()).collect();
        c.sources.insert(source);
        c
    }

    #[test]
    fn test_restaurant_name_is_skipped() {
        assert!(should_skip_candidate(&candidate("Joe's Burger Grill", &[], Source::Google)));
    }

    #[test]
    fn test_cafe_name_overrides_restaurant_hint() {
        assert!(!should_skip_candidate(&candidate(
            "Espresso Bar",
            &["cafe"],
            Source::Google
        )));
    }

    #[test]
    fn test_restaurant_type_without_cafe_type() {
        assert!(should_skip_candidate(&candidate(
            "Blue Door",
            &["restaurant", "food"],
            Source::Google
        )));
        assert!(!should_skip_candidate(&candidate(
            "Blue Door",
            &["restaurant", "cafe"],
            Source::Google
        )));
    }

    #[test]
    fn test_yelp_only_needs_cafe_category() {
        assert!(should_skip_candidate(&candidate(
            "Morning Glory",
            &["bakeries"],
            Source::Yelp
        )));
        assert!(!should_skip_candidate(&candidate(
            "Morning Glory",
            &["bakeries", "coffee"],
            Source::Yelp
        )));
        assert!(!should_skip_candidate(&candidate("Morning Glory", &[], Source::Yelp)));
    }

    #[test]
    fn test_google_candidate_with_unrelated_types_is_kept() {
        assert!(!should_skip_candidate(&candidate(
            "Morning Glory",
            &["bakery", "store"],
            Source::Google
        )));
    }
}
