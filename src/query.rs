//! Filtering and ranking of stored venue documents.
//!
//! Text filters are case-insensitive substring matches. The geo filter keeps
//! venues within a great-circle radius of a point.

use crate::analyzers::types::CanonicalVenueDoc;
use std::cmp::Ordering;

/// Results returned when no limit is given.
pub const DEFAULT_LIMIT: usize = 50;

/// Search radius, in meters, when only a center point is given.
pub const DEFAULT_RADIUS_M: f64 = 5000.0;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance in meters between two `(lat, lng)` points.
pub fn haversine_m(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lng2 - lng1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().min(1.0).asin()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearPoint {
    pub lat: f64,
    pub lng: f64,
    pub radius_m: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Highest workability first, ties by name.
    #[default]
    Workability,
    Name,
}

/// Criteria for [`run_query`]. Unset fields do not filter.
#[derive(Debug, Clone, PartialEq)]
pub struct VenueQuery {
    pub city: Option<String>,
    pub neighborhood: Option<String>,
    /// Matched against name, address and every tag.
    pub text: Option<String>,
    pub wifi: Option<String>,
    /// Only venues with outlets available when `true`.
    pub outlets: bool,
    pub noise: Option<String>,
    pub near: Option<NearPoint>,
    pub sort: SortOrder,
    /// `0` means no limit.
    pub limit: usize,
}

impl Default for VenueQuery {
    fn default() -> Self {
        Self {
            city: None,
            neighborhood: None,
            text: None,
            wifi: None,
            outlets: false,
            noise: None,
            near: None,
            sort: SortOrder::default(),
            limit: DEFAULT_LIMIT,
        }
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

impl VenueQuery {
    pub fn matches(&self, doc: &CanonicalVenueDoc) -> bool {
        if let Some(city) = self.city.as_deref() {
            if !contains_ci(&doc.city, city) {
                return false;
            }
        }
        if let Some(neighborhood) = self.neighborhood.as_deref() {
            if !contains_ci(&doc.neighborhood, neighborhood) {
                return false;
            }
        }
        if let Some(text) = self.text.as_deref() {
            let hit = contains_ci(&doc.name, text)
                || contains_ci(&doc.address, text)
                || doc.tags.iter().any(|t| contains_ci(t, text));
            if !hit {
                return false;
            }
        }
        if let Some(wifi) = self.wifi.as_deref() {
            if !doc.amenities.wifi.label.eq_ignore_ascii_case(wifi) {
                return false;
            }
        }
        if self.outlets && !doc.amenities.outlets.available {
            return false;
        }
        if let Some(noise) = self.noise.as_deref() {
            if !doc.amenities.noise.label.eq_ignore_ascii_case(noise) {
                return false;
            }
        }
        if let Some(near) = self.near {
            let [lng, lat] = doc.coordinates.coordinates;
            if haversine_m(near.lat, near.lng, lat, lng) > near.radius_m {
                return false;
            }
        }
        true
    }
}

fn by_workability(a: &CanonicalVenueDoc, b: &CanonicalVenueDoc) -> Ordering {
    b.workability_score
        .total_cmp(&a.workability_score)
        .then_with(|| a.name.cmp(&b.name))
}

/// Keeps the documents matching `query`, sorted and truncated to its limit.
pub fn run_query(docs: Vec<CanonicalVenueDoc>, query: &VenueQuery) -> Vec<CanonicalVenueDoc> {
    let mut hits: Vec<CanonicalVenueDoc> =
        docs.into_iter().filter(|d| query.matches(d)).collect();

    match query.sort {
        SortOrder::Workability => hits.sort_by(by_workability),
        SortOrder::Name => hits.sort_by(|a, b| a.name.cmp(&b.name)),
    }
    if query.limit > 0 {
        hits.truncate(query.limit);
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::analyzer::score_venue;
    use crate::analyzers::lexicon::LexiconScorer;
    use crate::candidate::Candidate;
    use chrono::Utc;

    fn venue(name: &str, city: &str, lat: f64, lng: f64, score: f64) -> CanonicalVenueDoc {
        let candidate = Candidate {
            name: name.to_string(),
            address: format!("1 {name} Way"),
            city: Some(city.to_string()),
            neighborhood: Some("Mission District".to_string()),
            lat: Some(lat),
            lng: Some(lng),
            ..Default::default()
        };
        let mut doc = score_venue(&LexiconScorer::new(), candidate, Utc::now());
        doc.workability_score = score;
        doc
    }

    fn names(docs: &[CanonicalVenueDoc]) -> Vec<&str> {
        docs.iter().map(|d| d.name.as_str()).collect()
    }

    fn sample() -> Vec<CanonicalVenueDoc> {
        let mut ritual = venue("Ritual", "San Francisco", 37.7564, -122.4216, 7.2);
        ritual.amenities.wifi.label = "excellent".to_string();
        ritual.amenities.outlets.available = true;
        ritual.tags.push("Fast Wi-Fi".to_string());

        let mut sightglass = venue("Sightglass", "San Francisco", 37.7767, -122.4085, 8.1);
        sightglass.amenities.noise.label = "quiet".to_string();

        let stumptown = venue("Stumptown", "Portland", 45.5219, -122.6753, 9.0);

        vec![ritual, sightglass, stumptown]
    }

    #[test]
    fn test_haversine() {
        assert_eq!(haversine_m(37.0, -122.0, 37.0, -122.0), 0.0);
        // One degree of latitude is about 111.2 km.
        assert!((haversine_m(0.0, 0.0, 1.0, 0.0) - 111_195.0).abs() < 10.0);
        // SF to Portland is roughly 860 km.
        let d = haversine_m(37.7749, -122.4194, 45.5152, -122.6784);
        assert!((850_000.0..870_000.0).contains(&d));
    }

    #[test]
    fn test_default_query_sorts_by_score() {
        let hits = run_query(sample(), &VenueQuery::default());
        assert_eq!(names(&hits), vec!["Stumptown", "Sightglass", "Ritual"]);
    }

    #[test]
    fn test_city_and_text_filters_ignore_case() {
        let query = VenueQuery {
            city: Some("san FRAN".to_string()),
            ..Default::default()
        };
        assert_eq!(names(&run_query(sample(), &query)), vec!["Sightglass", "Ritual"]);

        let query = VenueQuery {
            text: Some("fast wi".to_string()),
            ..Default::default()
        };
        assert_eq!(names(&run_query(sample(), &query)), vec!["Ritual"]);

        let query = VenueQuery {
            text: Some("stumptown way".to_string()),
            neighborhood: Some("mission".to_string()),
            ..Default::default()
        };
        assert_eq!(names(&run_query(sample(), &query)), vec!["Stumptown"]);
    }

    #[test]
    fn test_amenity_filters() {
        let query = VenueQuery {
            wifi: Some("Excellent".to_string()),
            outlets: true,
            ..Default::default()
        };
        assert_eq!(names(&run_query(sample(), &query)), vec!["Ritual"]);

        let query = VenueQuery {
            noise: Some("quiet".to_string()),
            ..Default::default()
        };
        assert_eq!(names(&run_query(sample(), &query)), vec!["Sightglass"]);
    }

    #[test]
    fn test_radius_filter() {
        // Ritual and Sightglass are about 2.5 km apart.
        let near = |radius_m| VenueQuery {
            near: Some(NearPoint {
                lat: 37.7564,
                lng: -122.4216,
                radius_m,
            }),
            ..Default::default()
        };
        assert_eq!(names(&run_query(sample(), &near(1000.0))), vec!["Ritual"]);
        assert_eq!(
            names(&run_query(sample(), &near(DEFAULT_RADIUS_M))),
            vec!["Sightglass", "Ritual"]
        );
    }

    #[test]
    fn test_name_sort_and_limit() {
        let query = VenueQuery {
            sort: SortOrder::Name,
            limit: 2,
            ..Default::default()
        };
        assert_eq!(names(&run_query(sample(), &query)), vec!["Ritual", "Sightglass"]);

        let unlimited = VenueQuery {
            limit: 0,
            ..Default::default()
        };
        assert_eq!(run_query(sample(), &unlimited).len(), 3);
    }
}
