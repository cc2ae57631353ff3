//! Conversion of raw place-search payloads into [`Candidate`] records.
//!
//! Payloads are read as generic JSON and only the fields we need are
//! extracted; anything missing degrades to `None` or empty.

use crate::candidate::{Candidate, ReviewInput, Source};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;
use std::collections::BTreeMap;

static WEEKDAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

fn str_field(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Parses Google `weekday_text` lines ("Monday: 7:00 AM – 6:00 PM") into a
/// lowercase day → hours map.
pub fn format_google_hours(weekday_text: &[String]) -> BTreeMap<String, String> {
    weekday_text
        .iter()
        .filter_map(|entry| entry.split_once(": "))
        .map(|(day, hours)| (day.to_lowercase(), hours.to_string()))
        .collect()
}

/// Flattens Yelp `hours[].open[]` spans into a day → "HH:MM - HH:MM" map.
pub fn format_yelp_hours(hours: &Value) -> BTreeMap<String, String> {
    let mut mapping = BTreeMap::new();

    for block in hours.as_array().into_iter().flatten() {
        for span in block["open"].as_array().into_iter().flatten() {
            let Some(day) = span["day"].as_u64().and_then(|d| WEEKDAYS.get(d as usize)) else {
                continue;
            };
            let (Some(start), Some(end)) = (span["start"].as_str(), span["end"].as_str()) else {
                continue;
            };
            if start.len() != 4 || end.len() != 4 || !start.is_ascii() || !end.is_ascii() {
                continue;
            }
            mapping.insert(
                day.to_string(),
                format!("{}:{} - {}:{}", &start[..2], &start[2..], &end[..2], &end[2..]),
            );
        }
    }

    mapping
}

fn component_with_type(components: &Value, wanted: &[&str]) -> Option<String> {
    components
        .as_array()?
        .iter()
        .find(|comp| {
            comp["types"]
                .as_array()
                .is_some_and(|types| types.iter().any(|t| t.as_str().is_some_and(|t| wanted.contains(&t))))
        })
        .and_then(|comp| str_field(&comp["long_name"]))
}

/// First address component typed `neighborhood` or `sublocality`.
pub fn extract_neighborhood(components: &Value) -> Option<String> {
    component_with_type(components, &["neighborhood", "sublocality"])
}

/// First address component typed `locality`.
pub fn extract_city(components: &Value) -> Option<String> {
    component_with_type(components, &["locality"])
}

/// Builds a candidate from a Google Place Details `result` object.
///
/// Returns `None` when the place has no coordinates.
pub fn normalize_google_place(result: &Value) -> Option<Candidate> {
    let location = &result["geometry"]["location"];
    let lat = location["lat"].as_f64()?;
    let lng = location["lng"].as_f64()?;

    let place_id = str_field(&result["place_id"]);
    let components = &result["address_components"];

    let reviews = result["reviews"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|review| {
            let text = str_field(&review["text"])
                .or_else(|| str_field(&review["original_text"]["text"]))?;
            let time = review["time"].as_i64().unwrap_or(0);
            Some(ReviewInput {
                source: Source::Google,
                source_id: Some(format!(
                    "google_{}_{}",
                    place_id.as_deref().unwrap_or(""),
                    time
                )),
                author: str_field(&review["author_name"]),
                rating: review["rating"].as_f64(),
                text: Some(text),
                date: Utc.timestamp_opt(time, 0).single(),
                url: str_field(&review["author_url"]),
            })
        })
        .collect();

    let weekday_text: Vec<String> = result["opening_hours"]["weekday_text"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect();

    let mut candidate = Candidate {
        name: result["name"].as_str().unwrap_or("").to_string(),
        address: result["formatted_address"].as_str().unwrap_or("").to_string(),
        city: extract_city(components),
        neighborhood: extract_neighborhood(components),
        lat: Some(lat),
        lng: Some(lng),
        phone: str_field(&result["formatted_phone_number"]),
        website: str_field(&result["website"]),
        hours: format_google_hours(&weekday_text),
        types: result["types"]
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(str_field)
            .collect(),
        price_level: result["price_level"].as_u64().map(|p| p.min(4) as u8),
        reviews,
        ..Default::default()
    };
    candidate
        .rating_sources
        .insert(Source::Google, result["rating"].as_f64());
    candidate
        .review_counts
        .insert(Source::Google, result["user_ratings_total"].as_u64());
    candidate.external_ids.insert(Source::Google, place_id);
    candidate.sources.insert(Source::Google);

    Some(candidate)
}

/// Parses Yelp's `time_created` ("2024-03-01 14:22:10"), falling back to `now`.
fn parse_yelp_time(raw: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    let iso = raw.replace(' ', "T");
    NaiveDateTime::parse_from_str(&iso, "%Y-%m-%dT%H:%M:%S")
        .map(|naive| naive.and_utc())
        .or_else(|_| DateTime::parse_from_rfc3339(&iso).map(|dt| dt.with_timezone(&Utc)))
        .unwrap_or(now)
}

/// Builds a candidate from a Yelp business details object and its reviews.
///
/// Returns `None` when the business has no coordinates.
pub fn normalize_yelp_business(business: &Value, reviews: &[Value]) -> Option<Candidate> {
    let coordinates = &business["coordinates"];
    let lat = coordinates["latitude"].as_f64()?;
    let lng = coordinates["longitude"].as_f64()?;
    let location = &business["location"];
    let now = Utc::now();

    let address = location["display_address"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|line| line.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let reviews = reviews
        .iter()
        .filter_map(|review| {
            let text = str_field(&review["text"])?;
            Some(ReviewInput {
                source: Source::Yelp,
                source_id: str_field(&review["id"]).map(|id| format!("yelp_{id}")),
                author: str_field(&review["user"]["name"]),
                rating: review["rating"].as_f64(),
                text: Some(text),
                date: Some(parse_yelp_time(
                    review["time_created"].as_str().unwrap_or(""),
                    now,
                )),
                url: str_field(&review["url"]),
            })
        })
        .collect();

    let mut candidate = Candidate {
        name: business["name"].as_str().unwrap_or("").to_string(),
        address,
        city: str_field(&location["city"]),
        neighborhood: location["neighborhoods"]
            .as_array()
            .and_then(|n| n.first())
            .and_then(str_field),
        lat: Some(lat),
        lng: Some(lng),
        phone: str_field(&business["display_phone"]),
        website: str_field(&business["url"]),
        hours: format_yelp_hours(&business["hours"]),
        types: business["categories"]
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(|cat| str_field(&cat["alias"]))
            .collect(),
        price_level: Some(business["price"].as_str().map_or(0, |p| p.len().min(4) as u8)),
        reviews,
        ..Default::default()
    };
    candidate
        .rating_sources
        .insert(Source::Yelp, business["rating"].as_f64());
    candidate
        .review_counts
        .insert(Source::Yelp, business["review_count"].as_u64());
    candidate
        .external_ids
        .insert(Source::Yelp, str_field(&business["id"]));
    candidate.sources.insert(Source::Yelp);

    Some(candidate)
}
