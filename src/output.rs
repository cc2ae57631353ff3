//! Persistence for scored venues.
//!
//! Each venue lives in its own JSON document, keyed by its dedup identity and
//! replaced on every run. A CSV index gets one row per venue per run.

use anyhow::{Context, Result, bail};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::analyzers::types::{AnalyzedReview, CanonicalVenueDoc, VenueIndexEntry};
use csv::WriterBuilder;

/// Whether an upsert created a new document or replaced an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Added,
    Updated,
}

/// Logs any serializable value as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// File-name-safe slug for a dedup key: lowercase alphanumerics separated by
/// single dashes.
pub fn venue_slug(key: &str) -> String {
    let mut slug = String::with_capacity(key.len());
    for ch in key.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        slug.push_str("venue");
    }
    slug
}

/// Number of hex digits of the key digest kept in a file stem.
const KEY_DIGEST_LEN: usize = 16;

/// File stem for a dedup key: the readable slug followed by a SHA-256 prefix
/// of the full key, so keys that slug alike still get distinct files.
pub fn venue_file_stem(key: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(key.as_bytes()));
    format!("{}-{}", venue_slug(key), &digest[..KEY_DIGEST_LEN])
}

/// Path of the document for `doc` under `dir`.
pub fn doc_path(dir: &Path, doc: &CanonicalVenueDoc) -> PathBuf {
    dir.join(format!("{}.json", venue_file_stem(&doc.dedup_key())))
}

/// Keeps reviews already stored, then adds new ones whose `source_id` has not
/// been seen. Reviews without text are never stored.
fn merge_reviews(
    previous: Vec<AnalyzedReview>,
    incoming: Vec<AnalyzedReview>,
) -> Vec<AnalyzedReview> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut merged = Vec::with_capacity(previous.len() + incoming.len());

    for review in previous.into_iter().chain(incoming) {
        if review.text.trim().is_empty() {
            continue;
        }
        if let Some(id) = &review.source_id {
            if !seen.insert(id.clone()) {
                continue;
            }
        }
        merged.push(review);
    }

    merged
}

/// Writes `doc` to its JSON file under `dir`, replacing any previous version.
///
/// Reviews stored by earlier runs are carried over, deduplicated by source id,
/// and `doc.reviews` is updated to match what was written.
pub fn upsert_venue_doc(dir: &Path, doc: &mut CanonicalVenueDoc) -> Result<UpsertOutcome> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = doc_path(dir, &doc);

    let outcome = if path.exists() {
        let content =
            fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        let previous: CanonicalVenueDoc = serde_json::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        if previous.dedup_key() != doc.dedup_key() {
            bail!(
                "{} holds venue '{}', refusing to overwrite it with '{}'",
                path.display(),
                previous.dedup_key(),
                doc.dedup_key()
            );
        }
        doc.reviews = merge_reviews(previous.reviews, std::mem::take(&mut doc.reviews));
        UpsertOutcome::Updated
    } else {
        doc.reviews = merge_reviews(Vec::new(), std::mem::take(&mut doc.reviews));
        UpsertOutcome::Added
    };

    let body = serde_json::to_vec_pretty(doc)?;
    fs::write(&path, body).with_context(|| format!("writing {}", path.display()))?;
    debug!(path = %path.display(), ?outcome, reviews = doc.reviews.len(), "Venue document written");

    Ok(outcome)
}

/// Reads every venue document (`*.json`) stored directly under `dir`.
pub fn load_venue_docs(dir: &Path) -> Result<Vec<CanonicalVenueDoc>> {
    let mut docs = Vec::new();

    for entry in fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let path = entry?.path();
        if !path.is_file() || path.extension().is_none_or(|ext| ext != "json") {
            continue;
        }
        let content =
            fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        let doc: CanonicalVenueDoc = serde_json::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        docs.push(doc);
    }

    info!(dir = %dir.display(), count = docs.len(), "Venue documents loaded");
    Ok(docs)
}

/// Appends a [`VenueIndexEntry`] as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_index_record(path: &Path, entry: &VenueIndexEntry) -> Result<()> {
    let file_exists = path.exists();
    debug!(path = %path.display(), file_exists, "Appending CSV record");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists)
        .from_writer(file);

    writer.serialize(entry)?;
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::analyzer::score_venue;
    use crate::analyzers::lexicon::LexiconScorer;
    use crate::candidate::{Candidate, ReviewInput, Source};
    use chrono::Utc;
    use std::env;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn review(id: Option<&str>, text: &str) -> ReviewInput {
        ReviewInput {
            source: Source::Yelp,
            source_id: id.map(str::to_string),
            author: Some("Sam".to_string()),
            rating: Some(4.0),
            text: Some(text.to_string()),
            date: None,
            url: None,
        }
    }

    fn doc(reviews: Vec<ReviewInput>) -> CanonicalVenueDoc {
        named_doc("Ritual Coffee", "1026 Valencia St", reviews)
    }

    fn named_doc(name: &str, address: &str, reviews: Vec<ReviewInput>) -> CanonicalVenueDoc {
        let candidate = Candidate {
            name: name.to_string(),
            address: address.to_string(),
            lat: Some(37.75),
            lng: Some(-122.42),
            reviews,
            ..Default::default()
        };
        score_venue(&LexiconScorer::new(), candidate, Utc::now())
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&doc(vec![])).unwrap();
    }

    #[test]
    fn test_venue_slug() {
        assert_eq!(
            venue_slug("ritual coffee|1026 valencia st, sf"),
            "ritual-coffee-1026-valencia-st-sf"
        );
        assert_eq!(venue_slug("|"), "venue");
        assert_eq!(venue_slug("Café Ünï|"), "caf-n");
    }

    #[test]
    fn test_upsert_adds_then_updates() {
        let dir = temp_dir("venue_rater_test_upsert");

        let first =
            upsert_venue_doc(&dir, &mut doc(vec![review(Some("yelp_1"), "Quiet")])).unwrap();
        assert_eq!(first, UpsertOutcome::Added);

        let mut latest = doc(vec![
            review(Some("yelp_1"), "Quiet"),
            review(Some("yelp_2"), "Loud"),
            review(None, "Good wifi"),
            review(Some("yelp_3"), "  "),
        ]);
        let second = upsert_venue_doc(&dir, &mut latest).unwrap();
        assert_eq!(second, UpsertOutcome::Updated);
        assert_eq!(latest.reviews.len(), 3);

        let files: Vec<_> = fs::read_dir(&dir).unwrap().collect();
        assert_eq!(files.len(), 1);

        let stored: CanonicalVenueDoc =
            serde_json::from_str(&fs::read_to_string(doc_path(&dir, &latest)).unwrap()).unwrap();
        let ids: Vec<_> = stored.reviews.iter().map(|r| r.source_id.clone()).collect();
        assert_eq!(
            ids,
            vec![Some("yelp_1".to_string()), Some("yelp_2".to_string()), None]
        );

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_file_stem_is_distinct_for_keys_that_slug_alike() {
        let dotted = venue_file_stem("a.b cafe|1 main");
        let spaced = venue_file_stem("a b cafe|1 main");
        assert!(dotted.starts_with("a-b-cafe-1-main-"));
        assert!(spaced.starts_with("a-b-cafe-1-main-"));
        assert_ne!(dotted, spaced);

        let tokyo = venue_file_stem("カフェ|東京");
        let osaka = venue_file_stem("喫茶店|大阪");
        assert!(tokyo.starts_with("venue-"));
        assert_ne!(tokyo, osaka);

        assert_eq!(venue_file_stem("a.b cafe|1 main"), dotted);
        assert_eq!(dotted.len(), "a-b-cafe-1-main-".len() + KEY_DIGEST_LEN);
    }

    #[test]
    fn test_upsert_keeps_similar_names_apart() {
        let dir = temp_dir("venue_rater_test_similar_names");

        let first = upsert_venue_doc(
            &dir,
            &mut named_doc("A.B Cafe", "1 Main", vec![review(Some("g_1"), "review of A.B Cafe")]),
        )
        .unwrap();
        let mut spaced =
            named_doc("A B Cafe", "1 Main", vec![review(Some("g_2"), "review of A B Cafe")]);
        let second = upsert_venue_doc(&dir, &mut spaced).unwrap();

        assert_eq!(first, UpsertOutcome::Added);
        assert_eq!(second, UpsertOutcome::Added);
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 2);
        let texts: Vec<_> = spaced.reviews.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["review of A B Cafe"]);

        let tokyo = upsert_venue_doc(&dir, &mut named_doc("カフェ", "東京", vec![])).unwrap();
        let osaka = upsert_venue_doc(&dir, &mut named_doc("喫茶店", "大阪", vec![])).unwrap();
        assert_eq!(tokyo, UpsertOutcome::Added);
        assert_eq!(osaka, UpsertOutcome::Added);
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 4);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_upsert_refuses_file_of_another_venue() {
        let dir = temp_dir("venue_rater_test_foreign_file");
        let mut ours = named_doc("Ritual Coffee", "1026 Valencia St", vec![]);
        let path = doc_path(&dir, &ours);

        let foreign = named_doc("Other Cafe", "2 Elm St", vec![]);
        fs::create_dir_all(&dir).unwrap();
        fs::write(&path, serde_json::to_vec(&foreign).unwrap()).unwrap();

        let err = upsert_venue_doc(&dir, &mut ours).unwrap_err();
        assert!(err.to_string().contains("refusing to overwrite"));
        let kept: CanonicalVenueDoc =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(kept.name, "Other Cafe");

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_venue_docs_skips_index_csv() {
        let dir = temp_dir("venue_rater_test_load");
        let mut stored = doc(vec![review(Some("yelp_1"), "Quiet")]);
        upsert_venue_doc(&dir, &mut stored).unwrap();
        append_index_record(&dir.join("index.csv"), &VenueIndexEntry::from(&stored)).unwrap();

        let docs = load_venue_docs(&dir).unwrap();
        assert_eq!(docs, vec![stored]);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_venue_docs_reports_bad_json() {
        let dir = temp_dir("venue_rater_test_load_bad");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("broken.json"), "{not json").unwrap();

        let err = load_venue_docs(&dir).unwrap_err();
        assert!(err.to_string().contains("broken.json"));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_append_index_writes_header_once() {
        let dir = temp_dir("venue_rater_test_index");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("index.csv");

        let entry = VenueIndexEntry::from(&doc(vec![]));
        append_index_record(&path, &entry).unwrap();
        append_index_record(&path, &entry).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines.iter().filter(|l| l.contains("workability_score")).count(),
            1
        );
        assert!(lines[1].contains("Laptop-Friendly; Study-Friendly"));

        fs::remove_dir_all(&dir).unwrap();
    }
}
