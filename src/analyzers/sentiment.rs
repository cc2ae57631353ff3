//! Per-review workability factor extraction.
//!
//! A factor is "observed" in a review when any of its keywords occurs in the
//! lowercased text. Its score is then computed only over the sentences that
//! mention it, so unrelated parts of the review do not dilute it.

use crate::analyzers::lexicon::SentimentScorer;
use crate::analyzers::types::SentimentRecord;
use crate::analyzers::utility::clamp_finite;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A workability aspect that reviews are scored on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Factor {
    Wifi,
    Outlets,
    Seating,
    Capacity,
    Drinks,
    Lighting,
    Noise,
}

impl Factor {
    pub const ALL: [Factor; 7] = [
        Factor::Wifi,
        Factor::Outlets,
        Factor::Seating,
        Factor::Capacity,
        Factor::Drinks,
        Factor::Lighting,
        Factor::Noise,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Factor::Wifi => "wifi",
            Factor::Outlets => "outlets",
            Factor::Seating => "seating",
            Factor::Capacity => "capacity",
            Factor::Drinks => "drinks",
            Factor::Lighting => "lighting",
            Factor::Noise => "noise",
        }
    }

    /// Lowercase substrings whose presence marks the factor as mentioned.
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Factor::Wifi => &["wifi", "wi-fi", "internet", "connection", "network", "signal"],
            Factor::Outlets => &["outlet", "plug", "charging", "charger", "power", "socket", "usb"],
            Factor::Seating => &["seat", "table", "chair", "couch", "sofa", "booth", "bench", "stool"],
            Factor::Capacity => &[
                "crowded", "packed", "busy", "spacious", "capacity", "cramped", "roomy", "space",
            ],
            Factor::Drinks => &[
                "coffee", "espresso", "latte", "cappuccino", "tea", "drink", "brew", "matcha", "chai",
            ],
            Factor::Lighting => &["light", "bright", "dim", "window", "lamp", "sunny"],
            Factor::Noise => &["noise", "noisy", "loud", "quiet", "silent", "peaceful", "chaotic", "music"],
        }
    }

    fn mentioned_in(self, lowered: &str) -> bool {
        self.keywords().iter().any(|kw| lowered.contains(kw))
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Average of the two scorer estimates, each sanitized into `[-1, 1]`.
fn blended<S: SentimentScorer + ?Sized>(scorer: &S, text: &str) -> f64 {
    let compound = clamp_finite(scorer.compound_score(text), -1.0, 1.0);
    let polarity = clamp_finite(scorer.polarity_score(text), -1.0, 1.0);
    (compound + polarity) / 2.0
}

/// Scores one review against every [`Factor`].
///
/// Unobserved factors are recorded as `0.0` in [`SentimentRecord::factors`]
/// and left out of [`SentimentRecord::keywords`]; use
/// [`SentimentRecord::score`] to tell the two apart.
pub fn analyze_review<S: SentimentScorer + ?Sized>(scorer: &S, text: &str) -> SentimentRecord {
    let lowered = text.to_lowercase();
    let overall = blended(scorer, text);

    let mut factors = BTreeMap::new();
    let mut keywords = Vec::new();

    for factor in Factor::ALL {
        if !factor.mentioned_in(&lowered) {
            factors.insert(factor, 0.0);
            continue;
        }

        let factor_text = text
            .split('.')
            .filter(|sentence| factor.mentioned_in(&sentence.to_lowercase()))
            .collect::<Vec<_>>()
            .join(" ");

        factors.insert(factor, blended(scorer, &factor_text));
        keywords.push(factor);
    }

    SentimentRecord {
        overall,
        factors,
        keywords,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::lexicon::LexiconScorer;

    /// Scores every text by a fixed pair, to isolate the extractor from the lexicon.
    struct FixedScorer(f64, f64);

    impl SentimentScorer for FixedScorer {
        fn compound_score(&self, _text: &str) -> f64 {
            self.0
        }
        fn polarity_score(&self, _text: &str) -> f64 {
            self.1
        }
    }

    /// Echoes the number of words as the score, so sentence filtering is visible.
    struct WordCountScorer;

    impl SentimentScorer for WordCountScorer {
        fn compound_score(&self, text: &str) -> f64 {
            text.split_whitespace().count() as f64 / 100.0
        }
        fn polarity_score(&self, text: &str) -> f64 {
            self.compound_score(text)
        }
    }

    #[test]
    fn test_empty_text_observes_nothing() {
        let record = analyze_review(&LexiconScorer::new(), "");
        assert!(record.keywords.is_empty());
        assert_eq!(record.overall, 0.0);
        for factor in Factor::ALL {
            assert_eq!(record.score(factor), None);
            assert_eq!(record.factors[&factor], 0.0);
        }
    }

    #[test]
    fn test_mixed_review_observes_expected_factors() {
        let record = analyze_review(
            &LexiconScorer::new(),
            "Great wifi but no outlets, always packed",
        );
        assert_eq!(
            record.keywords,
            vec![Factor::Wifi, Factor::Outlets, Factor::Capacity]
        );
        for absent in [Factor::Seating, Factor::Lighting, Factor::Noise, Factor::Drinks] {
            assert_eq!(record.score(absent), None);
        }
    }

    #[test]
    fn test_factor_signs_follow_their_own_sentences() {
        let record = analyze_review(
            &LexiconScorer::new(),
            "Great wifi. No outlets. Always packed.",
        );
        assert!(record.score(Factor::Wifi).unwrap() > 0.0);
        assert!(record.score(Factor::Outlets).unwrap() < 0.0);
        assert!(record.score(Factor::Capacity).unwrap() < 0.0);
    }

    #[test]
    fn test_observed_with_neutral_score_is_not_absent() {
        let record = analyze_review(&FixedScorer(0.0, 0.0), "The wifi exists");
        assert_eq!(record.score(Factor::Wifi), Some(0.0));
        assert_eq!(record.keywords, vec![Factor::Wifi]);
    }

    #[test]
    fn test_factor_score_is_average_of_both_estimates() {
        let record = analyze_review(&FixedScorer(0.6, 0.2), "Quiet and calm");
        assert!((record.overall - 0.4).abs() < 1e-12);
        assert!((record.score(Factor::Noise).unwrap() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_only_matching_sentences_are_scored() {
        let text = "Lovely staff and pastries here. The wifi was fine";
        let record = analyze_review(&WordCountScorer, text);
        // " The wifi was fine" has 4 words; the full text has 9.
        assert!((record.score(Factor::Wifi).unwrap() - 0.04).abs() < 1e-12);
        assert!((record.overall - 0.09).abs() < 1e-12);
    }

    #[test]
    fn test_keyword_matching_is_case_insensitive() {
        let record = analyze_review(&FixedScorer(0.5, 0.5), "WI-FI and ESPRESSO");
        assert_eq!(record.keywords, vec![Factor::Wifi, Factor::Drinks]);
    }

    #[test]
    fn test_non_finite_scorer_output_is_neutralized() {
        let record = analyze_review(&FixedScorer(f64::NAN, 3.0), "loud music");
        assert!((record.overall - 0.5).abs() < 1e-12);
        assert!((record.score(Factor::Noise).unwrap() - 0.5).abs() < 1e-12);
    }
}
