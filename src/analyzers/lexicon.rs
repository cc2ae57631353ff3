//! Lexicon-based sentiment scoring.
//!
//! The factor extractor only depends on the [`SentimentScorer`] trait, which
//! exposes two independent estimates over a piece of text. [`LexiconScorer`]
//! is the built-in implementation: a static valence table with booster and
//! negation handling. It holds no mutable state and is meant to be built once
//! per run and passed by reference.

use crate::analyzers::utility::clamp_finite;
use std::collections::{HashMap, HashSet};

/// A sentiment capability producing two scores in `[-1, 1]`.
pub trait SentimentScorer: Send + Sync {
    /// Normalized sum of word valences.
    fn compound_score(&self, text: &str) -> f64;

    /// Mean polarity of the sentiment-bearing words.
    fn polarity_score(&self, text: &str) -> f64;
}

/// Word valences on a -4..4 scale.
static VALENCES: &[(&str, f64)] = &[
    // positive
    ("abundant", 1.4),
    ("ample", 1.1),
    ("amazing", 2.8),
    ("awesome", 3.1),
    ("beautiful", 2.9),
    ("best", 3.2),
    ("bright", 1.9),
    ("calm", 1.3),
    ("charming", 2.2),
    ("clean", 1.7),
    ("comfortable", 1.9),
    ("comfy", 1.8),
    ("convenient", 1.5),
    ("cozy", 1.7),
    ("decent", 0.8),
    ("delicious", 2.7),
    ("easy", 1.9),
    ("enjoy", 2.2),
    ("enjoyed", 2.3),
    ("excellent", 2.7),
    ("fantastic", 2.6),
    ("fast", 1.2),
    ("fine", 0.8),
    ("free", 1.1),
    ("friendly", 2.2),
    ("fresh", 1.3),
    ("good", 1.9),
    ("great", 3.1),
    ("happy", 2.7),
    ("helpful", 1.8),
    ("ideal", 2.1),
    ("love", 3.2),
    ("loved", 2.9),
    ("lovely", 2.8),
    ("nice", 1.8),
    ("ok", 0.9),
    ("okay", 0.9),
    ("peaceful", 2.2),
    ("perfect", 2.7),
    ("plenty", 1.1),
    ("pleasant", 2.3),
    ("productive", 1.6),
    ("quiet", 1.2),
    ("recommend", 1.5),
    ("relaxing", 2.0),
    ("reliable", 1.6),
    ("roomy", 1.2),
    ("smooth", 1.4),
    ("solid", 1.3),
    ("spacious", 1.5),
    ("speedy", 1.4),
    ("strong", 1.5),
    ("sunny", 1.6),
    ("tasty", 2.0),
    ("welcoming", 1.8),
    ("wonderful", 2.7),
    ("yummy", 2.4),
    // negative
    ("annoying", -1.8),
    ("awful", -2.0),
    ("bad", -2.5),
    ("bitter", -1.0),
    ("broken", -1.6),
    ("burnt", -1.4),
    ("chaotic", -1.6),
    ("cold", -0.5),
    ("cramped", -1.4),
    ("crowded", -1.3),
    ("dark", -1.0),
    ("difficult", -1.5),
    ("dim", -1.0),
    ("dirty", -1.9),
    ("disappointed", -1.9),
    ("disappointing", -2.2),
    ("dropped", -0.9),
    ("expensive", -0.8),
    ("hate", -2.7),
    ("horrible", -2.5),
    ("impossible", -1.7),
    ("lacking", -1.2),
    ("limited", -0.8),
    ("loud", -0.9),
    ("mediocre", -1.3),
    ("messy", -1.5),
    ("no", -1.2),
    ("noisy", -1.2),
    ("overpriced", -1.6),
    ("packed", -1.0),
    ("poor", -2.1),
    ("rude", -2.0),
    ("slow", -1.1),
    ("spotty", -1.0),
    ("stuffy", -1.1),
    ("terrible", -2.1),
    ("tiny", -0.6),
    ("uncomfortable", -1.6),
    ("unreliable", -1.5),
    ("unusable", -2.0),
    ("weak", -1.5),
    ("worst", -3.1),
];

/// Intensity modifiers applied to the sentiment word that follows them.
static BOOSTERS: &[(&str, f64)] = &[
    ("absolutely", 0.293),
    ("extremely", 0.293),
    ("incredibly", 0.293),
    ("really", 0.293),
    ("so", 0.293),
    ("super", 0.293),
    ("totally", 0.293),
    ("very", 0.293),
    ("barely", -0.293),
    ("kinda", -0.293),
    ("slightly", -0.293),
    ("somewhat", -0.293),
];

static NEGATIONS: &[&str] = &[
    "aren't", "can't", "cannot", "couldn't", "didn't", "doesn't", "don't", "hardly", "isn't",
    "neither", "never", "no", "nor", "not", "nothing", "wasn't", "weren't", "without", "won't",
];

const NEGATION_SCALAR: f64 = -0.74;
const POLARITY_NEGATION: f64 = -0.5;
const COMPOUND_ALPHA: f64 = 15.0;
const EXCLAMATION_BOOST: f64 = 0.292;
const BOOSTER_DECAY: [f64; 3] = [1.0, 0.95, 0.9];

/// Stateless lexicon scorer.
#[derive(Debug, Clone)]
pub struct LexiconScorer {
    valences: HashMap<&'static str, f64>,
    boosters: HashMap<&'static str, f64>,
    negations: HashSet<&'static str>,
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconScorer {
    pub fn new() -> Self {
        Self {
            valences: VALENCES.iter().copied().collect(),
            boosters: BOOSTERS.iter().copied().collect(),
            negations: NEGATIONS.iter().copied().collect(),
        }
    }

    fn is_negated(&self, preceding: &[String]) -> bool {
        preceding
            .iter()
            .rev()
            .take(3)
            .any(|t| self.negations.contains(t.as_str()))
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|w| {
            w.replace('\u{2019}', "'")
                .trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect()
}

impl SentimentScorer for LexiconScorer {
    fn compound_score(&self, text: &str) -> f64 {
        let tokens = tokenize(text);
        let mut valences = Vec::with_capacity(tokens.len());

        for (i, token) in tokens.iter().enumerate() {
            let Some(&base) = self.valences.get(token.as_str()) else {
                valences.push(0.0);
                continue;
            };

            let mut v = base;
            for (distance, prev) in tokens[..i].iter().rev().take(3).enumerate() {
                if let Some(&boost) = self.boosters.get(prev.as_str()) {
                    let scaled = boost * BOOSTER_DECAY[distance];
                    v += if v > 0.0 { scaled } else { -scaled };
                }
            }
            if self.is_negated(&tokens[..i]) {
                v *= NEGATION_SCALAR;
            }
            valences.push(v);
        }

        // The clause after "but" dominates the one before it.
        if let Some(pivot) = tokens.iter().position(|t| t == "but") {
            for (i, v) in valences.iter_mut().enumerate() {
                if i < pivot {
                    *v *= 0.5;
                } else if i > pivot {
                    *v *= 1.5;
                }
            }
        }

        let mut sum: f64 = valences.iter().sum();
        if sum != 0.0 {
            let emphasis = text.matches('!').count().min(4) as f64 * EXCLAMATION_BOOST;
            sum += emphasis.copysign(sum);
        }

        clamp_finite(sum / (sum * sum + COMPOUND_ALPHA).sqrt(), -1.0, 1.0)
    }

    fn polarity_score(&self, text: &str) -> f64 {
        let tokens = tokenize(text);
        let mut total = 0.0;
        let mut count = 0usize;

        for (i, token) in tokens.iter().enumerate() {
            let Some(&base) = self.valences.get(token.as_str()) else {
                continue;
            };

            let mut p = (base / 4.0).clamp(-1.0, 1.0);
            if let Some(prev) = i.checked_sub(1).map(|j| tokens[j].as_str()) {
                if let Some(&boost) = self.boosters.get(prev) {
                    p *= 1.0 + boost;
                }
            }
            if self.is_negated(&tokens[..i]) {
                p *= POLARITY_NEGATION;
            }

            total += p;
            count += 1;
        }

        if count == 0 {
            0.0
        } else {
            clamp_finite(total / count as f64, -1.0, 1.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_neutral_text_score_zero() {
        let s = LexiconScorer::new();
        assert_eq!(s.compound_score(""), 0.0);
        assert_eq!(s.polarity_score(""), 0.0);
        assert_eq!(s.compound_score("The cafe is on the corner"), 0.0);
        assert_eq!(s.polarity_score("The cafe is on the corner"), 0.0);
    }

    #[test]
    fn test_positive_and_negative_words() {
        let s = LexiconScorer::new();
        assert!(s.compound_score("Great coffee") > 0.5);
        assert!(s.polarity_score("Great coffee") > 0.5);
        assert!(s.compound_score("Terrible wifi") < -0.3);
        assert!(s.polarity_score("Terrible wifi") < -0.3);
    }

    #[test]
    fn test_negation_flips_sign() {
        let s = LexiconScorer::new();
        assert!(s.compound_score("The wifi is not good") < 0.0);
        assert!(s.polarity_score("The wifi is not good") < 0.0);
    }

    #[test]
    fn test_booster_increases_intensity() {
        let s = LexiconScorer::new();
        assert!(s.compound_score("very good") > s.compound_score("good"));
        assert!(s.polarity_score("very good") > s.polarity_score("good"));
    }

    #[test]
    fn test_exclamation_emphasis() {
        let s = LexiconScorer::new();
        assert!(s.compound_score("good!!") > s.compound_score("good"));
    }

    #[test]
    fn test_but_shifts_weight_to_second_clause() {
        let s = LexiconScorer::new();
        assert!(s.compound_score("The coffee is good but the seats are terrible") < 0.0);
    }

    #[test]
    fn test_scores_stay_bounded() {
        let s = LexiconScorer::new();
        let text = "best best best amazing awesome perfect love love love!!!!!!";
        let c = s.compound_score(text);
        let p = s.polarity_score(text);
        assert!((-1.0..=1.0).contains(&c));
        assert!((-1.0..=1.0).contains(&p));
    }

    #[test]
    fn test_punctuation_and_case_are_ignored() {
        let s = LexiconScorer::new();
        assert_eq!(s.compound_score("GREAT,"), s.compound_score("great"));
    }
}
