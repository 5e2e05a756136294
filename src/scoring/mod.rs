//! Per-comment sentiment scoring.
//!
//! A [`SentimentScorer`] maps one comment to a signed score in `[-1, 1]`, or
//! to `None` when it declines to score the comment. Two scorers exist:
//!
//! - [`LexiconScorer`] - VADER compound polarity, scores every comment
//! - [`ClassifierScorer`] - transformer classifier, gated by a token budget
//!
//! [`ScoringMethod`] names the two and is what callers configure.

pub mod classifier;
pub mod lexicon;

pub use classifier::{gate_tokens, ClassifierScorer, LengthPolicy, MAX_CLASSIFIER_TOKENS};
pub use lexicon::LexiconScorer;

use crate::core::SentimentError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Scores a single comment.
pub trait SentimentScorer {
    /// Signed sentiment in `[-1, 1]`, or `None` if the comment was skipped.
    fn score(&self, comment: &str) -> anyhow::Result<Option<f64>>;

    /// Scores every comment; the result has the same length and order as `comments`.
    fn score_batch(&self, comments: &[&str]) -> anyhow::Result<Vec<Option<f64>>> {
        comments.iter().map(|comment| self.score(comment)).collect()
    }
}

/// Which scorer an analyzer runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringMethod {
    /// Rule-based VADER lexicon.
    #[default]
    Vader,
    /// Pretrained transformer classifier.
    Ml,
}

impl std::fmt::Display for ScoringMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ScoringMethod::Vader => "vader",
            ScoringMethod::Ml => "ml",
        };
        write!(f, "{name}")
    }
}

impl FromStr for ScoringMethod {
    type Err = SentimentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vader" => Ok(ScoringMethod::Vader),
            "ml" => Ok(ScoringMethod::Ml),
            _ => Err(SentimentError::UnsupportedMethod(s.to_string())),
        }
    }
}

/// Convert a classifier label and its confidence into a signed score.
///
/// Labels other than positive/negative (e.g. `neutral`) map to 0.
pub fn signed_score(label: &str, confidence: f32) -> f64 {
    let confidence = f64::from(confidence);
    if label.eq_ignore_ascii_case("positive") {
        confidence
    } else if label.eq_ignore_ascii_case("negative") {
        -confidence
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_method_names() {
        assert_eq!("vader".parse::<ScoringMethod>().unwrap(), ScoringMethod::Vader);
        assert_eq!(" ML ".parse::<ScoringMethod>().unwrap(), ScoringMethod::Ml);
        assert_eq!(ScoringMethod::Ml.to_string(), "ml");
    }

    #[test]
    fn rejects_unknown_method() {
        let err = "unknown".parse::<ScoringMethod>().unwrap_err();
        assert!(matches!(err, SentimentError::UnsupportedMethod(ref name) if name == "unknown"));
    }

    #[test]
    fn method_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ScoringMethod::Vader).unwrap(), "\"vader\"");
        let method: ScoringMethod = serde_json::from_str("\"ml\"").unwrap();
        assert_eq!(method, ScoringMethod::Ml);
    }

    #[test]
    fn label_sign_follows_polarity() {
        assert!((signed_score("POSITIVE", 0.75) - 0.75).abs() < 1e-9);
        assert!((signed_score("NEGATIVE", 0.75) + 0.75).abs() < 1e-9);
        assert!((signed_score("negative", 0.5) + 0.5).abs() < 1e-9);
        assert_eq!(signed_score("neutral", 0.9), 0.0);
    }

    struct LengthScorer;

    impl SentimentScorer for LengthScorer {
        fn score(&self, comment: &str) -> anyhow::Result<Option<f64>> {
            Ok((!comment.is_empty()).then(|| 1.0 / comment.len() as f64))
        }
    }

    #[test]
    fn batch_keeps_positions_of_skipped_comments() {
        let scores = LengthScorer.score_batch(&["ab", "", "abcd"]).unwrap();
        assert_eq!(scores, vec![Some(0.5), None, Some(0.25)]);
    }
}
