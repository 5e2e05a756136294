use super::SentimentScorer;
use crate::core::SentimentError;
use vader_sentiment::SentimentIntensityAnalyzer;

/// VADER compound polarity scorer.
///
/// Scores every comment as-is: no truncation, no length limit, no
/// preprocessing beyond what VADER does itself.
pub struct LexiconScorer {
    analyzer: SentimentIntensityAnalyzer<'static>,
}

impl LexiconScorer {
    pub fn new() -> Self {
        Self {
            analyzer: SentimentIntensityAnalyzer::new(),
        }
    }

    /// The compound score for `comment`, in `[-1, 1]`.
    pub fn compound(&self, comment: &str) -> anyhow::Result<f64> {
        let polarity = self.analyzer.polarity_scores(comment);
        let compound = polarity
            .get("compound")
            .copied()
            .ok_or(SentimentError::MissingCompound)?;
        Ok(compound)
    }
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentScorer for LexiconScorer {
    fn score(&self, comment: &str) -> anyhow::Result<Option<f64>> {
        self.compound(comment).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polarity_direction() {
        let scorer = LexiconScorer::new();
        assert!(scorer.compound("great").unwrap() > 0.0);
        assert!(scorer.compound("terrible").unwrap() < 0.0);
        assert_eq!(scorer.compound("the table").unwrap(), 0.0);
    }

    #[test]
    fn scores_stay_bounded() {
        let scorer = LexiconScorer::new();
        let comments = [
            "GREAT!!! best thing ever, love love love it :)",
            "awful, horrible, disgusting, the worst!!!",
            "meh",
        ];
        for score in scorer.score_batch(&comments).unwrap() {
            let score = score.unwrap();
            assert!((-1.0..=1.0).contains(&score));
        }
    }
}
