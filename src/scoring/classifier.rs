use super::{signed_score, SentimentScorer};
use crate::models::SentimentDistilBertModel;
use crate::pipelines::sentiment_analysis_pipeline::{SentimentAnalysisModel, SentimentAnalysisPipeline};

/// Sub-word tokens a comment may carry into the classifier: 512 positions
/// minus `[CLS]` and `[SEP]`.
pub const MAX_CLASSIFIER_TOKENS: usize = 510;

/// What to do with a comment whose token count reaches the budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LengthPolicy {
    /// Produce no score for the comment.
    #[default]
    Skip,
    /// Classify the first `budget` tokens.
    Truncate,
}

/// Tokens to classify, or `None` when the comment is skipped.
///
/// Comments with `budget` tokens or more are over budget.
pub fn gate_tokens(ids: &[u32], budget: usize, policy: LengthPolicy) -> Option<&[u32]> {
    if ids.len() < budget {
        return Some(ids);
    }
    match policy {
        LengthPolicy::Skip => None,
        LengthPolicy::Truncate => Some(&ids[..budget]),
    }
}

/// Transformer classifier scorer.
///
/// Each comment is tokenized, gated against [`MAX_CLASSIFIER_TOKENS`],
/// detokenized and classified; the label's confidence becomes a signed score.
pub struct ClassifierScorer<M: SentimentAnalysisModel = SentimentDistilBertModel> {
    pipeline: SentimentAnalysisPipeline<M>,
    length_policy: LengthPolicy,
}

impl<M: SentimentAnalysisModel> ClassifierScorer<M> {
    pub fn new(pipeline: SentimentAnalysisPipeline<M>) -> Self {
        Self {
            pipeline,
            length_policy: LengthPolicy::default(),
        }
    }

    pub fn with_length_policy(mut self, length_policy: LengthPolicy) -> Self {
        self.length_policy = length_policy;
        self
    }

    pub fn length_policy(&self) -> LengthPolicy {
        self.length_policy
    }

    pub fn pipeline(&self) -> &SentimentAnalysisPipeline<M> {
        &self.pipeline
    }
}

impl<M: SentimentAnalysisModel> SentimentScorer for ClassifierScorer<M> {
    fn score(&self, comment: &str) -> anyhow::Result<Option<f64>> {
        let ids = self.pipeline.tokenize(comment)?;

        let Some(kept) = gate_tokens(&ids, MAX_CLASSIFIER_TOKENS, self.length_policy) else {
            tracing::debug!(
                tokens = ids.len(),
                budget = MAX_CLASSIFIER_TOKENS,
                "skipping comment over the classifier token budget"
            );
            return Ok(None);
        };

        let text = self.pipeline.detokenize(kept)?;
        let prediction = self.pipeline.predict(&text)?;

        Ok(Some(signed_score(&prediction.label, prediction.score)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_input_passes_untouched() {
        let ids: Vec<u32> = (0..509).collect();
        assert_eq!(
            gate_tokens(&ids, MAX_CLASSIFIER_TOKENS, LengthPolicy::Skip),
            Some(ids.as_slice())
        );
    }

    #[test]
    fn budget_boundary_is_skipped() {
        let ids: Vec<u32> = (0..510).collect();
        assert_eq!(gate_tokens(&ids, MAX_CLASSIFIER_TOKENS, LengthPolicy::Skip), None);
    }

    #[test]
    fn truncate_keeps_leading_tokens() {
        let ids: Vec<u32> = (0..700).collect();
        let kept = gate_tokens(&ids, MAX_CLASSIFIER_TOKENS, LengthPolicy::Truncate).unwrap();
        assert_eq!(kept.len(), MAX_CLASSIFIER_TOKENS);
        assert_eq!(kept.first(), Some(&0));
        assert_eq!(kept.last(), Some(&509));
    }

    #[test]
    fn empty_comment_is_classified() {
        assert_eq!(
            gate_tokens(&[], MAX_CLASSIFIER_TOKENS, LengthPolicy::Skip),
            Some(&[][..])
        );
    }
}
