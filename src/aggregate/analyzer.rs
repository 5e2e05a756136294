use super::{comments_sentiment_analysis, GroupSummary};
use crate::models::DistilBertCheckpoint;
use crate::pipelines::sentiment_analysis_pipeline::SentimentAnalysisPipelineBuilder;
use crate::pipelines::utils::DeviceRequest;
use crate::scoring::{ClassifierScorer, LengthPolicy, LexiconScorer, ScoringMethod, SentimentScorer};
use std::collections::BTreeMap;

/// Aggregates grouped comments with one configured scorer.
pub struct CommentSentimentAnalyzer {
    method: ScoringMethod,
    scorer: Box<dyn SentimentScorer + Send + Sync>,
}

impl CommentSentimentAnalyzer {
    pub fn new(method: ScoringMethod, scorer: Box<dyn SentimentScorer + Send + Sync>) -> Self {
        Self { method, scorer }
    }

    /// Lexicon analyzer; needs no model download.
    pub fn vader() -> Self {
        Self::new(ScoringMethod::Vader, Box::new(LexiconScorer::new()))
    }

    pub fn method(&self) -> ScoringMethod {
        self.method
    }

    pub fn scorer(&self) -> &(dyn SentimentScorer + Send + Sync) {
        self.scorer.as_ref()
    }

    /// Per-group summaries, keyed and ordered by group key.
    pub fn analyze<'a, I, K, S>(&self, comments: I) -> anyhow::Result<BTreeMap<String, GroupSummary>>
    where
        I: IntoIterator<Item = (&'a K, &'a Vec<S>)>,
        K: AsRef<str> + ?Sized + 'a,
        S: AsRef<str> + 'a,
    {
        let results = comments_sentiment_analysis(comments, self.scorer.as_ref())?;
        tracing::info!(method = %self.method, groups = results.len(), "aggregated comment sentiment");
        Ok(results)
    }
}

pub struct CommentSentimentAnalyzerBuilder {
    method: ScoringMethod,
    checkpoint: DistilBertCheckpoint,
    device_request: DeviceRequest,
    length_policy: LengthPolicy,
}

impl CommentSentimentAnalyzerBuilder {
    pub fn new(method: ScoringMethod) -> Self {
        Self {
            method,
            checkpoint: DistilBertCheckpoint::default(),
            device_request: DeviceRequest::Default,
            length_policy: LengthPolicy::default(),
        }
    }

    pub fn vader() -> Self {
        Self::new(ScoringMethod::Vader)
    }

    pub fn ml() -> Self {
        Self::new(ScoringMethod::Ml)
    }

    /// Classifier checkpoint for [`ScoringMethod::Ml`].
    pub fn checkpoint(mut self, checkpoint: DistilBertCheckpoint) -> Self {
        self.checkpoint = checkpoint;
        self
    }

    pub fn cpu(mut self) -> Self {
        self.device_request = DeviceRequest::Cpu;
        self
    }

    pub fn cuda_device(mut self, index: usize) -> Self {
        self.device_request = DeviceRequest::Cuda(index);
        self
    }

    pub fn device(mut self, device: candle_core::Device) -> Self {
        self.device_request = DeviceRequest::Explicit(device);
        self
    }

    /// How the classifier treats comments over its token budget.
    pub fn length_policy(mut self, length_policy: LengthPolicy) -> Self {
        self.length_policy = length_policy;
        self
    }

    /// Build the analyzer. For [`ScoringMethod::Ml`] this loads the classifier
    /// through the global model cache, downloading it on first use.
    pub async fn build(self) -> anyhow::Result<CommentSentimentAnalyzer> {
        let scorer: Box<dyn SentimentScorer + Send + Sync> = match self.method {
            ScoringMethod::Vader => Box::new(LexiconScorer::new()),
            ScoringMethod::Ml => {
                let pipeline = SentimentAnalysisPipelineBuilder::distilbert(self.checkpoint)
                    .device_request(self.device_request)
                    .build()
                    .await?;
                Box::new(ClassifierScorer::new(pipeline).with_length_policy(self.length_policy))
            }
        };

        Ok(CommentSentimentAnalyzer::new(self.method, scorer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[tokio::test]
    async fn vader_builder_needs_no_download() {
        let analyzer = CommentSentimentAnalyzerBuilder::vader().build().await.unwrap();
        assert_eq!(analyzer.method(), ScoringMethod::Vader);

        let comments = HashMap::from([("2023-01".to_string(), vec!["great".to_string()])]);
        let results = analyzer.analyze(&comments).unwrap();
        assert!(results["2023-01"].avg_sentiment > 0.0);
    }

    #[test]
    fn custom_scorer_is_used() {
        struct Constant;
        impl SentimentScorer for Constant {
            fn score(&self, _comment: &str) -> anyhow::Result<Option<f64>> {
                Ok(Some(-0.25))
            }
        }

        let analyzer = CommentSentimentAnalyzer::new(ScoringMethod::Ml, Box::new(Constant));
        let comments = HashMap::from([("2024-06", vec!["a", "b"])]);
        let results = analyzer.analyze(&comments).unwrap();

        assert_eq!(results["2024-06"].avg_sentiment, -0.25);
        assert_eq!(results["2024-06"].max_sentiment_comment, "a");
    }
}
