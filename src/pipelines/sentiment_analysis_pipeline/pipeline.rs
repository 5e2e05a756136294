use super::model::{SentimentAnalysisModel, SentimentResult};
use crate::core::SentimentError;
use tokenizers::Tokenizer;

pub struct SentimentAnalysisPipeline<M: SentimentAnalysisModel> {
    pub(crate) model: M,
    pub(crate) tokenizer: Tokenizer,
}

impl<M: SentimentAnalysisModel> SentimentAnalysisPipeline<M> {
    /// Predict sentiment with structured result containing label and confidence score
    pub fn predict(&self, text: &str) -> anyhow::Result<SentimentResult> {
        self.model.predict_with_score(&self.tokenizer, text)
    }

    /// Sub-word token ids for `text`, without `[CLS]`/`[SEP]`.
    pub fn tokenize(&self, text: &str) -> anyhow::Result<Vec<u32>> {
        let encoding = self
            .tokenizer
            .encode(text, false)
            .map_err(|e| SentimentError::Tokenization(e.to_string()))?;
        Ok(encoding.get_ids().to_vec())
    }

    /// Turn token ids back into text, dropping special tokens.
    pub fn detokenize(&self, ids: &[u32]) -> anyhow::Result<String> {
        self.tokenizer
            .decode(ids, true)
            .map_err(|e| SentimentError::Tokenization(e.to_string()).into())
    }

    pub fn max_input_tokens(&self) -> usize {
        self.model.max_input_tokens()
    }

    pub fn device(&self) -> &candle_core::Device {
        self.model.device()
    }
}
