use tokenizers::Tokenizer;

/// A label with the classifier's confidence in it, in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SentimentResult {
    pub label: String,
    pub score: f32,
}

#[allow(async_fn_in_trait)]
pub trait SentimentAnalysisModel {
    type Options: std::fmt::Debug + Clone;

    async fn new(options: Self::Options, device: candle_core::Device) -> anyhow::Result<Self>
    where
        Self: Sized;

    fn predict(&self, tokenizer: &Tokenizer, text: &str) -> anyhow::Result<String>;

    fn predict_with_score(&self, tokenizer: &Tokenizer, text: &str) -> anyhow::Result<SentimentResult> {
        let label = self.predict(tokenizer, text)?;
        Ok(SentimentResult { label, score: 1.0 })
    }

    async fn get_tokenizer(options: Self::Options) -> anyhow::Result<Tokenizer>;

    /// Maximum encoded length, special tokens included.
    fn max_input_tokens(&self) -> usize;

    fn device(&self) -> &candle_core::Device;
}
