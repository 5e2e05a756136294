use thiserror::Error;

/// Domain failures raised while scoring or aggregating comments.
///
/// Public operations return `anyhow::Result`; these variants can be recovered
/// with `anyhow::Error::downcast_ref::<SentimentError>()`.
#[derive(Debug, Error)]
pub enum SentimentError {
    /// The scoring method name is not one of `vader` or `ml`.
    #[error("unsupported sentiment method `{0}`, expected `vader` or `ml`")]
    UnsupportedMethod(String),

    /// The lexicon analyzer returned no compound score.
    #[error("lexicon analyzer returned no compound score")]
    MissingCompound,

    #[error("tokenization failed: {0}")]
    Tokenization(String),

    /// The classifier predicted a class id missing from its `id2label` map.
    #[error("predicted class id {0} not found in id2label map")]
    UnknownLabel(u32),

    #[error("input of {tokens} tokens exceeds the model limit of {max}")]
    InputTooLong { tokens: usize, max: usize },
}
