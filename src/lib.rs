//! Sentiment aggregation for comments grouped by month.
//!
//! Comments are scored either with the VADER lexicon or with a DistilBERT
//! classifier running locally on Candle, then reduced per group to average,
//! maximum and minimum sentiment.

pub mod aggregate;
pub mod core;
pub mod loaders;
pub mod models;
pub mod pipelines;
pub mod scoring;

pub use aggregate::{
    comments_sentiment_analysis, summarize_group, CommentSentimentAnalyzer,
    CommentSentimentAnalyzerBuilder, GroupSummary,
};
pub use crate::core::SentimentError;
pub use scoring::{ClassifierScorer, LengthPolicy, LexiconScorer, ScoringMethod, SentimentScorer};
