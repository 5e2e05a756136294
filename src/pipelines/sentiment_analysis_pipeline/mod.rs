//! Sentiment analysis pipeline for classifying text emotional tone.
//!
//! This module runs a pre-trained transformer classifier over a single text
//! and returns its label together with a confidence score. The comment
//! scorers use it to turn classifier output into signed sentiment.
//!
//! ## Main Types
//!
//! - [`SentimentAnalysisPipeline`] - High-level interface for sentiment classification
//! - [`SentimentAnalysisPipelineBuilder`] - Builder pattern for pipeline configuration
//! - [`SentimentAnalysisModel`] - Trait for sentiment analysis model implementations
//! - [`DistilBertCheckpoint`] - Available classifier checkpoints
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use comment_sentiment::pipelines::sentiment_analysis_pipeline::*;
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let pipeline = SentimentAnalysisPipelineBuilder::distilbert(DistilBertCheckpoint::Sst2English)
//!     .cpu()
//!     .build()
//!     .await?;
//!
//! let result = pipeline.predict("I love this product!")?;
//! println!("Sentiment: {} (confidence: {:.2})", result.label, result.score);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod model;
pub mod pipeline;

pub use builder::SentimentAnalysisPipelineBuilder;
pub use model::{SentimentAnalysisModel, SentimentResult};
pub use pipeline::SentimentAnalysisPipeline;

pub use crate::models::{DistilBertCheckpoint, SentimentDistilBertModel};
