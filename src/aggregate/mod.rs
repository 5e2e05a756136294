//! Monthly comment sentiment aggregation.
//!
//! Comments arrive grouped by a year-month key. Every comment in a group is
//! scored, and the scored comments are reduced to the group's average,
//! maximum and minimum sentiment, with the comment text behind each extreme.
//!
//! ## Main Types
//!
//! - [`CommentSentimentAnalyzer`] - Owns a scorer and aggregates groups
//! - [`CommentSentimentAnalyzerBuilder`] - Picks the method, device and length policy
//! - [`GroupSummary`] - Per-group statistics
//!
//! ## Usage Example
//!
//! ```rust
//! use comment_sentiment::aggregate::CommentSentimentAnalyzerBuilder;
//! use std::collections::HashMap;
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let analyzer = CommentSentimentAnalyzerBuilder::vader().build().await?;
//!
//! let comments = HashMap::from([
//!     ("2023-01", vec!["great", "terrible"]),
//!     ("2023-02", vec![]),
//! ]);
//! let results = analyzer.analyze(&comments)?;
//!
//! assert_eq!(results["2023-01"].max_sentiment_comment, "great");
//! assert!(!results.contains_key("2023-02"));
//! # Ok(())
//! # }
//! ```

pub mod analyzer;
pub mod summary;

pub use analyzer::{CommentSentimentAnalyzer, CommentSentimentAnalyzerBuilder};
pub use summary::{summarize_group, GroupSummary};

use crate::scoring::SentimentScorer;
use std::collections::BTreeMap;

/// Score and summarize every group of comments.
///
/// Empty groups, and groups where the scorer skipped every comment, are left
/// out of the result. The returned map iterates in ascending key order.
pub fn comments_sentiment_analysis<'a, I, K, S>(
    comments: I,
    scorer: &dyn SentimentScorer,
) -> anyhow::Result<BTreeMap<String, GroupSummary>>
where
    I: IntoIterator<Item = (&'a K, &'a Vec<S>)>,
    K: AsRef<str> + ?Sized + 'a,
    S: AsRef<str> + 'a,
{
    let mut results = BTreeMap::new();

    for (key, group) in comments {
        let key = key.as_ref();
        if group.is_empty() {
            continue;
        }

        let texts: Vec<&str> = group.iter().map(AsRef::as_ref).collect();
        let scores = scorer.score_batch(&texts)?;
        anyhow::ensure!(
            scores.len() == texts.len(),
            "scorer returned {} scores for {} comments in group {key}",
            scores.len(),
            texts.len()
        );

        match summarize_group(&texts, &scores) {
            Some(summary) => {
                results.insert(key.to_string(), summary);
            }
            None => {
                tracing::debug!(group = key, comments = texts.len(), "every comment skipped, omitting group");
            }
        }
    }

    Ok(results)
}
