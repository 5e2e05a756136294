use serde::{Deserialize, Serialize};

/// Sentiment statistics for one group of comments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub avg_sentiment: f64,
    pub max_sentiment_comment: String,
    pub max_sentiment: f64,
    pub min_sentiment_comment: String,
    pub min_sentiment: f64,
}

/// Reduce aligned `(comment, score)` pairs to a [`GroupSummary`].
///
/// `scores[i]` belongs to `comments[i]`; unscored comments are ignored. Ties
/// on max or min go to the earliest comment. Returns `None` when no comment
/// carries a score.
pub fn summarize_group<S: AsRef<str>>(comments: &[S], scores: &[Option<f64>]) -> Option<GroupSummary> {
    let mut scored = comments
        .iter()
        .zip(scores)
        .filter_map(|(comment, score)| score.map(|score| (comment.as_ref(), score)));

    let first = scored.next()?;
    let (mut max, mut min) = (first, first);
    let mut sum = first.1;
    let mut count = 1usize;

    for (comment, score) in scored {
        sum += score;
        count += 1;
        if score > max.1 {
            max = (comment, score);
        }
        if score < min.1 {
            min = (comment, score);
        }
    }

    Some(GroupSummary {
        avg_sentiment: sum / count as f64,
        max_sentiment_comment: max.0.to_string(),
        max_sentiment: max.1,
        min_sentiment_comment: min.0.to_string(),
        min_sentiment: min.1,
    })
}
