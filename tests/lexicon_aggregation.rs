// Aggregation through the public API with the VADER lexicon scorer.
// Needs no network access.

use comment_sentiment::*;
use std::collections::{BTreeMap, HashMap};

fn monthly_comments() -> HashMap<String, Vec<String>> {
    let raw = [
        ("2023-03", vec!["I love this update", "It crashes all the time, awful", "ok"]),
        ("2023-01", vec!["great", "terrible"]),
        ("2023-02", vec![]),
        ("2022-12", vec!["Happy holidays everyone!", "Happy holidays everyone!"]),
    ];
    raw.into_iter()
        .map(|(key, comments)| {
            (
                key.to_string(),
                comments.into_iter().map(str::to_string).collect(),
            )
        })
        .collect()
}

fn analyze(comments: &HashMap<String, Vec<String>>) -> BTreeMap<String, GroupSummary> {
    comments_sentiment_analysis(comments, &LexiconScorer::new()).unwrap()
}

#[test]
fn great_beats_terrible() -> anyhow::Result<()> {
    let comments = HashMap::from([("2023-01", vec!["great", "terrible"])]);
    let results = comments_sentiment_analysis(&comments, &LexiconScorer::new())?;

    let summary = &results["2023-01"];
    assert!(summary.avg_sentiment > -1.0 && summary.avg_sentiment < 1.0);
    assert_eq!(summary.max_sentiment_comment, "great");
    assert_eq!(summary.min_sentiment_comment, "terrible");
    assert!(summary.max_sentiment > 0.0);
    assert!(summary.min_sentiment < 0.0);
    Ok(())
}

#[test]
fn empty_group_has_no_entry() {
    let comments = HashMap::from([("2023-02".to_string(), Vec::<String>::new())]);
    let results = analyze(&comments);
    assert!(results.is_empty());
}

#[test]
fn absent_groups_stay_absent() {
    let results = analyze(&monthly_comments());
    let keys: Vec<&str> = results.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["2022-12", "2023-01", "2023-03"]);
}

#[test]
fn duplicate_comments_report_one_text() {
    let results = analyze(&monthly_comments());
    let summary = &results["2022-12"];
    assert_eq!(summary.max_sentiment_comment, "Happy holidays everyone!");
    assert_eq!(summary.max_sentiment, summary.min_sentiment);
    assert!((summary.avg_sentiment - summary.max_sentiment).abs() < 1e-12);
}

#[test]
fn average_lies_between_extremes() {
    for summary in analyze(&monthly_comments()).values() {
        assert!(summary.min_sentiment <= summary.avg_sentiment + 1e-12);
        assert!(summary.avg_sentiment <= summary.max_sentiment + 1e-12);
        assert!((-1.0..=1.0).contains(&summary.min_sentiment));
        assert!((-1.0..=1.0).contains(&summary.max_sentiment));
    }
}

#[test]
fn reported_comments_carry_reported_scores() -> anyhow::Result<()> {
    let scorer = LexiconScorer::new();
    for summary in analyze(&monthly_comments()).values() {
        assert_eq!(scorer.compound(&summary.max_sentiment_comment)?, summary.max_sentiment);
        assert_eq!(scorer.compound(&summary.min_sentiment_comment)?, summary.min_sentiment);
    }
    Ok(())
}

#[test]
fn lexicon_scores_every_comment() -> anyhow::Result<()> {
    let long_comment = "a long and winding comment ".repeat(400);
    let texts = ["great", "terrible", "meh", long_comment.as_str()];

    let scores = LexiconScorer::new().score_batch(&texts)?;
    assert_eq!(scores.len(), texts.len());
    assert!(scores
        .iter()
        .all(|s| s.is_some_and(|s| (-1.0..=1.0).contains(&s))));
    Ok(())
}

#[test]
fn unknown_method_is_rejected() {
    let err = "unknown".parse::<ScoringMethod>().unwrap_err();
    assert!(matches!(err, SentimentError::UnsupportedMethod(_)));
}

#[tokio::test]
async fn analyzer_results_serialize_in_key_order() -> anyhow::Result<()> {
    let analyzer = CommentSentimentAnalyzerBuilder::new("vader".parse()?)
        .build()
        .await?;
    let results = analyzer.analyze(&monthly_comments())?;

    let json = serde_json::to_string(&results)?;
    let first = json.find("\"2022-12\"").unwrap();
    let second = json.find("\"2023-01\"").unwrap();
    let third = json.find("\"2023-03\"").unwrap();
    assert!(first < second && second < third);
    assert!(json.contains("\"max_sentiment_comment\""));
    Ok(())
}
