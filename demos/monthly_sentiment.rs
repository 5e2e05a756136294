use anyhow::Result;
use comment_sentiment::{CommentSentimentAnalyzerBuilder, ScoringMethod};
use std::collections::HashMap;
use tracing_subscriber::EnvFilter;

// Usage: cargo run --example monthly_sentiment -- [vader|ml]
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let method: ScoringMethod = std::env::args()
        .nth(1)
        .as_deref()
        .unwrap_or("vader")
        .parse()?;

    println!("Building {method} analyzer...");
    let analyzer = CommentSentimentAnalyzerBuilder::new(method).build().await?;

    let comments = HashMap::from([
        (
            "2023-01",
            vec![
                "Great release, the new editor is fantastic!",
                "Installer broke my setup. Terrible.",
                "Works fine on my machine.",
            ],
        ),
        ("2023-02", vec![]),
        (
            "2023-03",
            vec![
                "Docs are much better now, thanks",
                "Still waiting on a fix for the crash",
            ],
        ),
    ]);

    let results = analyzer.analyze(&comments)?;

    println!("\n=== Monthly Sentiment ===");
    println!("{}", serde_json::to_string_pretty(&results)?);

    Ok(())
}
