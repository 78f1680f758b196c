//! A small quiz: a welcome message, one question with a retry hint, and an end node.

use parkmyst::prelude::*;
use parkmyst::{GraphDocument, MemoryFeeds};
use std::sync::Arc;

const GRAPH: &str = r#"{
    "session": { "reentry": "coalesce", "hookTimeoutMs": 1000 },
    "components": [
        { "id": 1, "type": "StartNode", "nextComponents": [2] },
        { "id": 2, "type": "HtmlMessage", "nextComponents": [3],
          "data": { "message": "<h1>Welcome to the park!</h1>" } },
        { "id": 3, "type": "SimpleQuestion", "nextComponents": [5],
          "data": { "question": "What is 2+2?", "answer": "4", "onFail": 4 } },
        { "id": 4, "type": "HtmlMessage",
          "data": { "message": "<p>Not quite, try again.</p>" } },
        { "id": 5, "type": "EndNode" }
    ]
}"#;

fn summarize(label: &str, report: &DriveReport) {
    println!(
        "{label}: activated {:?}, completed {:?}, errors {}",
        report.activated,
        report.completed,
        report.errors.len()
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let feeds = Arc::new(MemoryFeeds::new());
    let session = Session::builder(Arc::new(ComponentRegistry::builtin()?))
        .feeds(feeds.clone())
        .graph(GraphDocument::from_json_str(GRAPH)?)
        .build()?;

    summarize("start", &session.start().await);
    println!("Feeds on screen: {}", feeds.live_count());

    for answer in ["5", "4"] {
        let report = session
            .publish_json(serde_json::json!({ "type": "simpleAnswer", "data": { "answer": answer } }))
            .await;
        summarize(&format!("answer {answer}"), &report);
    }

    if session.is_ended() {
        println!("Session ended, feeds left: {}", feeds.live_count());
    }
    Ok(())
}
