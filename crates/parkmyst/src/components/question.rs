//! Question step answered through `simpleAnswer` events.

use async_trait::async_trait;
use parkmyst_core::definition::{component_ref_schema, object_schema};
use parkmyst_core::{
    Component, ComponentError, ComponentName, ComponentRef, Event, EventKind, FeedId, Lifecycle,
    OutputTemplate, OutputTemplates,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

const FEED: &str = "simpleQuestion";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionData {
    question: String,
    answer: String,
    on_fail: ComponentRef,
}

/// Asks a question and waits for a `simpleAnswer` event.
///
/// An exact match completes the step; anything else dispatches `onFail` and
/// keeps waiting.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleQuestion;

#[async_trait]
impl Component for SimpleQuestion {
    fn name(&self) -> ComponentName {
        ComponentName::new("SimpleQuestion")
    }

    fn schema(&self) -> Value {
        object_schema(
            &["question", "answer", "onFail"],
            vec![
                (
                    "question",
                    json!({"type": "string", "title": "Question", "default": "Default question!"}),
                ),
                (
                    "answer",
                    json!({"type": "string", "title": "Answer", "default": "Default answer"}),
                ),
                ("onFail", component_ref_schema("Component on fail")),
            ],
        )
    }

    fn output_templates(&self) -> OutputTemplates {
        OutputTemplates::from([(
            FEED.to_string(),
            OutputTemplate::new(
                json!({"question": "This is a question?"}),
                concat!(
                    "<form>\n",
                    "    <p>{{question}}</p>\n",
                    "    <input type=\"text\" name=\"answer\">\n",
                    "    <input type=\"submit\" inputtype=\"simpleAnswer\"/>\n",
                    "</form>"
                ),
            ),
        )])
    }

    async fn on_start(&self, cx: &mut Lifecycle<'_>) -> Result<(), ComponentError> {
        cx.subscribe(EventKind::SimpleAnswer);
        if !cx.context().contains_key(FEED) {
            let data: QuestionData = cx.data()?;
            let feed = cx
                .create_feed(FEED, json!({"question": data.question}))
                .await?;
            cx.context_mut().set(FEED, feed);
        }
        Ok(())
    }

    async fn on_event(&self, cx: &mut Lifecycle<'_>, event: &Event) -> Result<(), ComponentError> {
        let Event::SimpleAnswer(payload) = event else {
            return Ok(());
        };
        let data: QuestionData = cx.data()?;
        if payload.answer == data.answer {
            cx.complete();
        } else {
            debug!("Instance {} got a wrong answer", cx.id());
            cx.dispatch(data.on_fail);
        }
        Ok(())
    }

    async fn on_clean_up(&self, cx: &mut Lifecycle<'_>) -> Result<(), ComponentError> {
        cx.unsubscribe(EventKind::SimpleAnswer);
        if let Some(feed) = cx.context_mut().take::<FeedId>(FEED) {
            cx.remove_feed(&feed).await?;
        }
        Ok(())
    }
}
