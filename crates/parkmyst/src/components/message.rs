//! Static content step.

use async_trait::async_trait;
use parkmyst_core::definition::object_schema;
use parkmyst_core::{
    Component, ComponentError, ComponentFlags, ComponentName, FeedId, Lifecycle, OutputTemplate,
    OutputTemplates,
};
use serde::Deserialize;
use serde_json::{json, Value};

const FEED: &str = "message";

#[derive(Debug, Deserialize)]
struct MessageData {
    message: String,
}

/// Shows an HTML message and immediately hands over to `nextComponents`.
///
/// The message stays visible: the step never completes on its own and only
/// releases its feed when it is reset or the session ends.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlMessage;

#[async_trait]
impl Component for HtmlMessage {
    fn name(&self) -> ComponentName {
        ComponentName::new("HtmlMessage")
    }

    fn schema(&self) -> Value {
        object_schema(
            &["message"],
            vec![(
                "message",
                json!({
                    "type": "string",
                    "title": "Html message",
                    "default": "<h1>Default message</h1>"
                }),
            )],
        )
    }

    fn output_templates(&self) -> OutputTemplates {
        OutputTemplates::from([(
            FEED.to_string(),
            OutputTemplate::new(
                json!({"message": "Example message!"}),
                "<div>\n    <p>{{message}}</p>\n</div>",
            ),
        )])
    }

    fn flags(&self) -> ComponentFlags {
        ComponentFlags {
            do_clean_up_on_completion: false,
            default_clean_up_enabled: false,
            ..ComponentFlags::default()
        }
    }

    async fn on_start(&self, cx: &mut Lifecycle<'_>) -> Result<(), ComponentError> {
        if !cx.context().contains_key(FEED) {
            let data: MessageData = cx.data()?;
            let feed = cx
                .create_feed(FEED, json!({"message": data.message}))
                .await?;
            cx.context_mut().set(FEED, feed);
        }
        cx.dispatch_next();
        Ok(())
    }

    // Successors were already dispatched on start.
    async fn on_completed(&self, _cx: &mut Lifecycle<'_>) -> Result<(), ComponentError> {
        Ok(())
    }

    async fn on_clean_up(&self, cx: &mut Lifecycle<'_>) -> Result<(), ComponentError> {
        if let Some(feed) = cx.context_mut().take::<FeedId>(FEED) {
            cx.remove_feed(&feed).await?;
        }
        Ok(())
    }
}
