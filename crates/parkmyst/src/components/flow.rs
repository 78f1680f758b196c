//! Control-flow steps: entry, exit and the steps that steer other instances.

use async_trait::async_trait;
use parkmyst_core::definition::{component_ref_schema, object_schema};
use parkmyst_core::{Component, ComponentError, ComponentFlags, ComponentName, ComponentRef, Lifecycle};
use serde::Deserialize;
use serde_json::Value;

/// Entry point of a graph. Starts with the session and hands over at once.
#[derive(Debug, Clone, Copy, Default)]
pub struct StartNode;

#[async_trait]
impl Component for StartNode {
    fn name(&self) -> ComponentName {
        ComponentName::new("StartNode")
    }

    fn flags(&self) -> ComponentFlags {
        ComponentFlags::auto_start()
    }

    async fn on_start(&self, cx: &mut Lifecycle<'_>) -> Result<(), ComponentError> {
        cx.complete();
        Ok(())
    }
}

/// Terminal step. Completing it ends the session.
#[derive(Debug, Clone, Copy, Default)]
pub struct EndNode;

#[async_trait]
impl Component for EndNode {
    fn name(&self) -> ComponentName {
        ComponentName::new("EndNode")
    }

    async fn on_start(&self, cx: &mut Lifecycle<'_>) -> Result<(), ComponentError> {
        cx.complete();
        Ok(())
    }

    async fn on_completed(&self, cx: &mut Lifecycle<'_>) -> Result<(), ComponentError> {
        cx.end_session();
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FinisherData {
    to_finish: ComponentRef,
}

/// Forces another instance to completion, then continues.
#[derive(Debug, Clone, Copy, Default)]
pub struct Finisher;

#[async_trait]
impl Component for Finisher {
    fn name(&self) -> ComponentName {
        ComponentName::new("Finisher")
    }

    fn schema(&self) -> Value {
        object_schema(
            &["toFinish"],
            vec![("toFinish", component_ref_schema("Component to finish"))],
        )
    }

    async fn on_start(&self, cx: &mut Lifecycle<'_>) -> Result<(), ComponentError> {
        let data: FinisherData = cx.data()?;
        cx.finish(data.to_finish);
        cx.complete();
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReseterData {
    to_reset: ComponentRef,
}

/// Forces another instance back to idle, then continues.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reseter;

#[async_trait]
impl Component for Reseter {
    fn name(&self) -> ComponentName {
        ComponentName::new("Reseter")
    }

    fn schema(&self) -> Value {
        object_schema(
            &["toReset"],
            vec![("toReset", component_ref_schema("Component to reset"))],
        )
    }

    async fn on_start(&self, cx: &mut Lifecycle<'_>) -> Result<(), ComponentError> {
        let data: ReseterData = cx.data()?;
        cx.reset(data.to_reset);
        cx.complete();
        Ok(())
    }
}
