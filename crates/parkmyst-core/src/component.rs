//! The component contract.

use crate::definition::{object_schema, ComponentFlags, OutputTemplates};
use crate::error::ComponentError;
use crate::event::Event;
use crate::id::ComponentName;
use crate::lifecycle::Lifecycle;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;

/// Everything the runtime needs to know about a component type up front.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentDefinition {
    pub name: ComponentName,
    /// JSON schema for the instance `data` object.
    pub schema: Value,
    pub output_templates: OutputTemplates,
    pub flags: ComponentFlags,
}

/// A step type of the puzzle graph.
///
/// One value serves every instance of its type; per-instance state lives in
/// the [`Lifecycle`] handed to each hook. Hooks of one instance never run
/// concurrently and each runs to completion before the runtime moves on.
/// Waiting for player input means returning without signalling completion.
///
/// # Examples
///
/// ```
/// use parkmyst_core::{Component, ComponentError, ComponentFlags, ComponentName, Lifecycle};
/// use async_trait::async_trait;
///
/// #[derive(Debug)]
/// struct Passthrough;
///
/// #[async_trait]
/// impl Component for Passthrough {
///     fn name(&self) -> ComponentName {
///         ComponentName::new("Passthrough")
///     }
///
///     fn flags(&self) -> ComponentFlags {
///         ComponentFlags::auto_start()
///     }
///
///     async fn on_start(&self, cx: &mut Lifecycle<'_>) -> Result<(), ComponentError> {
///         cx.complete();
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Component: Send + Sync + Debug {
    /// Returns the component type name.
    fn name(&self) -> ComponentName;

    /// Returns the schema for instance configuration.
    ///
    /// Defaults to an empty object with no additional properties.
    fn schema(&self) -> Value {
        object_schema(&[], Vec::new())
    }

    fn output_templates(&self) -> OutputTemplates {
        OutputTemplates::new()
    }

    fn flags(&self) -> ComponentFlags {
        ComponentFlags::default()
    }

    /// Collects the static description of this component.
    fn definition(&self) -> ComponentDefinition {
        ComponentDefinition {
            name: self.name(),
            schema: self.schema(),
            output_templates: self.output_templates(),
            flags: self.flags(),
        }
    }

    /// Called once per activation on entering `started`.
    ///
    /// May be replayed after a crash; creating resources here must be
    /// skipped when the context shows they already exist.
    async fn on_start(&self, cx: &mut Lifecycle<'_>) -> Result<(), ComponentError>;

    /// Called for each subscribed event while `started`.
    async fn on_event(&self, _cx: &mut Lifecycle<'_>, _event: &Event) -> Result<(), ComponentError> {
        Ok(())
    }

    /// Called once after the runtime records `completed`.
    ///
    /// Default implementation dispatches `nextComponents`.
    async fn on_completed(&self, cx: &mut Lifecycle<'_>) -> Result<(), ComponentError> {
        cx.dispatch_next();
        Ok(())
    }

    /// Called when an activation ends for any reason.
    ///
    /// Must release what the activation created and tolerate running when
    /// nothing is left to release.
    async fn on_clean_up(&self, _cx: &mut Lifecycle<'_>) -> Result<(), ComponentError> {
        Ok(())
    }
}
