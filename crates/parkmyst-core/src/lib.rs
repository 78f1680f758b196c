//! Core contract of the parkmyst puzzle graph runtime.
//!
//! This crate provides the types a step implementation needs and nothing that
//! drives execution. Depend on it to write custom components.
//!
//! # Core Types
//!
//! - [`Component`] - The lifecycle contract every step implements
//! - [`Lifecycle`] - Per-hook access to configuration, context, feeds and subscriptions
//! - [`InstanceContext`] - Private state of one instance activation
//! - [`EventBus`] - Subscription registry keyed by [`EventKind`]
//! - [`Event`] - Closed set of events crossing the runtime boundary
//! - [`Successors`] / [`ComponentRef`] - Successor lists with the `-1` sentinel
//! - [`EngineError`] - Runtime error taxonomy

mod bus;
mod component;
mod context;
pub mod definition;
mod error;
mod event;
mod feed;
mod id;
mod instance;
mod lifecycle;

pub use bus::{EventBus, SubscriptionHandle};
pub use component::{Component, ComponentDefinition};
pub use context::{ContextKey, InstanceContext};
pub use definition::{
    ComponentFlags, OutputTemplate, OutputTemplates, PlayerPermission, COMPONENT_ID_FORMAT,
};
pub use error::{ComponentError, EngineError, FeedError, HookType, ProtocolViolation};
pub use event::{AnswerPayload, EmptyPayload, Event, EventError, EventKind, TargetPayload};
pub use feed::{FeedRequest, FeedService};
pub use id::{ComponentName, ComponentRef, FeedId, InstanceId, Successors};
pub use instance::{InstanceConfig, LifecycleStatus};
pub use lifecycle::{Effect, Lifecycle, Resources, Services};
