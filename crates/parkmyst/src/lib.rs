//! Runtime for branching puzzle graphs.
//!
//! A graph is a set of component instances wired together by successor
//! lists. The [`Session`] routes dispatches and events between them, drives
//! each instance through `idle -> started -> completed -> idle`, and makes
//! sure every feed and subscription an activation created is released.
//!
//! # Example
//!
//! ```rust
//! use parkmyst::prelude::*;
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let registry = Arc::new(ComponentRegistry::builtin().expect("builtin components"));
//! let session = Session::builder(registry)
//!     .instance(InstanceConfig::new(1, "StartNode").next(InstanceId::new(2)))
//!     .instance(InstanceConfig::new(2, "EndNode"))
//!     .build()
//!     .expect("valid graph");
//!
//! let report = session.start().await;
//! assert!(report.session_ended);
//! # }
//! ```

pub mod components;
mod config;
mod feeds;
mod graph;
mod registry;
mod report;
mod session;

// Re-export core types
pub use parkmyst_core::*;

pub use config::{ReentryPolicy, SessionConfig};
pub use feeds::MemoryFeeds;
pub use graph::{GraphDocument, GraphError};
pub use registry::{ComponentRegistry, RegisteredComponent, RegistryError};
pub use report::{DriveReport, Transition};
pub use session::{Session, SessionBuilder};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        Component, ComponentError, ComponentName, ComponentRef, ComponentRegistry, DriveReport,
        EngineError, Event, EventKind, InstanceConfig, InstanceId, Lifecycle, LifecycleStatus,
        Session, SessionBuilder, SessionConfig, Successors,
    };
}
