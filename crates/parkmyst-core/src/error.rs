//! Error types for the component contract and the runtime.

use crate::id::{ComponentName, InstanceId};
use thiserror::Error;

/// The lifecycle hook an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookType {
    /// The `on_start` hook.
    OnStart,
    /// The `on_event` hook.
    OnEvent,
    /// The `on_completed` hook.
    OnCompleted,
    /// The `on_clean_up` hook.
    OnCleanUp,
}

impl std::fmt::Display for HookType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HookType::OnStart => write!(f, "on_start"),
            HookType::OnEvent => write!(f, "on_event"),
            HookType::OnCompleted => write!(f, "on_completed"),
            HookType::OnCleanUp => write!(f, "on_clean_up"),
        }
    }
}

/// A breach of the lifecycle contract by a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProtocolViolation {
    #[error("completion signalled more than once in one activation")]
    CompletedTwice,
    #[error("completion signalled from {0}, outside the started state")]
    CompleteOutsideStarted(HookType),
}

/// Failures of the feed transport.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    #[error("feed transport unavailable: {0}")]
    Unavailable(String),
    #[error("feed not found: {0}")]
    NotFound(String),
}

/// Errors returned by component hooks.
#[derive(Error, Debug)]
pub enum ComponentError {
    /// The instance configuration did not deserialise into the component's type.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),

    /// `create_feed` named a template the definition does not declare.
    #[error("unknown output template: {0}")]
    UnknownTemplate(String),

    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error("{0}")]
    Failed(String),
}

/// Errors surfaced by the runtime.
///
/// None of these abort a running session; they are collected per drive and
/// the offending instance is torn down where the error concerns it.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum EngineError {
    /// The instance's configuration was rejected; it can never be activated.
    #[error("Invalid configuration for instance {instance}: {details}")]
    Configuration {
        instance: InstanceId,
        details: String,
    },

    /// The graph document as a whole is unusable.
    #[error("Invalid graph: {0}")]
    InvalidGraph(String),

    /// A signal targeted an id that is not in the graph.
    #[error("Instance not found: {0}")]
    UnknownInstance(InstanceId),

    /// A component type is not registered.
    #[error("Component not registered: {0}")]
    UnknownComponent(ComponentName),

    #[error("Protocol violation in instance {instance}: {violation}")]
    Protocol {
        instance: InstanceId,
        violation: ProtocolViolation,
    },

    #[error("Hook '{hook_type}' failed in instance {instance}: {details}")]
    HookError {
        instance: InstanceId,
        hook_type: HookType,
        details: String,
    },

    #[error("Hook '{hook_type}' timed out in instance {instance}")]
    Timeout {
        instance: InstanceId,
        hook_type: HookType,
    },

    /// Activation of an already started instance under the reject policy.
    #[error("Instance {0} is already started")]
    Reentry(InstanceId),

    #[error("Session has ended")]
    SessionEnded,

    #[error("Signal limit of {0} reached in one drive")]
    SignalLimit(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = EngineError::HookError {
            instance: InstanceId::new(3),
            hook_type: HookType::OnEvent,
            details: "boom".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Hook 'on_event' failed in instance #3: boom"
        );

        let error = EngineError::Protocol {
            instance: InstanceId::new(1),
            violation: ProtocolViolation::CompletedTwice,
        };
        assert_eq!(
            error.to_string(),
            "Protocol violation in instance #1: completion signalled more than once in one activation"
        );
    }

    #[test]
    fn test_hook_type_display() {
        assert_eq!(HookType::OnStart.to_string(), "on_start");
        assert_eq!(HookType::OnCleanUp.to_string(), "on_clean_up");
    }

    #[test]
    fn test_component_error_from_feed() {
        let error: ComponentError = FeedError::Unavailable("closed".to_string()).into();
        assert_eq!(error.to_string(), "feed transport unavailable: closed");
    }
}
