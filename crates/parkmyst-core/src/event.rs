//! Events crossing the runtime boundary.
//!
//! Every event is `{ "type": <tag>, "data": <object> }` on the wire. The set of
//! tags is closed: a payload is either one of the variants below with a
//! well-formed `data` object, or it is rejected while deserialising and never
//! reaches a component.

use crate::id::ComponentRef;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Payload of the targeted built-in events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetPayload {
    /// The instance the signal is aimed at.
    pub target: ComponentRef,
}

/// Payload of the session end event. Always `{}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EmptyPayload {}

/// Answer submitted by a player for a question step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerPayload {
    pub answer: String,
}

/// A validated event.
///
/// # Examples
///
/// ```
/// use parkmyst_core::{Event, EventKind};
/// use serde_json::json;
///
/// let event = Event::from_value(json!({
///     "type": "simpleAnswer",
///     "data": { "answer": "4" }
/// })).unwrap();
/// assert_eq!(event.kind(), EventKind::SimpleAnswer);
///
/// // Wrong payload shape for the tag is rejected.
/// assert!(Event::from_value(json!({
///     "type": "simpleAnswer",
///     "data": { "answer": 4 }
/// })).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum Event {
    /// Activate the target instance.
    ComponentStart(TargetPayload),
    /// Drive the target instance to completion.
    ComponentEnd(TargetPayload),
    /// Force the target instance back to idle.
    ComponentReset(TargetPayload),
    /// End the whole session.
    GameEnd(EmptyPayload),
    /// A player's answer to a question step.
    SimpleAnswer(AnswerPayload),
}

impl Event {
    /// Parses and shape-checks a raw `{type, data}` value.
    pub fn from_value(raw: Value) -> Result<Self, EventError> {
        let tag = raw
            .get("type")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or(EventError::MissingType)?;
        serde_json::from_value(raw).map_err(|source| EventError::Malformed { tag, source })
    }

    pub fn start(target: impl Into<ComponentRef>) -> Self {
        Event::ComponentStart(TargetPayload {
            target: target.into(),
        })
    }

    pub fn end(target: impl Into<ComponentRef>) -> Self {
        Event::ComponentEnd(TargetPayload {
            target: target.into(),
        })
    }

    pub fn reset(target: impl Into<ComponentRef>) -> Self {
        Event::ComponentReset(TargetPayload {
            target: target.into(),
        })
    }

    pub fn game_end() -> Self {
        Event::GameEnd(EmptyPayload {})
    }

    pub fn answer(answer: impl Into<String>) -> Self {
        Event::SimpleAnswer(AnswerPayload {
            answer: answer.into(),
        })
    }

    /// Returns the discriminator of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::ComponentStart(_) => EventKind::ComponentStart,
            Event::ComponentEnd(_) => EventKind::ComponentEnd,
            Event::ComponentReset(_) => EventKind::ComponentReset,
            Event::GameEnd(_) => EventKind::GameEnd,
            Event::SimpleAnswer(_) => EventKind::SimpleAnswer,
        }
    }
}

/// Discriminator of [`Event`], used as the subscription key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    ComponentStart,
    ComponentEnd,
    ComponentReset,
    GameEnd,
    SimpleAnswer,
}

impl EventKind {
    /// Built-in kinds are routed by target, not through subscriptions.
    pub fn is_builtin(self) -> bool {
        !matches!(self, EventKind::SimpleAnswer)
    }

    /// Wire tag of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::ComponentStart => "componentStart",
            EventKind::ComponentEnd => "componentEnd",
            EventKind::ComponentReset => "componentReset",
            EventKind::GameEnd => "gameEnd",
            EventKind::SimpleAnswer => "simpleAnswer",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reasons a raw event is refused at the boundary.
#[derive(Error, Debug)]
pub enum EventError {
    #[error("event has no string 'type' field")]
    MissingType,
    #[error("malformed '{tag}' event: {source}")]
    Malformed {
        tag: String,
        #[source]
        source: serde_json::Error,
    },
}
