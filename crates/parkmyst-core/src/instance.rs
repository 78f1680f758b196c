//! Placed instances: configuration envelope and lifecycle status.

use crate::id::{ComponentName, InstanceId, Successors};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Configuration of one graph node placement.
///
/// # Examples
///
/// ```
/// use parkmyst_core::{InstanceConfig, InstanceId};
///
/// let config: InstanceConfig = serde_json::from_str(r#"{
///     "id": 2,
///     "type": "SimpleQuestion",
///     "nextComponents": 3,
///     "data": { "question": "2+2?", "answer": "4", "onFail": 7 }
/// }"#).unwrap();
///
/// assert_eq!(config.id, InstanceId::new(2));
/// assert_eq!(config.next_components.targets().count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceConfig {
    pub id: InstanceId,
    #[serde(rename = "type")]
    pub component: ComponentName,
    #[serde(default)]
    pub next_components: Successors,
    /// Component-specific fields, validated against the definition's schema.
    #[serde(default = "empty_object")]
    pub data: Value,
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

impl InstanceConfig {
    pub fn new(id: u32, component: impl Into<ComponentName>) -> Self {
        Self {
            id: InstanceId::new(id),
            component: component.into(),
            next_components: Successors::none(),
            data: empty_object(),
        }
    }

    pub fn next(mut self, successors: impl Into<Successors>) -> Self {
        self.next_components = successors.into();
        self
    }

    pub fn data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }
}

/// Lifecycle status of an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LifecycleStatus {
    #[default]
    Idle,
    Started,
    Completed,
    Resetting,
}

impl LifecycleStatus {
    /// `true` while the instance holds an activation that cleanup must end.
    pub fn is_live(self) -> bool {
        matches!(self, LifecycleStatus::Started | LifecycleStatus::Completed)
    }
}

impl fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleStatus::Idle => write!(f, "idle"),
            LifecycleStatus::Started => write!(f, "started"),
            LifecycleStatus::Completed => write!(f, "completed"),
            LifecycleStatus::Resetting => write!(f, "resetting"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let config: InstanceConfig =
            serde_json::from_value(json!({"id": 1, "type": "StartNode"})).unwrap();
        assert!(config.next_components.is_terminal());
        assert_eq!(config.data, json!({}));
    }

    #[test]
    fn test_builder() {
        let config = InstanceConfig::new(4, "HtmlMessage")
            .next(InstanceId::new(5))
            .data(json!({"message": "hi"}));
        assert_eq!(config.component.as_str(), "HtmlMessage");
        assert_eq!(
            config.next_components.targets().collect::<Vec<_>>(),
            vec![InstanceId::new(5)]
        );
    }

    #[test]
    fn test_status() {
        assert!(LifecycleStatus::Started.is_live());
        assert!(LifecycleStatus::Completed.is_live());
        assert!(!LifecycleStatus::Idle.is_live());
        assert_eq!(LifecycleStatus::Resetting.to_string(), "resetting");
    }
}
