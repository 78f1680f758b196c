//! Static description of a component type.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Schema `format` tag marking a field that holds a component reference.
pub const COMPONENT_ID_FORMAT: &str = "component-id";

/// Minimum player permission needed to see a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlayerPermission {
    #[default]
    User,
    Moderator,
    Admin,
}

/// A named output a component may render as a feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputTemplate {
    /// Sample data for authoring tools.
    pub example: Value,
    /// Display template rendered by the feed transport.
    pub display: String,
    pub permission: PlayerPermission,
}

impl OutputTemplate {
    pub fn new(example: Value, display: impl Into<String>) -> Self {
        Self {
            example,
            display: display.into(),
            permission: PlayerPermission::User,
        }
    }

    pub fn with_permission(mut self, permission: PlayerPermission) -> Self {
        self.permission = permission;
        self
    }
}

/// Output templates of a component, by name.
pub type OutputTemplates = BTreeMap<String, OutputTemplate>;

/// Lifecycle flags of a component type.
///
/// # Examples
///
/// ```
/// use parkmyst_core::ComponentFlags;
///
/// let flags = ComponentFlags::default();
/// assert!(!flags.auto_start);
/// assert!(flags.do_clean_up_on_completion);
/// assert!(flags.default_clean_up_enabled);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComponentFlags {
    /// May leave `idle` without an inbound dispatch.
    pub auto_start: bool,
    /// Run cleanup right after `on_completed`.
    pub do_clean_up_on_completion: bool,
    /// Release feeds the component left behind in its own `on_clean_up`.
    pub default_clean_up_enabled: bool,
}

impl Default for ComponentFlags {
    fn default() -> Self {
        Self {
            auto_start: false,
            do_clean_up_on_completion: true,
            default_clean_up_enabled: true,
        }
    }
}

impl ComponentFlags {
    pub fn auto_start() -> Self {
        Self {
            auto_start: true,
            ..Self::default()
        }
    }
}

/// Schema fragment for a component reference field.
pub fn component_ref_schema(title: &str) -> Value {
    json!({
        "type": "integer",
        "title": title,
        "default": -1,
        "minimum": -1,
        "format": COMPONENT_ID_FORMAT
    })
}

/// Object schema forbidding additional properties.
///
/// `properties` is a list of `(name, schema)` pairs; `required` names the
/// fields that must be present.
///
/// # Examples
///
/// ```
/// use parkmyst_core::definition::{component_ref_schema, object_schema};
/// use serde_json::json;
///
/// let schema = object_schema(
///     &["toReset"],
///     vec![("toReset", component_ref_schema("Component to reset"))],
/// );
/// assert_eq!(schema["additionalProperties"], json!(false));
/// assert_eq!(schema["required"], json!(["toReset"]));
/// ```
pub fn object_schema(required: &[&str], properties: Vec<(&str, Value)>) -> Value {
    let properties: serde_json::Map<String, Value> = properties
        .into_iter()
        .map(|(name, schema)| (name.to_string(), schema))
        .collect();
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "additionalProperties": false,
        "required": required,
        "properties": properties
    })
}

/// Names of top-level properties in `schema` that hold component references.
///
/// Follows local `$ref`s of the form `#/definitions/<name>`.
pub fn component_ref_fields(schema: &Value) -> Vec<String> {
    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Vec::new();
    };
    properties
        .iter()
        .filter(|(_, prop)| is_component_ref(schema, prop))
        .map(|(name, _)| name.clone())
        .collect()
}

fn is_component_ref(root: &Value, prop: &Value) -> bool {
    if prop.get("format").and_then(Value::as_str) == Some(COMPONENT_ID_FORMAT) {
        return true;
    }
    prop.get("$ref")
        .and_then(Value::as_str)
        .and_then(|r| r.strip_prefix("#/definitions/"))
        .and_then(|name| root.get("definitions").and_then(|d| d.get(name)))
        .and_then(|def| def.get("format"))
        .and_then(Value::as_str)
        == Some(COMPONENT_ID_FORMAT)
}
