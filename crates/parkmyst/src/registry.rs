//! Explicit registry of component types.

use crate::components;
use jsonschema::Validator;
use parkmyst_core::definition::component_ref_fields;
use parkmyst_core::{
    Component, ComponentDefinition, ComponentFlags, ComponentName, ComponentRef,
    COMPONENT_ID_FORMAT,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Errors raised while registering component types.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Component already registered: {0}")]
    Duplicate(ComponentName),

    #[error("Schema of component '{name}' does not compile: {details}")]
    InvalidSchema { name: ComponentName, details: String },
}

/// A component type with its compiled configuration schema.
pub struct RegisteredComponent {
    component: Arc<dyn Component>,
    definition: ComponentDefinition,
    validator: Validator,
    ref_fields: Vec<String>,
}

impl fmt::Debug for RegisteredComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredComponent")
            .field("name", &self.definition.name)
            .field("flags", &self.definition.flags)
            .field("ref_fields", &self.ref_fields)
            .finish()
    }
}

impl RegisteredComponent {
    fn compile(component: Arc<dyn Component>) -> Result<Self, RegistryError> {
        let definition = component.definition();
        let validator = jsonschema::options()
            .with_format(COMPONENT_ID_FORMAT, is_component_id)
            .should_validate_formats(true)
            .build(&definition.schema)
            .map_err(|e| RegistryError::InvalidSchema {
                name: definition.name.clone(),
                details: e.to_string(),
            })?;
        let ref_fields = component_ref_fields(&definition.schema);
        Ok(Self {
            component,
            definition,
            validator,
            ref_fields,
        })
    }

    pub fn component(&self) -> &dyn Component {
        self.component.as_ref()
    }

    pub fn definition(&self) -> &ComponentDefinition {
        &self.definition
    }

    pub fn flags(&self) -> ComponentFlags {
        self.definition.flags
    }

    /// Checks instance `data` against the schema, reporting every failure.
    pub fn validate(&self, data: &Value) -> Result<(), String> {
        let failures: Vec<String> = self
            .validator
            .iter_errors(data)
            .map(|e| e.to_string())
            .collect();
        if failures.is_empty() {
            Ok(())
        } else {
            Err(failures.join("; "))
        }
    }

    /// Component references held in `data` fields marked as component ids.
    ///
    /// Fails on a value the schema lets through but that is not a usable
    /// reference, such as `7.0` or an id beyond the `u32` range.
    pub fn referenced_instances(&self, data: &Value) -> Result<Vec<ComponentRef>, String> {
        self.ref_fields
            .iter()
            .filter_map(|field| data.get(field).map(|value| (field, value)))
            .map(|(field, value)| {
                serde_json::from_value::<ComponentRef>(value.clone())
                    .map_err(|e| format!("field '{field}' is not a component id: {e}"))
            })
            .collect()
    }
}

/// String form of the component id format, for ids carried as text.
fn is_component_id(value: &str) -> bool {
    value.parse::<i64>().is_ok_and(|n| n >= -1)
}

/// Maps component type names to their definitions.
///
/// Built once by an initialisation routine and shared by reference; nothing
/// registers itself as a side effect of loading.
///
/// # Examples
///
/// ```
/// use parkmyst::ComponentRegistry;
///
/// let registry = ComponentRegistry::builtin().unwrap();
/// assert!(registry.get("SimpleQuestion").is_some());
/// assert!(registry.get("Unknown").is_none());
/// ```
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    components: BTreeMap<ComponentName, Arc<RegisteredComponent>>,
}

impl ComponentRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every built-in step.
    pub fn builtin() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        registry.register(components::StartNode)?;
        registry.register(components::EndNode)?;
        registry.register(components::Finisher)?;
        registry.register(components::Reseter)?;
        registry.register(components::HtmlMessage)?;
        registry.register(components::SimpleQuestion)?;
        Ok(registry)
    }

    /// Registers a component type under its own name.
    pub fn register<C: Component + 'static>(&mut self, component: C) -> Result<(), RegistryError> {
        self.register_arc(Arc::new(component))
    }

    pub fn register_arc(&mut self, component: Arc<dyn Component>) -> Result<(), RegistryError> {
        let name = component.name();
        if self.components.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }
        let registered = RegisteredComponent::compile(component)?;
        debug!("Registered component '{}'", name);
        self.components.insert(name, Arc::new(registered));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<RegisteredComponent>> {
        self.components.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &ComponentName> {
        self.components.keys()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parkmyst_core::{ComponentError, InstanceId, Lifecycle};
    use serde_json::json;

    #[derive(Debug)]
    struct BrokenSchema;

    #[async_trait]
    impl Component for BrokenSchema {
        fn name(&self) -> ComponentName {
            ComponentName::new("BrokenSchema")
        }

        fn schema(&self) -> Value {
            json!({"type": 12})
        }

        async fn on_start(&self, _cx: &mut Lifecycle<'_>) -> Result<(), ComponentError> {
            Ok(())
        }
    }

    #[test]
    fn test_builtin_registry() {
        let registry = ComponentRegistry::builtin().unwrap();
        assert_eq!(registry.len(), 6);
        assert!(registry.get("StartNode").unwrap().flags().auto_start);
        assert!(!registry.get("EndNode").unwrap().flags().auto_start);
    }

    #[test]
    fn test_duplicate_registration() {
        let mut registry = ComponentRegistry::new();
        registry.register(components::StartNode).unwrap();
        assert!(matches!(
            registry.register(components::StartNode),
            Err(RegistryError::Duplicate(_))
        ));
    }

    #[test]
    fn test_invalid_schema_is_refused() {
        let mut registry = ComponentRegistry::new();
        assert!(matches!(
            registry.register(BrokenSchema),
            Err(RegistryError::InvalidSchema { .. })
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_validate_question_data() {
        let registry = ComponentRegistry::builtin().unwrap();
        let question = registry.get("SimpleQuestion").unwrap();

        assert!(question
            .validate(&json!({"question": "2+2?", "answer": "4", "onFail": 7}))
            .is_ok());
        assert!(question
            .validate(&json!({"question": "2+2?", "answer": "4"}))
            .is_err());
        assert!(question
            .validate(&json!({"question": "2+2?", "answer": "4", "onFail": -2}))
            .is_err());
        assert!(question
            .validate(&json!({"question": "2+2?", "answer": "4", "onFail": 7, "extra": 1}))
            .is_err());
    }

    #[test]
    fn test_referenced_instances() {
        let registry = ComponentRegistry::builtin().unwrap();
        let question = registry.get("SimpleQuestion").unwrap();
        let refs = question
            .referenced_instances(&json!({"question": "q", "answer": "a", "onFail": 7}))
            .unwrap();
        assert_eq!(refs, vec![ComponentRef::Instance(InstanceId::new(7))]);

        let reseter = registry.get("Reseter").unwrap();
        assert!(reseter.validate(&json!({"toReset": 7.0})).is_ok());
        assert!(reseter.referenced_instances(&json!({"toReset": 7.0})).is_err());
        assert!(reseter
            .referenced_instances(&json!({"toReset": 5_000_000_000_i64}))
            .is_err());
    }

    #[test]
    fn test_component_id_format() {
        assert!(is_component_id("-1"));
        assert!(is_component_id("12"));
        assert!(!is_component_id("-2"));
        assert!(!is_component_id("abc"));
    }
}
