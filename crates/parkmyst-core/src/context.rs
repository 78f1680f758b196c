//! Instance-scoped state slots.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

/// Type-safe context key wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContextKey(String);

impl ContextKey {
    /// Creates a new ContextKey.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ContextKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ContextKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::borrow::Borrow<str> for ContextKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Private state of one component instance.
///
/// Lives for one activation: it is created empty the first time a hook
/// touches it and dropped when the instance is cleaned up, so the next
/// `on_start` of the same instance always sees an empty context.
///
/// Each key holds one typed slot. Writing a slot replaces its whole value.
///
/// # Examples
///
/// ```
/// use parkmyst_core::InstanceContext;
///
/// #[derive(Debug, PartialEq)]
/// struct Attempts(u32);
///
/// let mut ctx = InstanceContext::new();
/// assert_eq!(ctx.get::<Attempts>("attempts"), None);
///
/// ctx.set("attempts", Attempts(1));
/// ctx.set("attempts", Attempts(2));
/// assert_eq!(ctx.get::<Attempts>("attempts"), Some(&Attempts(2)));
///
/// // Wrong type reads as empty
/// assert_eq!(ctx.get::<u32>("attempts"), None);
/// ```
#[derive(Default)]
pub struct InstanceContext {
    slots: HashMap<ContextKey, Box<dyn Any + Send + Sync>>,
}

impl fmt::Debug for InstanceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceContext")
            .field("keys", &self.slots.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl InstanceContext {
    /// Creates a new empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the value of a slot.
    pub fn set<T: Any + Send + Sync>(&mut self, key: impl Into<ContextKey>, value: T) {
        self.slots.insert(key.into(), Box::new(value));
    }

    /// Returns the slot value, or `None` if unset or of another type.
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.slots.get(key).and_then(|v| v.downcast_ref::<T>())
    }

    pub fn get_mut<T: Any>(&mut self, key: &str) -> Option<&mut T> {
        self.slots.get_mut(key).and_then(|v| v.downcast_mut::<T>())
    }

    /// Removes a slot and returns its value if it had type `T`.
    pub fn take<T: Any>(&mut self, key: &str) -> Option<T> {
        self.slots
            .remove(key)
            .and_then(|v| v.downcast::<T>().ok())
            .map(|b| *b)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.slots.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_before_write_is_empty() {
        let ctx = InstanceContext::new();
        assert!(ctx.is_empty());
        assert_eq!(ctx.get::<String>("feed"), None);
    }

    #[test]
    fn test_write_replaces_slot() {
        let mut ctx = InstanceContext::new();
        ctx.set("feed", "a".to_string());
        ctx.set("feed", 7u32);

        assert_eq!(ctx.get::<String>("feed"), None);
        assert_eq!(ctx.get::<u32>("feed"), Some(&7));
        assert_eq!(ctx.len(), 1);
    }

    #[test]
    fn test_get_mut_and_take() {
        let mut ctx = InstanceContext::new();
        ctx.set("count", 0i32);

        if let Some(count) = ctx.get_mut::<i32>("count") {
            *count += 1;
        }
        assert_eq!(ctx.take::<i32>("count"), Some(1));
        assert!(!ctx.contains_key("count"));
    }

    #[test]
    fn test_clear() {
        let mut ctx = InstanceContext::new();
        ctx.set("a", 1u8);
        ctx.set("b", 2u8);
        ctx.clear();
        assert!(ctx.is_empty());
    }
}
