//! Subscription registry keyed by event kind.

use crate::event::EventKind;
use crate::id::InstanceId;
use std::collections::{BTreeSet, HashMap};
use std::sync::{PoisonError, RwLock};

/// Proof that an instance is subscribed to one event kind.
///
/// Not `Clone`: the only way to drop a subscription is to hand the handle back
/// to [`EventBus::release`], which consumes it.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a subscription handle must be released with EventBus::release"]
pub struct SubscriptionHandle {
    instance: InstanceId,
    kind: EventKind,
}

impl SubscriptionHandle {
    pub fn instance(&self) -> InstanceId {
        self.instance
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }
}

#[derive(Debug, Default)]
struct Registry {
    by_kind: HashMap<EventKind, BTreeSet<InstanceId>>,
}

/// Shared subscription manager.
///
/// Safe to use from concurrently running instances; all state sits behind
/// one lock and no call blocks while holding it.
#[derive(Debug, Default)]
pub struct EventBus {
    registry: RwLock<Registry>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `instance` for `kind`.
    ///
    /// Returns `None` when the instance was already subscribed; the existing
    /// handle stays the only one.
    pub fn subscribe(&self, instance: InstanceId, kind: EventKind) -> Option<SubscriptionHandle> {
        let mut registry = self.registry.write().unwrap_or_else(PoisonError::into_inner);
        let inserted = registry.by_kind.entry(kind).or_default().insert(instance);
        inserted.then_some(SubscriptionHandle { instance, kind })
    }

    /// Drops a subscription.
    pub fn release(&self, handle: SubscriptionHandle) {
        let mut registry = self.registry.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(set) = registry.by_kind.get_mut(&handle.kind) {
            set.remove(&handle.instance);
            if set.is_empty() {
                registry.by_kind.remove(&handle.kind);
            }
        }
    }

    /// Returns a snapshot of the instances subscribed to `kind`.
    pub fn subscribers(&self, kind: EventKind) -> Vec<InstanceId> {
        let registry = self.registry.read().unwrap_or_else(PoisonError::into_inner);
        registry
            .by_kind
            .get(&kind)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn is_subscribed(&self, instance: InstanceId, kind: EventKind) -> bool {
        let registry = self.registry.read().unwrap_or_else(PoisonError::into_inner);
        registry
            .by_kind
            .get(&kind)
            .is_some_and(|set| set.contains(&instance))
    }

    /// Every kind `instance` currently listens to.
    pub fn subscriptions_of(&self, instance: InstanceId) -> Vec<EventKind> {
        let registry = self.registry.read().unwrap_or_else(PoisonError::into_inner);
        let mut kinds: Vec<EventKind> = registry
            .by_kind
            .iter()
            .filter(|(_, set)| set.contains(&instance))
            .map(|(kind, _)| *kind)
            .collect();
        kinds.sort();
        kinds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_is_idempotent() {
        let bus = EventBus::new();
        let id = InstanceId::new(1);

        let handle = bus.subscribe(id, EventKind::SimpleAnswer);
        assert!(handle.is_some());
        assert!(bus.subscribe(id, EventKind::SimpleAnswer).is_none());
        assert_eq!(bus.subscribers(EventKind::SimpleAnswer), vec![id]);

        if let Some(handle) = handle {
            bus.release(handle);
        }
        assert!(bus.subscribers(EventKind::SimpleAnswer).is_empty());
    }

    #[test]
    fn test_release_leaves_others() {
        let bus = EventBus::new();
        let a = bus.subscribe(InstanceId::new(1), EventKind::SimpleAnswer);
        let _b = bus.subscribe(InstanceId::new(2), EventKind::SimpleAnswer);

        bus.release(a.unwrap());
        assert_eq!(
            bus.subscribers(EventKind::SimpleAnswer),
            vec![InstanceId::new(2)]
        );
        assert!(!bus.is_subscribed(InstanceId::new(1), EventKind::SimpleAnswer));
    }

    #[test]
    fn test_subscriptions_of() {
        let bus = EventBus::new();
        let id = InstanceId::new(4);
        let _answer = bus.subscribe(id, EventKind::SimpleAnswer);
        let _end = bus.subscribe(id, EventKind::GameEnd);

        assert_eq!(
            bus.subscriptions_of(id),
            vec![EventKind::GameEnd, EventKind::SimpleAnswer]
        );
        assert!(bus.subscriptions_of(InstanceId::new(5)).is_empty());
    }
}
