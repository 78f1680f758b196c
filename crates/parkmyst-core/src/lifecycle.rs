//! The handle every lifecycle hook receives.

use crate::bus::{EventBus, SubscriptionHandle};
use crate::context::InstanceContext;
use crate::definition::OutputTemplates;
use crate::error::{ComponentError, HookType};
use crate::event::{Event, EventKind};
use crate::feed::{FeedRequest, FeedService};
use crate::id::{ComponentRef, FeedId, InstanceId, Successors};
use crate::instance::InstanceConfig;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;

/// Something a hook asked the runtime to do once it returns.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Record `completed` and run `on_completed`.
    Complete,
    /// Activate each successor in order.
    Dispatch(Successors),
    /// Publish an event.
    Emit(Event),
}

/// Feeds and subscriptions an instance currently owns.
#[derive(Debug, Default)]
pub struct Resources {
    feeds: Vec<FeedId>,
    subscriptions: BTreeMap<EventKind, SubscriptionHandle>,
}

impl Resources {
    pub fn feeds(&self) -> &[FeedId] {
        &self.feeds
    }

    /// Hands over every owned feed, leaving none recorded.
    pub fn take_feeds(&mut self) -> Vec<FeedId> {
        std::mem::take(&mut self.feeds)
    }

    pub fn is_subscribed(&self, kind: EventKind) -> bool {
        self.subscriptions.contains_key(&kind)
    }

    pub fn subscriptions(&self) -> impl Iterator<Item = EventKind> + '_ {
        self.subscriptions.keys().copied()
    }

    /// Releases every subscription on `bus` and returns how many there were.
    pub fn revoke_subscriptions(&mut self, bus: &EventBus) -> usize {
        let handles = std::mem::take(&mut self.subscriptions);
        let count = handles.len();
        for handle in handles.into_values() {
            bus.release(handle);
        }
        count
    }

    pub fn is_empty(&self) -> bool {
        self.feeds.is_empty() && self.subscriptions.is_empty()
    }
}

/// Shared services a hook may call.
#[derive(Clone, Copy)]
pub struct Services<'a> {
    pub feeds: &'a dyn FeedService,
    pub bus: &'a EventBus,
}

/// Access to an instance while one of its hooks runs.
///
/// Reads configuration and context, owns feed and subscription calls, and
/// collects the [`Effect`]s the runtime applies after the hook returns.
pub struct Lifecycle<'a> {
    hook: HookType,
    config: &'a InstanceConfig,
    templates: &'a OutputTemplates,
    /// `None` until the first write of this activation.
    context: &'a mut Option<InstanceContext>,
    empty: InstanceContext,
    resources: &'a mut Resources,
    services: Services<'a>,
    effects: Vec<Effect>,
}

impl<'a> Lifecycle<'a> {
    pub fn new(
        hook: HookType,
        config: &'a InstanceConfig,
        templates: &'a OutputTemplates,
        context: &'a mut Option<InstanceContext>,
        resources: &'a mut Resources,
        services: Services<'a>,
    ) -> Self {
        Self {
            hook,
            config,
            templates,
            context,
            empty: InstanceContext::new(),
            resources,
            services,
            effects: Vec::new(),
        }
    }

    pub fn id(&self) -> InstanceId {
        self.config.id
    }

    /// The hook currently running.
    pub fn hook(&self) -> HookType {
        self.hook
    }

    /// Deserialises the component-specific configuration.
    pub fn data<T: DeserializeOwned>(&self) -> Result<T, ComponentError> {
        Ok(serde_json::from_value(self.config.data.clone())?)
    }

    pub fn raw_data(&self) -> &Value {
        &self.config.data
    }

    pub fn next_components(&self) -> &Successors {
        &self.config.next_components
    }

    /// Reads the context. An activation that never wrote sees it empty.
    pub fn context(&self) -> &InstanceContext {
        self.context.as_ref().unwrap_or(&self.empty)
    }

    /// Mutable access; creates the context on first use.
    pub fn context_mut(&mut self) -> &mut InstanceContext {
        self.context.get_or_insert_with(InstanceContext::new)
    }

    /// Feeds this instance owns right now.
    pub fn feeds(&self) -> &[FeedId] {
        self.resources.feeds()
    }

    /// Creates a feed from one of the definition's output templates.
    pub async fn create_feed(
        &mut self,
        template: &str,
        data: Value,
    ) -> Result<FeedId, ComponentError> {
        let output = self
            .templates
            .get(template)
            .ok_or_else(|| ComponentError::UnknownTemplate(template.to_string()))?;
        let request = FeedRequest {
            owner: self.config.id,
            template: template.to_string(),
            permission: output.permission,
            data,
        };
        let feed = self.services.feeds.create_feed(request).await?;
        self.resources.feeds.push(feed.clone());
        Ok(feed)
    }

    /// Removes a feed this instance owns.
    ///
    /// Returns `false` without calling the transport when the handle is not
    /// owned, e.g. because it was already removed.
    pub async fn remove_feed(&mut self, feed: &FeedId) -> Result<bool, ComponentError> {
        let Some(pos) = self.resources.feeds.iter().position(|f| f == feed) else {
            return Ok(false);
        };
        let owned = self.resources.feeds.remove(pos);
        if let Err(err) = self.services.feeds.remove_feed(&owned).await {
            self.resources.feeds.insert(pos, owned);
            return Err(err.into());
        }
        Ok(true)
    }

    /// Starts listening to `kind`. Subscribing twice is the same as once.
    pub fn subscribe(&mut self, kind: EventKind) {
        if self.resources.is_subscribed(kind) {
            return;
        }
        if let Some(handle) = self.services.bus.subscribe(self.config.id, kind) {
            self.resources.subscriptions.insert(kind, handle);
        }
    }

    /// Stops listening to `kind`; a no-op when not subscribed.
    pub fn unsubscribe(&mut self, kind: EventKind) -> bool {
        match self.resources.subscriptions.remove(&kind) {
            Some(handle) => {
                self.services.bus.release(handle);
                true
            }
            None => false,
        }
    }

    pub fn is_subscribed(&self, kind: EventKind) -> bool {
        self.resources.is_subscribed(kind)
    }

    /// Signals that this activation is complete.
    pub fn complete(&mut self) {
        self.effects.push(Effect::Complete);
    }

    /// Activates the given successors once the hook returns.
    pub fn dispatch(&mut self, successors: impl Into<Successors>) {
        self.effects.push(Effect::Dispatch(successors.into()));
    }

    /// Activates the configured `nextComponents`.
    pub fn dispatch_next(&mut self) {
        let next = self.config.next_components.clone();
        self.effects.push(Effect::Dispatch(next));
    }

    pub fn emit(&mut self, event: Event) {
        self.effects.push(Effect::Emit(event));
    }

    /// Forces `target` to completion.
    pub fn finish(&mut self, target: ComponentRef) {
        self.emit(Event::end(target));
    }

    /// Forces `target` back to idle.
    pub fn reset(&mut self, target: ComponentRef) {
        self.emit(Event::reset(target));
    }

    /// Ends the whole session.
    pub fn end_session(&mut self) {
        self.emit(Event::game_end());
    }

    /// Effects produced so far, in order.
    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    pub fn into_effects(self) -> Vec<Effect> {
        self.effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::OutputTemplate;
    use crate::error::FeedError;
    use async_trait::async_trait;
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingFeeds {
        created: AtomicUsize,
        removed: AtomicUsize,
    }

    #[async_trait]
    impl FeedService for CountingFeeds {
        async fn create_feed(&self, request: FeedRequest) -> Result<FeedId, FeedError> {
            let n = self.created.fetch_add(1, Ordering::SeqCst);
            Ok(FeedId::new(format!("{}-{n}", request.template)))
        }

        async fn remove_feed(&self, _feed: &FeedId) -> Result<(), FeedError> {
            self.removed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn templates() -> OutputTemplates {
        let mut templates = OutputTemplates::new();
        templates.insert(
            "message".to_string(),
            OutputTemplate::new(json!({"message": "x"}), "<p>{{message}}</p>"),
        );
        templates
    }

    #[tokio::test]
    async fn test_feed_ledger() {
        let config = InstanceConfig::new(1, "HtmlMessage");
        let templates = templates();
        let feeds = CountingFeeds::default();
        let bus = EventBus::new();
        let mut context = None;
        let mut resources = Resources::default();
        let mut cx = Lifecycle::new(
            HookType::OnStart,
            &config,
            &templates,
            &mut context,
            &mut resources,
            Services {
                feeds: &feeds,
                bus: &bus,
            },
        );

        let feed = cx.create_feed("message", json!({"message": "hi"})).await.unwrap();
        assert_eq!(cx.feeds().len(), 1);
        assert!(matches!(
            cx.create_feed("nope", json!({})).await,
            Err(ComponentError::UnknownTemplate(_))
        ));

        assert!(cx.remove_feed(&feed).await.unwrap());
        assert!(!cx.remove_feed(&feed).await.unwrap());
        assert_eq!(feeds.created.load(Ordering::SeqCst), 1);
        assert_eq!(feeds.removed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_subscriptions_and_effects() {
        let config = InstanceConfig::new(2, "SimpleQuestion").next(InstanceId::new(3));
        let templates = OutputTemplates::new();
        let feeds = CountingFeeds::default();
        let bus = EventBus::new();
        let mut context = None;
        let mut resources = Resources::default();
        {
            let mut cx = Lifecycle::new(
                HookType::OnStart,
                &config,
                &templates,
                &mut context,
                &mut resources,
                Services {
                    feeds: &feeds,
                    bus: &bus,
                },
            );
            cx.subscribe(EventKind::SimpleAnswer);
            cx.subscribe(EventKind::SimpleAnswer);
            assert!(!cx.unsubscribe(EventKind::GameEnd));
            cx.dispatch_next();
            cx.reset(ComponentRef::Instance(InstanceId::new(9)));

            assert_eq!(
                cx.into_effects(),
                vec![
                    Effect::Dispatch(Successors::from(InstanceId::new(3))),
                    Effect::Emit(Event::reset(InstanceId::new(9))),
                ]
            );
        }

        assert_eq!(bus.subscribers(EventKind::SimpleAnswer), vec![InstanceId::new(2)]);
        assert_eq!(resources.revoke_subscriptions(&bus), 1);
        assert!(bus.subscribers(EventKind::SimpleAnswer).is_empty());
        assert!(resources.is_empty());
    }

    #[test]
    fn test_context_created_on_first_write() {
        let config = InstanceConfig::new(1, "HtmlMessage");
        let templates = OutputTemplates::new();
        let feeds = CountingFeeds::default();
        let bus = EventBus::new();
        let mut context = None;
        let mut resources = Resources::default();
        {
            let cx = Lifecycle::new(
                HookType::OnCleanUp,
                &config,
                &templates,
                &mut context,
                &mut resources,
                Services {
                    feeds: &feeds,
                    bus: &bus,
                },
            );
            assert!(cx.context().is_empty());
        }
        assert!(context.is_none());

        {
            let mut cx = Lifecycle::new(
                HookType::OnStart,
                &config,
                &templates,
                &mut context,
                &mut resources,
                Services {
                    feeds: &feeds,
                    bus: &bus,
                },
            );
            cx.context_mut().set("seen", true);
        }
        assert_eq!(context.unwrap().get::<bool>("seen"), Some(&true));
    }

    #[test]
    fn test_typed_data() {
        #[derive(Deserialize)]
        struct Data {
            message: String,
        }

        let config = InstanceConfig::new(1, "HtmlMessage").data(json!({"message": "hello"}));
        let templates = OutputTemplates::new();
        let feeds = CountingFeeds::default();
        let bus = EventBus::new();
        let mut context = None;
        let mut resources = Resources::default();
        let cx = Lifecycle::new(
            HookType::OnStart,
            &config,
            &templates,
            &mut context,
            &mut resources,
            Services {
                feeds: &feeds,
                bus: &bus,
            },
        );

        let data: Data = cx.data().unwrap();
        assert_eq!(data.message, "hello");
        assert!(cx.data::<u32>().is_err());
    }
}
