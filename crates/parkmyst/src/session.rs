//! Session runtime: dispatch router and per-instance lifecycle driver.

use crate::config::{ReentryPolicy, SessionConfig};
use crate::feeds::MemoryFeeds;
use crate::graph::GraphDocument;
use crate::registry::{ComponentRegistry, RegisteredComponent};
use crate::report::DriveReport;
use parkmyst_core::{
    ComponentRef, Effect, EngineError, Event, EventBus, EventKind, FeedId, FeedService, HookType,
    InstanceConfig, InstanceContext, InstanceId, Lifecycle, LifecycleStatus, ProtocolViolation,
    Resources, Services, Successors,
};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Mutable state of one instance. Guarded by the instance's own lock.
#[derive(Debug, Default)]
struct InstanceState {
    status: LifecycleStatus,
    /// `None` until a hook first writes to it; dropped again on cleanup.
    context: Option<InstanceContext>,
    resources: Resources,
    activations: u64,
}

struct InstanceEntry {
    config: InstanceConfig,
    component: Arc<RegisteredComponent>,
    state: Mutex<InstanceState>,
}

/// Work item of a drive.
#[derive(Debug)]
enum Signal {
    Activate(InstanceId),
    Finish(InstanceId),
    Reset(InstanceId),
    Deliver(InstanceId, Event),
    Publish(Event),
    EndSession,
}

struct Drive {
    queue: VecDeque<Signal>,
    processed: usize,
    report: DriveReport,
}

impl Drive {
    fn new(seed: impl IntoIterator<Item = Signal>) -> Self {
        Self {
            queue: seed.into_iter().collect(),
            processed: 0,
            report: DriveReport::default(),
        }
    }

    fn dispatch(&mut self, successors: &Successors) {
        for target in successors.targets() {
            self.queue.push_back(Signal::Activate(target));
        }
    }
}

/// A running puzzle graph.
///
/// Every public entry point runs one *drive*: the input is turned into
/// signals, and signals are processed first in, first out until none are
/// left. Hooks of one instance never overlap; drives started from different
/// tasks may run side by side on different instances.
pub struct Session {
    instances: BTreeMap<InstanceId, InstanceEntry>,
    rejected: BTreeMap<InstanceId, String>,
    bus: EventBus,
    feeds: Arc<dyn FeedService>,
    config: SessionConfig,
    ended: AtomicBool,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("instances", &self.instances.keys().collect::<Vec<_>>())
            .field("rejected", &self.rejected)
            .field("config", &self.config)
            .field("ended", &self.is_ended())
            .finish()
    }
}

impl Session {
    /// Creates a new session builder.
    pub fn builder(registry: Arc<ComponentRegistry>) -> SessionBuilder {
        SessionBuilder::new(registry)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn instance_ids(&self) -> impl Iterator<Item = InstanceId> + '_ {
        self.instances.keys().copied()
    }

    /// Instances whose configuration was rejected, with the reason.
    pub fn config_errors(&self) -> &BTreeMap<InstanceId, String> {
        &self.rejected
    }

    pub fn is_ended(&self) -> bool {
        self.ended.load(Ordering::SeqCst)
    }

    pub async fn status(&self, id: InstanceId) -> Option<LifecycleStatus> {
        let entry = self.instances.get(&id)?;
        Some(entry.state.lock().await.status)
    }

    /// Feeds the instance currently owns.
    pub async fn feeds_of(&self, id: InstanceId) -> Vec<FeedId> {
        match self.instances.get(&id) {
            Some(entry) => entry.state.lock().await.resources.feeds().to_vec(),
            None => Vec::new(),
        }
    }

    pub fn subscriptions_of(&self, id: InstanceId) -> Vec<EventKind> {
        self.bus.subscriptions_of(id)
    }

    /// `true` once a hook of the current activation has written to its
    /// context, until the instance is cleaned up.
    pub async fn has_context(&self, id: InstanceId) -> bool {
        match self.instances.get(&id) {
            Some(entry) => entry.state.lock().await.context.is_some(),
            None => false,
        }
    }

    /// Number of activations the instance has gone through.
    pub async fn activations(&self, id: InstanceId) -> u64 {
        match self.instances.get(&id) {
            Some(entry) => entry.state.lock().await.activations,
            None => 0,
        }
    }

    /// Activates every idle `autoStart` instance, in id order.
    pub async fn start(&self) -> DriveReport {
        let mut seed = Vec::new();
        for (id, entry) in &self.instances {
            if !entry.component.flags().auto_start {
                continue;
            }
            if entry.state.lock().await.status == LifecycleStatus::Idle {
                seed.push(Signal::Activate(*id));
            }
        }
        info!("Starting session with {} auto-start instance(s)", seed.len());
        self.run(seed).await
    }

    /// Activates the given successors as an inbound dispatch.
    pub async fn dispatch(&self, successors: impl Into<Successors>) -> DriveReport {
        let successors = successors.into();
        self.run(successors.targets().map(Signal::Activate)).await
    }

    /// Publishes a validated event.
    pub async fn publish(&self, event: Event) -> DriveReport {
        self.run([Signal::Publish(event)]).await
    }

    /// Publishes a raw `{type, data}` value.
    ///
    /// A value that is not a well-formed event is dropped and counted in
    /// [`DriveReport::dropped_events`]; it never reaches a component.
    pub async fn publish_json(&self, raw: Value) -> DriveReport {
        match Event::from_value(raw) {
            Ok(event) => self.publish(event).await,
            Err(err) => {
                debug!("Dropping event: {}", err);
                DriveReport {
                    dropped_events: 1,
                    ..DriveReport::default()
                }
            }
        }
    }

    /// Forces `id` back to idle.
    pub async fn reset(&self, id: InstanceId) -> DriveReport {
        self.publish(Event::reset(id)).await
    }

    /// Re-runs `on_start` of a started instance, as after a crash.
    pub async fn replay_start(&self, id: InstanceId) -> DriveReport {
        let mut drive = Drive::new([]);
        match self.instances.get(&id) {
            Some(entry) => {
                let mut state = entry.state.lock().await;
                if state.status == LifecycleStatus::Started {
                    info!("Replaying on_start of instance {}", id);
                    self.start_hook(entry, &mut state, &mut drive).await;
                } else {
                    debug!("Instance {} is {}, nothing to replay", id, state.status);
                }
            }
            None => drive.report.errors.push(EngineError::UnknownInstance(id)),
        }
        self.drain(drive).await
    }

    async fn run(&self, seed: impl IntoIterator<Item = Signal>) -> DriveReport {
        let mut drive = Drive::new(seed);
        if self.is_ended() {
            drive.report.dropped_signals = drive.queue.len();
            drive.report.errors.push(EngineError::SessionEnded);
            return drive.report;
        }
        self.drain(drive).await
    }

    async fn drain(&self, mut drive: Drive) -> DriveReport {
        while let Some(signal) = drive.queue.pop_front() {
            if self.is_ended() {
                drive.report.dropped_signals += 1;
                continue;
            }
            drive.processed += 1;
            if drive.processed > self.config.max_signals {
                warn!(
                    "Signal limit {} reached, dropping {} signal(s)",
                    self.config.max_signals,
                    drive.queue.len() + 1
                );
                drive.report.dropped_signals += drive.queue.len() + 1;
                drive.queue.clear();
                drive
                    .report
                    .errors
                    .push(EngineError::SignalLimit(self.config.max_signals));
                break;
            }
            match signal {
                Signal::Activate(id) => self.activate(id, &mut drive).await,
                Signal::Finish(id) => self.finish(id, &mut drive).await,
                Signal::Reset(id) => self.reset_instance(id, &mut drive).await,
                Signal::Deliver(id, event) => self.deliver(id, &event, &mut drive).await,
                Signal::Publish(event) => self.route(event, &mut drive),
                Signal::EndSession => self.end_session(&mut drive).await,
            }
        }
        drive.report
    }

    /// Turns a published event into signals.
    fn route(&self, event: Event, drive: &mut Drive) {
        let signal = match &event {
            Event::ComponentStart(p) => p.target.instance().map(Signal::Activate),
            Event::ComponentEnd(p) => p.target.instance().map(Signal::Finish),
            Event::ComponentReset(p) => p.target.instance().map(Signal::Reset),
            Event::GameEnd(_) => Some(Signal::EndSession),
            Event::SimpleAnswer(_) => None,
        };
        if event.kind().is_builtin() {
            if let Some(signal) = signal {
                drive.queue.push_back(signal);
            }
            return;
        }
        let subscribers = self.bus.subscribers(event.kind());
        debug!(
            "Fanning out '{}' to {} subscriber(s)",
            event.kind(),
            subscribers.len()
        );
        for id in subscribers {
            drive.queue.push_back(Signal::Deliver(id, event.clone()));
        }
    }

    fn entry(&self, id: InstanceId, drive: &mut Drive) -> Option<&InstanceEntry> {
        if let Some(details) = self.rejected.get(&id) {
            drive.report.errors.push(EngineError::Configuration {
                instance: id,
                details: details.clone(),
            });
            return None;
        }
        let entry = self.instances.get(&id);
        if entry.is_none() {
            warn!("Signal for unknown instance {}", id);
            drive.report.errors.push(EngineError::UnknownInstance(id));
        }
        entry
    }

    async fn activate(&self, id: InstanceId, drive: &mut Drive) {
        let Some(entry) = self.entry(id, drive) else {
            return;
        };
        let mut state = entry.state.lock().await;
        match state.status {
            LifecycleStatus::Started => {
                match self.config.reentry {
                    ReentryPolicy::Coalesce => {
                        debug!("Instance {} already started, coalescing", id);
                        drive.report.coalesced.push(id);
                    }
                    ReentryPolicy::Reject => {
                        warn!("Instance {} already started, rejecting activation", id);
                        drive.report.errors.push(EngineError::Reentry(id));
                    }
                }
                return;
            }
            LifecycleStatus::Completed => {
                debug!("Instance {} re-activated after completion", id);
                self.clean_up(entry, &mut state, drive).await;
            }
            LifecycleStatus::Idle | LifecycleStatus::Resetting => {}
        }

        self.set_status(entry, &mut state, LifecycleStatus::Started, drive);
        state.activations += 1;
        drive.report.activated.push(id);
        info!("Instance {} ({}) started", id, entry.config.component);
        self.start_hook(entry, &mut state, drive).await;
    }

    async fn start_hook(&self, entry: &InstanceEntry, state: &mut InstanceState, drive: &mut Drive) {
        match self.call_hook(entry, state, HookType::OnStart, None).await {
            Ok(effects) => self.settle(entry, state, HookType::OnStart, effects, drive).await,
            Err(err) => self.abort(entry, state, err, drive).await,
        }
    }

    async fn deliver(&self, id: InstanceId, event: &Event, drive: &mut Drive) {
        let Some(entry) = self.instances.get(&id) else {
            return;
        };
        let mut state = entry.state.lock().await;
        let kind = event.kind();
        if state.status != LifecycleStatus::Started || !state.resources.is_subscribed(kind) {
            debug!("Skipping '{}' for instance {} ({})", kind, id, state.status);
            return;
        }
        drive.report.delivered.push((id, kind));
        match self.call_hook(entry, &mut state, HookType::OnEvent, Some(event)).await {
            Ok(effects) => {
                self.settle(entry, &mut state, HookType::OnEvent, effects, drive)
                    .await
            }
            Err(err) => self.abort(entry, &mut state, err, drive).await,
        }
    }

    async fn finish(&self, id: InstanceId, drive: &mut Drive) {
        let Some(entry) = self.entry(id, drive) else {
            return;
        };
        let mut state = entry.state.lock().await;
        if state.status == LifecycleStatus::Started {
            info!("Instance {} finished by signal", id);
            self.complete(entry, &mut state, drive).await;
        } else {
            debug!("Finish signal for instance {} ignored ({})", id, state.status);
        }
    }

    async fn reset_instance(&self, id: InstanceId, drive: &mut Drive) {
        let Some(entry) = self.entry(id, drive) else {
            return;
        };
        let mut state = entry.state.lock().await;
        info!("Resetting instance {} (was {})", id, state.status);
        drive.report.reset.push(id);
        self.set_status(entry, &mut state, LifecycleStatus::Resetting, drive);
        self.clean_up(entry, &mut state, drive).await;
    }

    async fn end_session(&self, drive: &mut Drive) {
        if self.ended.swap(true, Ordering::SeqCst) {
            return;
        }
        info!("Session ended");
        drive.report.session_ended = true;
        drive.report.end_signals += 1;
        drive.report.dropped_signals += drive.queue.len();
        drive.queue.clear();

        for entry in self.instances.values() {
            let mut state = entry.state.lock().await;
            if state.status.is_live() {
                self.clean_up(entry, &mut state, drive).await;
            }
        }
    }

    /// Applies effects of `on_start` / `on_event`.
    async fn settle(
        &self,
        entry: &InstanceEntry,
        state: &mut InstanceState,
        hook: HookType,
        effects: Vec<Effect>,
        drive: &mut Drive,
    ) {
        let mut completed = false;
        for effect in effects {
            match effect {
                Effect::Complete if state.status == LifecycleStatus::Started && !completed => {
                    completed = true;
                    self.complete(entry, state, drive).await;
                }
                Effect::Complete => {
                    let violation = if completed {
                        ProtocolViolation::CompletedTwice
                    } else {
                        ProtocolViolation::CompleteOutsideStarted(hook)
                    };
                    let err = EngineError::Protocol {
                        instance: entry.config.id,
                        violation,
                    };
                    self.abort(entry, state, err, drive).await;
                    return;
                }
                Effect::Dispatch(successors) => drive.dispatch(&successors),
                Effect::Emit(event) => drive.queue.push_back(Signal::Publish(event)),
            }
        }
    }

    /// Applies effects of `on_completed` / `on_clean_up`, where completing is
    /// never allowed. Returns `true` if the hook tried to anyway.
    fn enqueue(
        &self,
        id: InstanceId,
        hook: HookType,
        effects: Vec<Effect>,
        drive: &mut Drive,
    ) -> bool {
        let mut violated = false;
        for effect in effects {
            match effect {
                Effect::Complete => {
                    let violation = match hook {
                        HookType::OnCompleted => ProtocolViolation::CompletedTwice,
                        other => ProtocolViolation::CompleteOutsideStarted(other),
                    };
                    warn!("Instance {} signalled completion from {}", id, hook);
                    drive.report.errors.push(EngineError::Protocol {
                        instance: id,
                        violation,
                    });
                    violated = true;
                }
                Effect::Dispatch(successors) => drive.dispatch(&successors),
                Effect::Emit(event) => drive.queue.push_back(Signal::Publish(event)),
            }
        }
        violated
    }

    async fn complete(&self, entry: &InstanceEntry, state: &mut InstanceState, drive: &mut Drive) {
        let id = entry.config.id;
        self.set_status(entry, state, LifecycleStatus::Completed, drive);
        drive.report.completed.push(id);
        info!("Instance {} completed", id);

        match self.call_hook(entry, state, HookType::OnCompleted, None).await {
            Ok(effects) => {
                if self.enqueue(id, HookType::OnCompleted, effects, drive) {
                    self.clean_up(entry, state, drive).await;
                    return;
                }
            }
            Err(err) => {
                self.abort(entry, state, err, drive).await;
                return;
            }
        }
        if entry.component.flags().do_clean_up_on_completion {
            self.clean_up(entry, state, drive).await;
        }
    }

    /// Ends the current activation after a runtime error.
    async fn abort(
        &self,
        entry: &InstanceEntry,
        state: &mut InstanceState,
        err: EngineError,
        drive: &mut Drive,
    ) {
        warn!("{}", err);
        drive.report.errors.push(err);
        if state.status.is_live() {
            self.clean_up(entry, state, drive).await;
        }
    }

    /// Runs `on_clean_up`, then releases whatever the instance still holds
    /// and returns it to idle. Safe to call on an idle instance.
    async fn clean_up(&self, entry: &InstanceEntry, state: &mut InstanceState, drive: &mut Drive) {
        let id = entry.config.id;
        match self.call_hook(entry, state, HookType::OnCleanUp, None).await {
            Ok(effects) => {
                // Cleanup ends the activation anyway.
                self.enqueue(id, HookType::OnCleanUp, effects, drive);
            }
            Err(err) => {
                warn!("{}", err);
                drive.report.errors.push(err);
            }
        }

        let revoked = state.resources.revoke_subscriptions(&self.bus);
        if revoked > 0 {
            debug!("Revoked {} subscription(s) of instance {}", revoked, id);
        }

        let leftover = state.resources.take_feeds();
        if !leftover.is_empty() {
            if entry.component.flags().default_clean_up_enabled {
                for feed in leftover {
                    if let Err(err) = self.feeds.remove_feed(&feed).await {
                        drive.report.errors.push(EngineError::HookError {
                            instance: id,
                            hook_type: HookType::OnCleanUp,
                            details: err.to_string(),
                        });
                    }
                    drive.report.swept_feeds.push((id, feed));
                }
            } else {
                warn!(
                    "Instance {} left {} feed(s) behind after cleanup",
                    id,
                    leftover.len()
                );
                drive
                    .report
                    .leaked_feeds
                    .extend(leftover.into_iter().map(|feed| (id, feed)));
            }
        }

        state.context = None;
        drive.report.cleaned_up.push(id);
        if state.status != LifecycleStatus::Idle {
            self.set_status(entry, state, LifecycleStatus::Idle, drive);
        }
    }

    async fn call_hook(
        &self,
        entry: &InstanceEntry,
        state: &mut InstanceState,
        hook: HookType,
        event: Option<&Event>,
    ) -> Result<Vec<Effect>, EngineError> {
        let id = entry.config.id;
        let InstanceState {
            context, resources, ..
        } = state;
        let mut cx = Lifecycle::new(
            hook,
            &entry.config,
            &entry.component.definition().output_templates,
            context,
            resources,
            Services {
                feeds: self.feeds.as_ref(),
                bus: &self.bus,
            },
        );
        let component = entry.component.component();
        let call = async {
            match (hook, event) {
                (HookType::OnStart, _) => component.on_start(&mut cx).await,
                (HookType::OnEvent, Some(event)) => component.on_event(&mut cx, event).await,
                (HookType::OnEvent, None) => Ok(()),
                (HookType::OnCompleted, _) => component.on_completed(&mut cx).await,
                (HookType::OnCleanUp, _) => component.on_clean_up(&mut cx).await,
            }
        };
        let outcome = match self.config.hook_timeout() {
            Some(limit) => timeout(limit, call).await.map_err(|_| EngineError::Timeout {
                instance: id,
                hook_type: hook,
            })?,
            None => call.await,
        };
        outcome.map_err(|e| EngineError::HookError {
            instance: id,
            hook_type: hook,
            details: e.to_string(),
        })?;
        Ok(cx.into_effects())
    }

    fn set_status(
        &self,
        entry: &InstanceEntry,
        state: &mut InstanceState,
        to: LifecycleStatus,
        drive: &mut Drive,
    ) {
        let from = state.status;
        state.status = to;
        drive.report.transition(entry.config.id, from, to);
    }
}

/// Builder for constructing [`Session`] instances.
pub struct SessionBuilder {
    registry: Arc<ComponentRegistry>,
    feeds: Option<Arc<dyn FeedService>>,
    config: SessionConfig,
    instances: Vec<InstanceConfig>,
}

impl SessionBuilder {
    pub fn new(registry: Arc<ComponentRegistry>) -> Self {
        Self {
            registry,
            feeds: None,
            config: SessionConfig::default(),
            instances: Vec::new(),
        }
    }

    /// Sets the feed transport. Defaults to a fresh [`MemoryFeeds`].
    pub fn feeds(mut self, feeds: Arc<dyn FeedService>) -> Self {
        self.feeds = Some(feeds);
        self
    }

    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Adds one instance placement.
    pub fn instance(mut self, instance: InstanceConfig) -> Self {
        self.instances.push(instance);
        self
    }

    /// Takes the instances and session settings of a graph document.
    pub fn graph(mut self, document: GraphDocument) -> Self {
        self.config = document.session;
        self.instances.extend(document.components);
        self
    }

    /// Builds the session.
    ///
    /// Fails on duplicate instance ids, or on any rejected instance when the
    /// configuration is strict. Otherwise rejected instances are kept aside
    /// and reported as configuration errors whenever something activates them.
    pub fn build(mut self) -> Result<Session, EngineError> {
        let configs = std::mem::take(&mut self.instances);
        let mut seen = BTreeSet::new();
        for instance in &configs {
            if !seen.insert(instance.id) {
                return Err(EngineError::InvalidGraph(format!(
                    "duplicate instance id {}",
                    instance.id
                )));
            }
        }

        let mut instances = BTreeMap::new();
        let mut rejected = BTreeMap::new();
        for config in configs {
            let id = config.id;
            match self.check(&config, &seen) {
                Ok(component) => {
                    instances.insert(
                        id,
                        InstanceEntry {
                            config,
                            component,
                            state: Mutex::new(InstanceState::default()),
                        },
                    );
                }
                Err(details) => {
                    warn!("Rejected instance {}: {}", id, details);
                    if self.config.strict {
                        return Err(EngineError::Configuration {
                            instance: id,
                            details,
                        });
                    }
                    rejected.insert(id, details);
                }
            }
        }

        info!(
            "Built session with {} instance(s), {} rejected",
            instances.len(),
            rejected.len()
        );
        Ok(Session {
            instances,
            rejected,
            bus: EventBus::new(),
            feeds: self
                .feeds
                .unwrap_or_else(|| Arc::new(MemoryFeeds::new())),
            config: self.config,
            ended: AtomicBool::new(false),
        })
    }

    fn check(
        &self,
        config: &InstanceConfig,
        ids: &BTreeSet<InstanceId>,
    ) -> Result<Arc<RegisteredComponent>, String> {
        let component = self
            .registry
            .get(config.component.as_str())
            .ok_or_else(|| EngineError::UnknownComponent(config.component.clone()).to_string())?;
        component.validate(&config.data)?;
        let references = component.referenced_instances(&config.data)?;

        let dangling: Vec<String> = config
            .next_components
            .entries()
            .iter()
            .copied()
            .chain(references)
            .filter_map(ComponentRef::instance)
            .filter(|target| !ids.contains(target))
            .map(|target| target.to_string())
            .collect();
        if !dangling.is_empty() {
            return Err(format!(
                "references instances not in the graph: {}",
                dangling.join(", ")
            ));
        }
        Ok(Arc::clone(component))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> Arc<ComponentRegistry> {
        Arc::new(ComponentRegistry::builtin().expect("builtin registry"))
    }

    #[test]
    fn test_duplicate_ids_fail_build() {
        let result = Session::builder(registry())
            .instance(InstanceConfig::new(1, "StartNode"))
            .instance(InstanceConfig::new(1, "EndNode"))
            .build();
        assert!(matches!(result, Err(EngineError::InvalidGraph(_))));
    }

    #[test]
    fn test_rejected_instances_are_kept_aside() {
        let session = Session::builder(registry())
            .instance(InstanceConfig::new(1, "StartNode").next(InstanceId::new(2)))
            .instance(InstanceConfig::new(2, "HtmlMessage").data(json!({"wrong": true})))
            .instance(InstanceConfig::new(3, "Nope"))
            .instance(InstanceConfig::new(4, "EndNode").next(InstanceId::new(99)))
            .build()
            .expect("lenient build");

        let rejected: Vec<_> = session.config_errors().keys().copied().collect();
        assert_eq!(
            rejected,
            vec![InstanceId::new(2), InstanceId::new(3), InstanceId::new(4)]
        );
        assert_eq!(session.instance_ids().collect::<Vec<_>>(), vec![InstanceId::new(1)]);
    }

    #[test]
    fn test_strict_build_fails_on_rejection() {
        let result = Session::builder(registry())
            .config(SessionConfig::default().strict())
            .instance(InstanceConfig::new(1, "Reseter").data(json!({})))
            .build();
        assert!(matches!(
            result,
            Err(EngineError::Configuration { instance, .. }) if instance == InstanceId::new(1)
        ));
    }

    #[tokio::test]
    async fn test_rejected_instance_never_starts() {
        let session = Session::builder(registry())
            .instance(InstanceConfig::new(1, "HtmlMessage"))
            .build()
            .expect("lenient build");

        let report = session.dispatch(InstanceId::new(1)).await;
        assert!(report.activated.is_empty());
        assert!(matches!(
            report.errors.as_slice(),
            [EngineError::Configuration { .. }]
        ));
        assert_eq!(session.status(InstanceId::new(1)).await, None);
    }

    #[tokio::test]
    async fn test_unknown_instance_is_reported() {
        let session = Session::builder(registry())
            .instance(InstanceConfig::new(1, "EndNode"))
            .build()
            .expect("valid session");

        let report = session.publish(Event::start(InstanceId::new(42))).await;
        assert!(matches!(
            report.errors.as_slice(),
            [EngineError::UnknownInstance(id)] if *id == InstanceId::new(42)
        ));
        assert!(!session.is_ended());
    }

    #[tokio::test]
    async fn test_sentinel_targets_are_ignored() {
        let session = Session::builder(registry())
            .instance(InstanceConfig::new(1, "EndNode"))
            .build()
            .expect("valid session");

        let report = session
            .dispatch(Successors::from(vec![ComponentRef::None, ComponentRef::None]))
            .await;
        assert!(report.activated.is_empty());
        assert!(report.is_ok());

        let report = session.publish(Event::reset(ComponentRef::None)).await;
        assert!(report.reset.is_empty());
        assert!(report.is_ok());
    }
}
