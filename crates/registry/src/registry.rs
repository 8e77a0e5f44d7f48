//! The registry and its push pipeline.

use std::{
    any::Any,
    collections::HashMap,
    panic::AssertUnwindSafe,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard},
    time::{Duration, Instant},
};

use {
    async_trait::async_trait,
    futures::FutureExt,
    herald_common::{Handler, HandlerStats},
    herald_config::{DuplicatePolicy, RegistryConfig},
    herald_presence::Activity,
    herald_stats::{SharedStats, paths},
    serde::Serialize,
    serde_json::Value,
    tracing::{debug, warn},
};

use crate::{
    bus::EventBus,
    collection::Collection,
    command::Command,
    component::Component,
    definition::PluginDefinition,
    error::{Error, Result},
    event::Event,
    kind::{ComponentKind, EntryKind},
    message::CannedMessage,
    trigger::Trigger,
};

/// Registration behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryOptions {
    pub duplicate_policy: DuplicatePolicy,
    /// Upper bound on one event handler run.
    pub handler_timeout: Option<Duration>,
}

impl From<&RegistryConfig> for RegistryOptions {
    fn from(config: &RegistryConfig) -> Self {
        Self {
            duplicate_policy: config.duplicate_policy,
            handler_timeout: config.handler_timeout,
        }
    }
}

/// Collection sizes, for the ready log line and the stats surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RegistrySummary {
    pub commands: usize,
    pub triggers: usize,
    pub events: usize,
    pub buttons: usize,
    pub context_menus: usize,
    pub select_menus: usize,
    pub modals: usize,
    pub canned_messages: usize,
    pub statuses: usize,
    pub interactions: usize,
}

struct Interaction {
    kind: EntryKind,
    name: String,
    descriptor: Value,
}

type EventTable = Arc<RwLock<Collection<Event>>>;

/// Owns every registered entry and the statistics tree.
pub struct Registry {
    options: RegistryOptions,
    bus: Arc<dyn EventBus>,
    stats: SharedStats,
    commands: Collection<Command>,
    triggers: Collection<Trigger>,
    events: EventTable,
    event_stats: HashMap<String, Arc<HandlerStats>>,
    buttons: Collection<Component>,
    context_menus: Collection<Component>,
    select_menus: Collection<Component>,
    modals: Collection<Component>,
    canned_messages: Collection<CannedMessage>,
    statuses: Vec<Activity>,
    interactions: Vec<Interaction>,
}

impl Registry {
    pub fn new(bus: Arc<dyn EventBus>, options: RegistryOptions) -> Self {
        Self {
            options,
            bus,
            stats: SharedStats::new(),
            commands: Collection::new(),
            triggers: Collection::new(),
            events: Arc::default(),
            event_stats: HashMap::new(),
            buttons: Collection::new(),
            context_menus: Collection::new(),
            select_menus: Collection::new(),
            modals: Collection::new(),
            canned_messages: Collection::new(),
            statuses: Vec::new(),
            interactions: Vec::new(),
        }
    }

    /// Route a discovered definition to the matching `register_*` method.
    pub fn push(&mut self, definition: PluginDefinition) -> Result<()> {
        debug!(kind = %definition.kind(), name = definition.name(), "definition pushed");
        match definition {
            PluginDefinition::Command(command) => self.register_command(command),
            PluginDefinition::Trigger(trigger) => self.register_trigger(trigger),
            PluginDefinition::Event(event) => self.register_event(event),
            PluginDefinition::Component(component) => self.register_component(component),
            PluginDefinition::CannedMessage(message) => self.register_canned_message(message),
        }
    }

    /// Store a command. Text mode counts under `commands.text`; slash mode
    /// counts under `commands.slash` and queues its descriptor for
    /// publication.
    pub fn register_command(&mut self, command: Command) -> Result<()> {
        let name = command.name().to_string();
        self.admit(EntryKind::Command, &name, self.commands.contains(&name))?;

        let modes = command.modes();
        if modes.text {
            self.stats.increment_registered(paths::COMMANDS_TEXT)?;
        }
        if modes.slash {
            self.stats.increment_registered(paths::COMMANDS_SLASH)?;
        }
        self.set_interaction(
            EntryKind::Command,
            &name,
            command.slash_descriptor().cloned(),
        );
        self.commands.insert(name.as_str(), command);
        debug!(command = %name, text = modes.text, slash = modes.slash, "command registered");
        Ok(())
    }

    /// Store a trigger, counting one registration per activated block.
    pub fn register_trigger(&mut self, trigger: Trigger) -> Result<()> {
        let name = trigger.name().to_string();
        self.admit(EntryKind::Trigger, &name, self.triggers.contains(&name))?;

        for block in trigger.activated_blocks() {
            self.stats.increment_registered(block.stats_path())?;
        }
        if trigger.activated_blocks().next().is_none() {
            debug!(trigger = %name, "trigger has no activated blocks");
        }
        self.triggers.insert(name.as_str(), trigger);
        debug!(trigger = %name, "trigger registered");
        Ok(())
    }

    /// Store an event and make sure the bus calls it.
    ///
    /// One bus subscription exists per event name. Registering the same name
    /// again only replaces the stored entry; the subscription looks the entry
    /// up when the event fires, so the latest handler runs exactly once.
    pub fn register_event(&mut self, event: Event) -> Result<()> {
        self.insert_event(event, false)
    }

    /// Register `event` over an entry of the same name that the caller knows
    /// about, typically because `event` wraps the earlier handler.
    ///
    /// Behaves like [`register_event`](Self::register_event), except that an
    /// overwrite is logged at debug level instead of as a duplicate.
    /// `Reject` still refuses the replacement.
    pub fn replace_event(&mut self, event: Event) -> Result<()> {
        self.insert_event(event, true)
    }

    fn insert_event(&mut self, event: Event, expected: bool) -> Result<()> {
        let name = event.name().to_string();
        let exists = self.read_events().contains(&name);
        match self.options.duplicate_policy {
            DuplicatePolicy::Overwrite if expected && exists => {
                debug!(event = %name, "event entry replaced by its wrapper");
            },
            _ => self.admit(EntryKind::Event, &name, exists)?,
        }

        self.stats.increment_registered(paths::EVENTS)?;
        self.stats.ensure_event_bucket(&name);
        self.events
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.as_str(), event);

        if self.event_stats.contains_key(&name) {
            debug!(event = %name, "event handler replaced");
            return Ok(());
        }
        let handler_stats = Arc::new(HandlerStats::new());
        self.event_stats
            .insert(name.clone(), Arc::clone(&handler_stats));
        self.bus.subscribe(
            &name,
            Arc::new(EventDispatcher {
                label: format!("event:{name}"),
                path: paths::event(&name),
                event: name.clone(),
                events: Arc::clone(&self.events),
                stats: self.stats.clone(),
                handler_stats,
                timeout: self.options.handler_timeout,
            }),
        );
        debug!(event = %name, "event registered");
        Ok(())
    }

    /// Store a UI component in its kind's collection. Context menus also
    /// queue their descriptor for publication.
    pub fn register_component(&mut self, component: Component) -> Result<()> {
        let kind = component.kind();
        let name = component.name().to_string();
        self.admit(
            EntryKind::Component(kind),
            &name,
            self.components(kind).contains(&name),
        )?;

        self.stats.increment_registered(kind.stats_path())?;
        if kind.is_interaction() {
            self.set_interaction(
                EntryKind::Component(kind),
                &name,
                component.descriptor().cloned(),
            );
        }
        self.components_mut(kind).insert(name.as_str(), component);
        debug!(kind = %kind, component = %name, "component registered");
        Ok(())
    }

    /// Store a canned message. Every later [`CannedMessage::value`] call on
    /// the stored entry counts under `predefinedMessages`.
    pub fn register_canned_message(&mut self, message: CannedMessage) -> Result<()> {
        let name = message.name().to_string();
        self.admit(
            EntryKind::CannedMessage,
            &name,
            self.canned_messages.contains(&name),
        )?;

        self.stats.increment_registered(paths::PREDEFINED_MESSAGES)?;
        let counted = Arc::new(CountedProducer {
            inner: Arc::clone(message.producer()),
            stats: self.stats.clone(),
        });
        self.canned_messages
            .insert(name.as_str(), message.with_producer(counted));
        debug!(message = %name, "canned message registered");
        Ok(())
    }

    pub fn add_status(&mut self, activity: Activity) {
        self.statuses.push(activity);
    }

    pub fn statuses(&self) -> &[Activity] {
        &self.statuses
    }

    pub fn command(&self, name: &str) -> Option<Arc<Command>> {
        self.commands.get(name)
    }

    pub fn trigger(&self, name: &str) -> Option<Arc<Trigger>> {
        self.triggers.get(name)
    }

    pub fn event(&self, name: &str) -> Option<Arc<Event>> {
        self.read_events().get(name)
    }

    pub fn component(&self, kind: ComponentKind, name: &str) -> Option<Arc<Component>> {
        self.components(kind).get(name)
    }

    pub fn canned_message(&self, name: &str) -> Option<Arc<CannedMessage>> {
        self.canned_messages.get(name)
    }

    pub fn commands(&self) -> &Collection<Command> {
        &self.commands
    }

    pub fn triggers(&self) -> &Collection<Trigger> {
        &self.triggers
    }

    pub fn components(&self, kind: ComponentKind) -> &Collection<Component> {
        match kind {
            ComponentKind::Button => &self.buttons,
            ComponentKind::ContextMenu => &self.context_menus,
            ComponentKind::SelectMenu => &self.select_menus,
            ComponentKind::Modal => &self.modals,
        }
    }

    pub fn canned_messages(&self) -> &Collection<CannedMessage> {
        &self.canned_messages
    }

    /// Registered event names, sorted.
    pub fn event_names(&self) -> Vec<String> {
        self.read_events().names().map(str::to_string).collect()
    }

    /// Call statistics for the handler subscribed to `event`.
    pub fn event_handler_stats(&self, event: &str) -> Option<Arc<HandlerStats>> {
        self.event_stats.get(event).cloned()
    }

    /// Descriptors queued for publication, in registration order.
    pub fn interactions(&self) -> Vec<Value> {
        self.interactions
            .iter()
            .map(|i| i.descriptor.clone())
            .collect()
    }

    /// Drain the queued descriptors.
    pub fn take_interactions(&mut self) -> Vec<Value> {
        self.interactions
            .drain(..)
            .map(|i| i.descriptor)
            .collect()
    }

    pub fn stats(&self) -> &SharedStats {
        &self.stats
    }

    pub fn options(&self) -> RegistryOptions {
        self.options
    }

    pub fn summary(&self) -> RegistrySummary {
        RegistrySummary {
            commands: self.commands.len(),
            triggers: self.triggers.len(),
            events: self.read_events().len(),
            buttons: self.buttons.len(),
            context_menus: self.context_menus.len(),
            select_menus: self.select_menus.len(),
            modals: self.modals.len(),
            canned_messages: self.canned_messages.len(),
            statuses: self.statuses.len(),
            interactions: self.interactions.len(),
        }
    }

    fn components_mut(&mut self, kind: ComponentKind) -> &mut Collection<Component> {
        match kind {
            ComponentKind::Button => &mut self.buttons,
            ComponentKind::ContextMenu => &mut self.context_menus,
            ComponentKind::SelectMenu => &mut self.select_menus,
            ComponentKind::Modal => &mut self.modals,
        }
    }

    fn read_events(&self) -> RwLockReadGuard<'_, Collection<Event>> {
        self.events.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply the duplicate policy to a name that may already be taken.
    fn admit(&self, kind: EntryKind, name: &str, exists: bool) -> Result<()> {
        if !exists {
            return Ok(());
        }
        match self.options.duplicate_policy {
            DuplicatePolicy::Reject => Err(Error::DuplicateRegistration {
                kind,
                name: name.to_string(),
            }),
            DuplicatePolicy::Overwrite => {
                warn!(kind = %kind, name, "duplicate registration, replacing earlier entry");
                Ok(())
            },
        }
    }

    /// Replace whatever descriptor the entry queued before.
    fn set_interaction(&mut self, kind: EntryKind, name: &str, descriptor: Option<Value>) {
        self.interactions
            .retain(|i| !(i.kind == kind && i.name == name));
        if let Some(descriptor) = descriptor {
            self.interactions.push(Interaction {
                kind,
                name: name.to_string(),
                descriptor,
            });
        }
    }
}

// ── Dispatch wrappers ───────────────────────────────────────────────────────

/// Bus listener for one event name.
struct EventDispatcher {
    label: String,
    event: String,
    path: String,
    events: EventTable,
    stats: SharedStats,
    handler_stats: Arc<HandlerStats>,
    timeout: Option<Duration>,
}

#[async_trait]
impl Handler for EventDispatcher {
    fn name(&self) -> &str {
        &self.label
    }

    /// Counts the execution, then runs the current handler. Handler errors,
    /// panics and timeouts are logged and never reach the bus.
    async fn handle(&self, payload: &Value) -> anyhow::Result<Value> {
        let current = self
            .events
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&self.event);
        let Some(event) = current else {
            warn!(event = %self.event, "event fired with no registered handler");
            return Ok(Value::Null);
        };

        if let Err(e) = self.stats.increment_executed(&self.path) {
            warn!(event = %self.event, error = %e, "failed to count event execution");
        }

        let handler = Arc::clone(event.handler());
        let started = Instant::now();
        let run = AssertUnwindSafe(handler.handle(payload)).catch_unwind();
        let outcome = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, run).await.ok(),
            None => Some(run.await),
        };
        let elapsed = started.elapsed();

        #[cfg(feature = "metrics")]
        herald_metrics::histogram!(
            herald_metrics::events::HANDLER_DURATION_SECONDS,
            herald_metrics::labels::EVENT => self.event.clone()
        )
        .record(elapsed.as_secs_f64());

        match outcome {
            Some(Ok(Ok(_))) => {
                self.handler_stats.record_success(elapsed);
            },
            Some(Ok(Err(e))) => {
                self.handler_stats.record_failure(elapsed);
                #[cfg(feature = "metrics")]
                herald_metrics::counter!(
                    herald_metrics::events::HANDLER_ERRORS_TOTAL,
                    herald_metrics::labels::EVENT => self.event.clone()
                )
                .increment(1);
                warn!(event = %self.event, handler = handler.name(), error = %e, "event handler failed");
            },
            Some(Err(panic)) => {
                self.handler_stats.record_failure(elapsed);
                #[cfg(feature = "metrics")]
                herald_metrics::counter!(
                    herald_metrics::events::HANDLER_PANICS_TOTAL,
                    herald_metrics::labels::EVENT => self.event.clone()
                )
                .increment(1);
                warn!(
                    event = %self.event,
                    handler = handler.name(),
                    panic = %panic_message(panic.as_ref()),
                    "event handler panicked"
                );
            },
            None => {
                self.handler_stats.record_timeout(elapsed);
                #[cfg(feature = "metrics")]
                herald_metrics::counter!(
                    herald_metrics::events::HANDLER_TIMEOUTS_TOTAL,
                    herald_metrics::labels::EVENT => self.event.clone()
                )
                .increment(1);
                warn!(
                    event = %self.event,
                    handler = handler.name(),
                    timeout_ms = elapsed.as_millis() as u64,
                    "event handler timed out"
                );
            },
        }
        Ok(Value::Null)
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Canned message producer that counts each call.
struct CountedProducer {
    inner: Arc<dyn Handler>,
    stats: SharedStats,
}

#[async_trait]
impl Handler for CountedProducer {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn handle(&self, payload: &Value) -> anyhow::Result<Value> {
        self.stats.increment_executed(paths::PREDEFINED_MESSAGES)?;
        self.inner.handle(payload).await
    }
}
