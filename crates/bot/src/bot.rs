//! The bot composition root.

use std::{
    sync::{Arc, Mutex, OnceLock, PoisonError},
    time::{Duration, Instant},
};

use {
    async_trait::async_trait,
    herald_common::Handler,
    herald_config::{HeraldConfig, MessagesConfig},
    herald_plugins::{HandlerCatalog, LoadReport, PluginLoader},
    herald_presence::{Activity, PresenceHandle, PresenceRotation, PresenceSink},
    herald_registry::{Event, EventBus, Registry, RegistryOptions, RegistrySummary},
    herald_stats::HostUsage,
    secrecy::ExposeSecret,
    serde_json::Value,
    tracing::{debug, info},
};

use crate::{
    error::{Error, Result},
    session::PlatformSession,
    stats::BotStats,
};

/// Name of the event the platform fires once the session is ready.
pub const READY_EVENT: &str = "ready";

type RotationSlot = Arc<Mutex<Option<PresenceHandle>>>;

/// A configured bot: every plugin loaded, interactions queued, presence
/// ready to rotate.
pub struct Bot {
    config: HeraldConfig,
    session: Arc<dyn PlatformSession>,
    registry: Registry,
    load_report: LoadReport,
    pending_interactions: Mutex<Option<Vec<Value>>>,
    rotation: RotationSlot,
    started_at: Instant,
}

impl Bot {
    /// Build the registry from `config`.
    ///
    /// Statuses are read from the presence config, every configured plugin
    /// directory is loaded, and the built-in `ready` event is pushed last.
    /// Any registration error aborts construction.
    pub fn new(
        config: HeraldConfig,
        session: Arc<dyn PlatformSession>,
        bus: Arc<dyn EventBus>,
        catalog: HandlerCatalog,
    ) -> Result<Self> {
        let mut registry = Registry::new(bus, RegistryOptions::from(&config.registry));
        for status in &config.presence.statuses {
            registry.add_status(Activity::try_from(status)?);
        }

        let load_report = PluginLoader::new(catalog).load_all(&config.directories, &mut registry)?;

        let rotation = RotationSlot::default();
        let summary = Arc::new(OnceLock::new());
        let ready = ReadyHandler {
            session: Arc::clone(&session),
            statuses: registry.statuses().to_vec(),
            interval: config.presence.interval,
            rotation: Arc::clone(&rotation),
            summary: Arc::clone(&summary),
            plugin: registry
                .event(READY_EVENT)
                .map(|event| Arc::clone(event.handler())),
        };
        registry.replace_event(Event::new(READY_EVENT, Arc::new(ready))?)?;
        let _ = summary.set(registry.summary());

        let pending = registry.take_interactions();
        info!(
            plugins = load_report.total(),
            interactions = pending.len(),
            statuses = registry.statuses().len(),
            "bot configured"
        );

        Ok(Self {
            config,
            session,
            registry,
            load_report,
            pending_interactions: Mutex::new(Some(pending)),
            rotation,
            started_at: Instant::now(),
        })
    }

    /// Publish the queued interaction descriptors, then log in.
    ///
    /// Descriptors are published on the first call only.
    pub async fn start(&self) -> Result<()> {
        let token = self.config.bot.token.as_ref().ok_or(Error::MissingToken)?;

        let pending = self
            .pending_interactions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(descriptors) = pending {
            let count = descriptors.len();
            self.session
                .publish_interactions(descriptors)
                .await
                .map_err(|e| Error::session("publish interactions", e))?;
            info!(count, "interactions published");
        }

        self.session
            .login(token.expose_secret())
            .await
            .map_err(|e| Error::session("log in", e))?;
        info!("logged in");
        Ok(())
    }

    /// Stop the presence rotation, if one is running.
    pub async fn shutdown(&self) {
        let handle = self
            .rotation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.stop().await;
            info!("presence rotation stopped");
        }
    }

    /// Point-in-time statistics for status commands and dashboards.
    pub fn stats(&self) -> BotStats {
        let ping_ms = self.session.ping().map(|p| p.as_millis() as u64);
        #[cfg(feature = "metrics")]
        if let Some(ms) = ping_ms {
            herald_metrics::gauge!(herald_metrics::system::PING_MILLISECONDS).set(ms as f64);
        }
        BotStats {
            ping_ms,
            guilds: self.session.guild_count(),
            channels: self.session.channel_count(),
            users: self.session.user_count(),
            uptime_secs: self.started_at.elapsed().as_secs(),
            memory: HostUsage::collect(),
            registry: self.registry.summary(),
            statistics: self.registry.stats().snapshot(),
        }
    }

    pub fn is_presence_running(&self) -> bool {
        self.rotation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(PresenceHandle::is_running)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &HeraldConfig {
        &self.config
    }

    /// Replies the platform layer sends when it refuses a command.
    pub fn messages(&self) -> &MessagesConfig {
        &self.config.messages
    }

    pub fn load_report(&self) -> &LoadReport {
        &self.load_report
    }
}

/// The built-in `ready` listener: logs the summary and (re)starts the
/// presence rotation. A plugin-defined `ready` handler runs afterwards.
struct ReadyHandler {
    session: Arc<dyn PlatformSession>,
    statuses: Vec<Activity>,
    interval: Duration,
    rotation: RotationSlot,
    summary: Arc<OnceLock<RegistrySummary>>,
    plugin: Option<Arc<dyn Handler>>,
}

#[async_trait]
impl Handler for ReadyHandler {
    fn name(&self) -> &str {
        "herald:ready"
    }

    async fn handle(&self, payload: &Value) -> anyhow::Result<Value> {
        let summary = self.summary.get().copied().unwrap_or_default();
        info!(
            ping_ms = self.session.ping().map(|p| p.as_millis() as u64),
            guilds = self.session.guild_count(),
            channels = self.session.channel_count(),
            users = self.session.user_count(),
            commands = summary.commands,
            triggers = summary.triggers,
            events = summary.events,
            buttons = summary.buttons,
            context_menus = summary.context_menus,
            select_menus = summary.select_menus,
            modals = summary.modals,
            canned_messages = summary.canned_messages,
            statuses = summary.statuses,
            "ready"
        );

        let sink: Arc<dyn PresenceSink> = self.session.clone();
        restart_rotation(&self.rotation, || {
            PresenceRotation::start(self.statuses.clone(), self.interval, sink)
        })
        .await;

        match &self.plugin {
            Some(plugin) => plugin.handle(payload).await,
            None => Ok(Value::Null),
        }
    }
}

/// Stop the rotation in `slot`, then store whatever `start` returns. The old
/// task has finished before the new one is spawned.
async fn restart_rotation(slot: &RotationSlot, start: impl FnOnce() -> Option<PresenceHandle>) {
    let previous = slot.lock().unwrap_or_else(PoisonError::into_inner).take();
    if let Some(previous) = previous {
        debug!("replacing presence rotation from an earlier ready");
        previous.stop().await;
    }
    let started = start();
    *slot.lock().unwrap_or_else(PoisonError::into_inner) = started;
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        herald_common::handler_fn,
        herald_config::StatusConfig,
        herald_presence::ActivityKind,
        herald_registry::LocalEventBus,
        secrecy::Secret,
        serde_json::json,
        std::sync::atomic::{AtomicUsize, Ordering},
    };

    #[derive(Default)]
    struct FakeSession {
        logins: Mutex<Vec<String>>,
        published: Mutex<Vec<Vec<Value>>>,
        presence: Mutex<Vec<Activity>>,
    }

    #[async_trait]
    impl PresenceSink for FakeSession {
        async fn set_presence(&self, activity: &Activity) -> anyhow::Result<()> {
            self.presence.lock().unwrap().push(activity.clone());
            Ok(())
        }
    }

    #[async_trait]
    impl PlatformSession for FakeSession {
        async fn login(&self, token: &str) -> anyhow::Result<()> {
            self.logins.lock().unwrap().push(token.to_string());
            Ok(())
        }

        async fn publish_interactions(&self, descriptors: Vec<Value>) -> anyhow::Result<()> {
            self.published.lock().unwrap().push(descriptors);
            Ok(())
        }

        fn ping(&self) -> Option<Duration> {
            Some(Duration::from_millis(42))
        }

        fn guild_count(&self) -> usize {
            3
        }

        fn channel_count(&self) -> usize {
            30
        }

        fn user_count(&self) -> usize {
            300
        }
    }

    fn config() -> HeraldConfig {
        let mut config = HeraldConfig::default();
        config.bot.token = Some(Secret::new("secret-token".into()));
        config.presence.statuses = vec![StatusConfig {
            kind: "watching".into(),
            name: "The Server".into(),
            url: None,
        }];
        config
    }

    fn bot(config: HeraldConfig) -> (Bot, Arc<FakeSession>, Arc<LocalEventBus>) {
        let session = Arc::new(FakeSession::default());
        let bus = Arc::new(LocalEventBus::new());
        let bot = Bot::new(config, session.clone(), bus.clone(), HandlerCatalog::new()).unwrap();
        (bot, session, bus)
    }

    #[tokio::test]
    async fn start_requires_a_token() {
        let mut config = config();
        config.bot.token = None;
        let (bot, session, _) = bot(config);
        assert!(matches!(bot.start().await, Err(Error::MissingToken)));
        assert!(session.published.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn start_publishes_once_then_logs_in() {
        let (bot, session, _) = bot(config());
        bot.start().await.unwrap();
        bot.start().await.unwrap();
        assert_eq!(session.published.lock().unwrap().len(), 1);
        assert_eq!(
            *session.logins.lock().unwrap(),
            vec!["secret-token".to_string(), "secret-token".to_string()]
        );
    }

    #[tokio::test]
    async fn ready_is_a_counted_event() {
        let (bot, _, bus) = bot(config());
        assert!(bot.registry().event(READY_EVENT).is_some());
        assert_eq!(bot.registry().stats().get("events").unwrap().registered, 1);

        bus.dispatch(READY_EVENT, Value::Null).await;
        assert_eq!(bot.registry().stats().get("events.ready").unwrap().executed, 1);
        assert!(bot.is_presence_running());
        bot.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn ready_starts_and_replaces_rotation() {
        let (bot, session, bus) = bot(config());
        assert!(!bot.is_presence_running());

        bus.dispatch(READY_EVENT, Value::Null).await;
        bus.dispatch(READY_EVENT, Value::Null).await;
        assert!(bot.is_presence_running());

        tokio::time::sleep(Duration::from_secs(16)).await;
        // Only the second rotation is alive, so one update per interval.
        assert_eq!(session.presence.lock().unwrap().len(), 1);
        assert_eq!(session.presence.lock().unwrap()[0].name, "The Server");

        bot.shutdown().await;
        assert!(!bot.is_presence_running());
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(session.presence.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn previous_rotation_stops_before_the_next_starts() {
        let slot = RotationSlot::default();
        let sink: Arc<dyn PresenceSink> = Arc::new(FakeSession::default());
        let statuses = vec![Activity::new(ActivityKind::Watching, "The Server")];
        *slot.lock().unwrap() =
            PresenceRotation::start(statuses.clone(), Duration::from_secs(15), Arc::clone(&sink));

        let observed = Arc::clone(&slot);
        restart_rotation(&slot, || {
            assert!(observed.lock().unwrap().is_none());
            PresenceRotation::start(statuses, Duration::from_secs(15), sink)
        })
        .await;
        assert!(slot.lock().unwrap().as_ref().unwrap().is_running());
    }

    #[tokio::test]
    async fn no_statuses_means_no_rotation() {
        let mut config = config();
        config.presence.statuses.clear();
        let (bot, _, bus) = bot(config);
        bus.dispatch(READY_EVENT, Value::Null).await;
        assert!(!bot.is_presence_running());
    }

    #[test]
    fn invalid_status_fails_construction() {
        let mut config = config();
        config.presence.statuses = vec![StatusConfig {
            kind: "streaming".into(),
            name: "live".into(),
            url: None,
        }];
        let session = Arc::new(FakeSession::default());
        let err = Bot::new(
            config,
            session,
            Arc::new(LocalEventBus::new()),
            HandlerCatalog::new(),
        )
        .err()
        .unwrap();
        assert!(matches!(err, Error::Presence(_)));
    }

    #[tokio::test]
    async fn plugin_ready_handler_still_runs() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("ready.toml"),
            "name = \"ready\"\nhandler = \"on-ready\"\n",
        )
        .unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_in = Arc::clone(&hits);
        let catalog = HandlerCatalog::new().with(handler_fn("on-ready", move |_| {
            let hits = Arc::clone(&hits_in);
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                Ok::<_, anyhow::Error>(json!(null))
            }
        }));
        let mut config = config();
        config.directories.events = Some(tmp.path().to_path_buf());

        let bus = Arc::new(LocalEventBus::new());
        let bot = Bot::new(config, Arc::new(FakeSession::default()), bus.clone(), catalog).unwrap();
        bus.dispatch(READY_EVENT, Value::Null).await;

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(bus.listener_count(READY_EVENT), 1);
        assert_eq!(bot.registry().stats().get("events.ready").unwrap().executed, 1);
        assert!(bot.is_presence_running());
        bot.shutdown().await;
    }

    #[tokio::test]
    async fn stats_reports_session_and_registry() {
        let (bot, _, _) = bot(config());
        let stats = bot.stats();
        assert_eq!(stats.ping_ms, Some(42));
        assert_eq!((stats.guilds, stats.channels, stats.users), (3, 30, 300));
        assert_eq!(stats.registry.events, 1);
        assert_eq!(stats.registry.statuses, 1);
        assert_eq!(stats.statistics.events.total.registered, 1);
        assert!(matches!(stats.memory.global.unit, "MB" | "GB"));
    }
}
