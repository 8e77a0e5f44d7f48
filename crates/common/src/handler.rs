//! The handler contract shared by every registrable entry.
//!
//! Commands, triggers, events, components and canned messages all carry one or
//! more [`Handler`]s. A handler receives the platform payload as JSON and
//! returns a JSON value (`Value::Null` when it has nothing to say). Native
//! handlers are usually built from closures with [`handler_fn`]; the plugin
//! loader also provides shell-backed handlers.

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use {
    anyhow::Result,
    async_trait::async_trait,
    futures::future::BoxFuture,
    serde_json::Value,
};

/// Trait implemented by native and shell handlers.
#[async_trait]
pub trait Handler: Send + Sync {
    /// A human-readable name, used in logs.
    fn name(&self) -> &str;

    /// Handle one invocation.
    async fn handle(&self, payload: &Value) -> Result<Value>;
}

impl fmt::Debug for dyn Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}

type BoxedFn = dyn Fn(Value) -> BoxFuture<'static, Result<Value>> + Send + Sync;

/// A [`Handler`] backed by an async closure.
pub struct FnHandler {
    handler_name: String,
    f: Box<BoxedFn>,
}

impl FnHandler {
    pub fn new<F, Fut>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        Self {
            handler_name: name.into(),
            f: Box::new(move |payload| Box::pin(f(payload))),
        }
    }
}

#[async_trait]
impl Handler for FnHandler {
    fn name(&self) -> &str {
        &self.handler_name
    }

    async fn handle(&self, payload: &Value) -> Result<Value> {
        (self.f)(payload.clone()).await
    }
}

/// Build a shared handler from an async closure.
///
/// ```ignore
/// let ping = handler_fn("ping", |_payload| async {
///     Ok::<_, anyhow::Error>(serde_json::json!("pong"))
/// });
/// ```
pub fn handler_fn<F, Fut>(name: impl Into<String>, f: F) -> Arc<dyn Handler>
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value>> + Send + 'static,
{
    Arc::new(FnHandler::new(name, f))
}

// ── HandlerStats ────────────────────────────────────────────────────────────

/// Per-handler health statistics collected by dispatch wrappers.
#[derive(Debug, Default)]
pub struct HandlerStats {
    pub call_count: AtomicU64,
    pub failure_count: AtomicU64,
    pub timeout_count: AtomicU64,
    pub total_latency_us: AtomicU64,
}

impl HandlerStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self, latency: Duration) {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        self.total_latency_us
            .fetch_add(latency.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn record_failure(&self, latency: Duration) {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        self.failure_count.fetch_add(1, Ordering::Relaxed);
        self.total_latency_us
            .fetch_add(latency.as_micros() as u64, Ordering::Relaxed);
    }

    /// A timeout counts as a failure as well.
    pub fn record_timeout(&self, latency: Duration) {
        self.timeout_count.fetch_add(1, Ordering::Relaxed);
        self.record_failure(latency);
    }

    pub fn calls(&self) -> u64 {
        self.call_count.load(Ordering::Relaxed)
    }

    pub fn failures(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    pub fn avg_latency(&self) -> Duration {
        let calls = self.call_count.load(Ordering::Relaxed);
        if calls == 0 {
            return Duration::ZERO;
        }
        let total = self.total_latency_us.load(Ordering::Relaxed);
        Duration::from_micros(total / calls)
    }
}
