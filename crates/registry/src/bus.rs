//! The platform event bus seam.
//!
//! The platform client owns the real event source. Herald only needs to
//! subscribe listeners to named events; [`LocalEventBus`] is the in-process
//! implementation used by the bot and by tests.

use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard},
};

use {
    futures::future::join_all,
    herald_common::Handler,
    serde_json::Value,
    tokio::task::JoinHandle,
    tracing::{debug, trace, warn},
};

/// Anything listeners can be subscribed to by event name.
pub trait EventBus: Send + Sync {
    /// Add `listener` for `event`. Listeners are never removed.
    fn subscribe(&self, event: &str, listener: Arc<dyn Handler>);
}

/// Outcome of one [`LocalEventBus::dispatch`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub listeners: usize,
    pub failures: usize,
}

/// In-process bus. Each listener of an event runs on its own task, so one
/// failing, panicking or slow listener cannot affect the others.
#[derive(Default)]
pub struct LocalEventBus {
    listeners: RwLock<HashMap<String, Vec<Arc<dyn Handler>>>>,
}

impl LocalEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.read().get(event).map_or(0, Vec::len)
    }

    /// Run every listener of `event` concurrently and wait for all of them.
    pub async fn dispatch(&self, event: &str, payload: Value) -> DispatchReport {
        let listeners = self.read().get(event).cloned().unwrap_or_default();
        if listeners.is_empty() {
            trace!(event, "no listeners");
            return DispatchReport::default();
        }

        debug!(event, count = listeners.len(), "dispatching event");
        #[cfg(feature = "metrics")]
        herald_metrics::counter!(
            herald_metrics::events::DISPATCHED_TOTAL,
            herald_metrics::labels::EVENT => event.to_string()
        )
        .increment(1);

        let payload = Arc::new(payload);
        let (names, tasks): (Vec<_>, Vec<_>) = listeners
            .into_iter()
            .map(|listener| {
                let payload = Arc::clone(&payload);
                let name = listener.name().to_string();
                let task = tokio::spawn(async move { listener.handle(&payload).await });
                (name, task)
            })
            .unzip();

        let mut report = DispatchReport {
            listeners: tasks.len(),
            failures: 0,
        };
        for (name, result) in names.into_iter().zip(join_all(tasks).await) {
            match result {
                Ok(Ok(_)) => {},
                Ok(Err(e)) => {
                    report.failures += 1;
                    warn!(event, listener = %name, error = %e, "event listener failed");
                },
                Err(e) => {
                    report.failures += 1;
                    warn!(event, listener = %name, error = %e, "event listener aborted");
                },
            }
        }
        report
    }

    /// Dispatch on a background task without waiting.
    pub fn emit(self: &Arc<Self>, event: &str, payload: Value) -> JoinHandle<DispatchReport> {
        let bus = Arc::clone(self);
        let event = event.to_string();
        tokio::spawn(async move { bus.dispatch(&event, payload).await })
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Vec<Arc<dyn Handler>>>> {
        self.listeners.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl EventBus for LocalEventBus {
    fn subscribe(&self, event: &str, listener: Arc<dyn Handler>) {
        debug!(event, listener = listener.name(), "listener subscribed");
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(event.to_string())
            .or_default()
            .push(listener);
    }
}
