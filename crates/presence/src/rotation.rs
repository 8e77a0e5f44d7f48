//! Periodic presence updates.
//!
//! The rotation is the only autonomous repeating task in herald. It picks a
//! random status every interval until its [`PresenceHandle`] is stopped or
//! dropped.

use std::{sync::Arc, time::Duration};

use {
    async_trait::async_trait,
    rand::seq::IndexedRandom,
    tokio::{
        task::JoinHandle,
        time::{Instant, MissedTickBehavior},
    },
    tokio_util::sync::CancellationToken,
    tracing::{debug, info, warn},
};

use crate::activity::Activity;

/// Time between presence changes when the config does not say otherwise.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(15);

/// Where presence updates go. Implemented by the platform session.
#[async_trait]
pub trait PresenceSink: Send + Sync {
    async fn set_presence(&self, activity: &Activity) -> anyhow::Result<()>;
}

pub struct PresenceRotation;

impl PresenceRotation {
    /// Spawn the rotation task.
    ///
    /// Returns `None` without spawning anything when `statuses` is empty or
    /// `interval` is zero. The first update happens one full interval after
    /// the call. Must be called from within a tokio runtime.
    pub fn start(
        statuses: Vec<Activity>,
        interval: Duration,
        sink: Arc<dyn PresenceSink>,
    ) -> Option<PresenceHandle> {
        if statuses.is_empty() {
            debug!("no presence statuses, rotation not started");
            return None;
        }
        if interval.is_zero() {
            warn!("presence interval is zero, rotation not started");
            return None;
        }

        let cancel = CancellationToken::new();
        let cancel_task = cancel.clone();
        let count = statuses.len();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    () = cancel_task.cancelled() => break,
                    _ = ticker.tick() => {
                        let Some(activity) = pick(&statuses) else {
                            break;
                        };
                        apply(sink.as_ref(), &activity).await;
                    },
                }
            }
            debug!("presence rotation stopped");
        });

        #[cfg(feature = "metrics")]
        herald_metrics::gauge!(herald_metrics::presence::ROTATION_ACTIVE).increment(1.0);

        info!(
            statuses = count,
            interval_ms = interval.as_millis() as u64,
            "presence rotation started"
        );
        Some(PresenceHandle {
            cancel,
            task: Some(task),
        })
    }
}

fn pick(statuses: &[Activity]) -> Option<Activity> {
    statuses.choose(&mut rand::rng()).cloned()
}

async fn apply(sink: &dyn PresenceSink, activity: &Activity) {
    match sink.set_presence(activity).await {
        Ok(()) => {
            #[cfg(feature = "metrics")]
            herald_metrics::counter!(herald_metrics::presence::UPDATES_TOTAL).increment(1);
            debug!(activity = %activity, "presence updated");
        },
        Err(e) => {
            #[cfg(feature = "metrics")]
            herald_metrics::counter!(herald_metrics::presence::UPDATE_ERRORS_TOTAL).increment(1);
            warn!(activity = %activity, error = %e, "failed to update presence");
        },
    }
}

/// Cancellation handle for a running rotation. Dropping it also stops the
/// rotation.
pub struct PresenceHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl PresenceHandle {
    /// Cancel the rotation and wait for the task to finish.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
        {
            warn!(error = %e, "presence rotation task ended abnormally");
        }
    }

    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled() && self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for PresenceHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
        // Each handle accounts for its own rotation only.
        #[cfg(feature = "metrics")]
        herald_metrics::gauge!(herald_metrics::presence::ROTATION_ACTIVE).decrement(1.0);
    }
}
