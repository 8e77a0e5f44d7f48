use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{
    counter::Counter,
    error::Result,
    tree::{StatisticsTree, StatsSnapshot},
};

/// A cloneable handle to one [`StatisticsTree`].
///
/// Registration and dispatch wrappers run on different tasks, so every
/// access goes through a mutex. A poisoned lock is recovered: counters stay
/// meaningful even if a holder panicked mid-update.
#[derive(Debug, Clone, Default)]
pub struct SharedStats {
    inner: Arc<Mutex<StatisticsTree>>,
}

impl SharedStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ensure_event_bucket(&self, name: &str) -> bool {
        self.lock().ensure_event_bucket(name)
    }

    pub fn increment_registered(&self, path: &str) -> Result<u64> {
        self.lock().increment_registered(path)
    }

    pub fn increment_executed(&self, path: &str) -> Result<u64> {
        self.lock().increment_executed(path)
    }

    pub fn get(&self, path: &str) -> Option<Counter> {
        self.lock().get(path)
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        self.lock().snapshot()
    }

    fn lock(&self) -> MutexGuard<'_, StatisticsTree> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, crate::paths};

    #[test]
    fn clones_share_one_tree() {
        let stats = SharedStats::new();
        let other = stats.clone();
        other.increment_registered(paths::COMMANDS_SLASH).unwrap();
        assert_eq!(stats.get(paths::COMMANDS_SLASH).unwrap().registered, 1);
    }

    #[test]
    fn concurrent_increments_are_not_lost() {
        let stats = SharedStats::new();
        stats.ensure_event_bucket("messageCreate");
        let threads: Vec<_> = (0..8)
            .map(|_| {
                let stats = stats.clone();
                std::thread::spawn(move || {
                    for _ in 0..250 {
                        stats.increment_executed("events.messageCreate").unwrap();
                    }
                })
            })
            .collect();
        for thread in threads {
            thread.join().unwrap();
        }
        assert_eq!(stats.get("events.messageCreate").unwrap().executed, 2000);
    }
}
