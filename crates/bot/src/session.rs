//! The seam to the chat-platform client.

use std::time::Duration;

use {async_trait::async_trait, herald_presence::PresenceSink, serde_json::Value};

/// A connected (or connectable) platform client.
///
/// Implementations own the gateway connection and REST calls. Presence
/// updates arrive through the [`PresenceSink`] supertrait.
#[async_trait]
pub trait PlatformSession: PresenceSink {
    /// Authenticate and connect.
    async fn login(&self, token: &str) -> anyhow::Result<()>;

    /// Replace the application's interaction descriptors (slash commands and
    /// context menus) with `descriptors`.
    async fn publish_interactions(&self, descriptors: Vec<Value>) -> anyhow::Result<()>;

    /// Last measured gateway round trip, if any.
    fn ping(&self) -> Option<Duration>;

    fn guild_count(&self) -> usize;

    fn channel_count(&self) -> usize;

    fn user_count(&self) -> usize;
}
