use {
    herald_registry::RegistrySummary,
    herald_stats::{HostUsage, StatsSnapshot},
    serde::Serialize,
};

/// Read-only snapshot returned by [`Bot::stats`](crate::Bot::stats).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BotStats {
    /// Gateway round trip in milliseconds.
    pub ping_ms: Option<u64>,
    pub guilds: usize,
    pub channels: usize,
    pub users: usize,
    pub uptime_secs: u64,
    pub memory: HostUsage,
    pub registry: RegistrySummary,
    pub statistics: StatsSnapshot,
}
