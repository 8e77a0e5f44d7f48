//! Usage statistics for herald.
//!
//! A [`StatisticsTree`] holds one [`Counter`] per registrable category and
//! one per subscribed event. Counters are addressed by dotted paths such as
//! `commands.slash` or `events.messageCreate`; the well-known paths live in
//! [`paths`].

pub mod counter;
pub mod error;
pub mod host;
pub mod paths;
pub mod shared;
pub mod tree;

pub use {
    counter::Counter,
    error::{Error, Result},
    host::{HostUsage, MemoryUsage},
    shared::SharedStats,
    tree::{
        CommandStats, ComponentStats, EventStats, StatisticsTree, StatsSnapshot, TriggerStats,
    },
};
