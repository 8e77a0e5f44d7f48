//! herald: registration scaffolding for a chat bot.
//!
//! [`Bot`] is the composition root. It reads a [`HeraldConfig`], discovers
//! plugin manifests into a [`Registry`], and drives an external
//! [`PlatformSession`] for login, interaction publishing and presence.
//!
//! [`HeraldConfig`]: herald_config::HeraldConfig
//! [`Registry`]: herald_registry::Registry

pub mod bot;
pub mod error;
pub mod session;
pub mod stats;
pub mod telemetry;

pub use {
    bot::Bot,
    error::{Error, Result},
    session::PlatformSession,
    stats::BotStats,
};

// Re-exports for hosts that only depend on this crate.
pub use {
    herald_common::{Handler, handler_fn},
    herald_config::{HeraldConfig, discover_and_load, load_config},
    herald_plugins::HandlerCatalog,
    herald_presence::{Activity, ActivityKind, PresenceSink},
    herald_registry::{EventBus, LocalEventBus},
};
