//! Configuration loading and env substitution.
//!
//! Config files: `herald.toml`, `herald.yaml`, `herald.yml` or `herald.json`,
//! searched in `./` then the user config directory (`~/.config/herald/` on
//! Linux).
//!
//! Supports `${ENV_VAR}` substitution in all string values.

pub mod duration;
pub mod env_subst;
pub mod error;
pub mod loader;
pub mod schema;

pub use {
    duration::parse_duration,
    error::{Error, Result},
    loader::{config_dir, discover_and_load, load_config},
    schema::{
        BotConfig, DirectoriesConfig, DuplicatePolicy, HeraldConfig, LoggingConfig,
        MessagesConfig, MetricsConfig, PresenceConfig, RegistryConfig, StatusConfig,
    },
};
