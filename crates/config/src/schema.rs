//! Config schema types (bot identity, plugin directories, presence,
//! registry policy, default messages, logging, metrics).

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

use crate::duration;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HeraldConfig {
    pub bot: BotConfig,
    pub directories: DirectoriesConfig,
    pub presence: PresenceConfig,
    pub registry: RegistryConfig,
    pub messages: MessagesConfig,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
}

/// Bot identity and credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Application id on the chat platform.
    pub id: Option<String>,
    /// Gateway token. Usually `${HERALD_TOKEN}`.
    #[serde(
        serialize_with = "serialize_option_secret",
        skip_serializing_if = "Option::is_none"
    )]
    pub token: Option<Secret<String>>,
    /// Prefix for text commands.
    pub prefix: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            id: None,
            token: None,
            prefix: "!".into(),
        }
    }
}

/// Plugin definition directories, one per plugin kind. Unset kinds are not
/// loaded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoriesConfig {
    pub commands: Option<PathBuf>,
    pub events: Option<PathBuf>,
    pub triggers: Option<PathBuf>,
    pub buttons: Option<PathBuf>,
    pub context_menus: Option<PathBuf>,
    pub select_menus: Option<PathBuf>,
    pub modals: Option<PathBuf>,
    pub canned_messages: Option<PathBuf>,
}

impl DirectoriesConfig {
    /// Resolve relative directories against `base` (usually the directory
    /// holding the config file).
    #[must_use]
    pub fn resolved_against(mut self, base: &Path) -> Self {
        for dir in [
            &mut self.commands,
            &mut self.events,
            &mut self.triggers,
            &mut self.buttons,
            &mut self.context_menus,
            &mut self.select_menus,
            &mut self.modals,
            &mut self.canned_messages,
        ]
        .into_iter()
        .flatten()
        {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
        self
    }
}

/// Presence rotation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenceConfig {
    /// Time between status changes.
    #[serde(with = "duration::serde_str")]
    pub interval: Duration,
    /// Statuses to rotate through. Empty disables the rotation.
    pub statuses: Vec<StatusConfig>,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(15),
            statuses: Vec::new(),
        }
    }
}

/// One presence status as written in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusConfig {
    /// `playing`, `streaming`, `listening`, `watching`, `competing` or `custom`.
    pub kind: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// What to do when a second entry is registered under an existing name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Replace the earlier entry and log a warning.
    #[default]
    Overwrite,
    /// Fail the registration.
    Reject,
}

/// Registry behaviour.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub duplicate_policy: DuplicatePolicy,
    /// Upper bound on a single event handler run. `None` waits forever.
    #[serde(
        with = "duration::serde_str_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub handler_timeout: Option<Duration>,
}

/// Default replies for refused commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagesConfig {
    pub disabled: String,
    pub no_perms: String,
    pub dm_disabled: String,
    pub invalid_channel_type: String,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            disabled: "This command is currently disabled".into(),
            no_perms: "You do not have permission to use this command.".into(),
            dm_disabled: "This command is disabled in DMs.".into(),
            invalid_channel_type: "This command cannot be used in this channel type.".into(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
        }
    }
}

/// Metrics recorder settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
}

// ── Serde helpers for Secret<String> ────────────────────────────────────────

fn serialize_option_secret<S: serde::Serializer>(
    secret: &Option<Secret<String>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match secret {
        Some(s) => serializer.serialize_some(s.expose_secret()),
        None => serializer.serialize_none(),
    }
}
