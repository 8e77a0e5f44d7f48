//! Manifest formats, one per plugin kind.
//!
//! Every manifest is a TOML document describing exactly one definition.
//! Descriptors are free-form tables passed through to the platform as JSON.

use std::{collections::HashMap, fmt, path::Path};

use {
    herald_registry::{
        CannedMessage, ChannelCondition, Command, CommandInfo, CommandRestrictions, Component,
        ComponentInfo, ComponentKind, Event, IdCondition, MessageCondition, PluginDefinition,
        Trigger,
    },
    serde::{Deserialize, Serialize, de::DeserializeOwned},
    serde_json::Value,
};

use crate::{
    catalog::HandlerCatalog,
    error::{Error, Result},
};

/// The directory a manifest was found in decides its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginKind {
    Commands,
    Events,
    Triggers,
    Buttons,
    ContextMenus,
    SelectMenus,
    Modals,
    CannedMessages,
}

impl PluginKind {
    /// Load order at startup.
    pub const ALL: [Self; 8] = [
        Self::Events,
        Self::Commands,
        Self::Triggers,
        Self::Buttons,
        Self::ContextMenus,
        Self::SelectMenus,
        Self::Modals,
        Self::CannedMessages,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Commands => "commands",
            Self::Events => "events",
            Self::Triggers => "triggers",
            Self::Buttons => "buttons",
            Self::ContextMenus => "context_menus",
            Self::SelectMenus => "select_menus",
            Self::Modals => "modals",
            Self::CannedMessages => "canned_messages",
        }
    }

    pub fn component_kind(self) -> Option<ComponentKind> {
        match self {
            Self::Buttons => Some(ComponentKind::Button),
            Self::ContextMenus => Some(ComponentKind::ContextMenu),
            Self::SelectMenus => Some(ComponentKind::SelectMenu),
            Self::Modals => Some(ComponentKind::Modal),
            Self::Commands | Self::Events | Self::Triggers | Self::CannedMessages => None,
        }
    }
}

impl fmt::Display for PluginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a manifest gets its handler from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HandlerRef {
    /// Key into the [`HandlerCatalog`].
    Named(String),
    /// Inline shell command.
    Shell(ShellHandlerConfig),
}

/// Inline shell handler declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellHandlerConfig {
    pub command: String,
    /// Seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    #[serde(default)]
    pub env: HashMap<String, String>,
}

fn default_timeout() -> u64 {
    10
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct HandlerSection {
    handler: HandlerRef,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SlashSection {
    handler: HandlerRef,
    descriptor: Value,
    #[serde(default)]
    autocomplete: Option<HandlerRef>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CommandManifest {
    name: String,
    #[serde(default)]
    aliases: Vec<String>,
    #[serde(default)]
    info: CommandInfo,
    #[serde(default)]
    restrictions: CommandRestrictions,
    #[serde(default)]
    text: Option<HandlerSection>,
    #[serde(default)]
    slash: Option<SlashSection>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EventManifest {
    name: String,
    handler: HandlerRef,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TriggerManifest {
    name: String,
    #[serde(default)]
    disabled: bool,
    #[serde(default)]
    message: MessageCondition,
    #[serde(default)]
    channel: ChannelCondition,
    #[serde(default)]
    role: IdCondition,
    #[serde(default)]
    user: IdCondition,
    handler: HandlerRef,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ComponentManifest {
    name: String,
    #[serde(default)]
    info: Option<ComponentInfo>,
    #[serde(default)]
    descriptor: Option<Value>,
    handler: HandlerRef,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CannedMessageManifest {
    name: String,
    #[serde(default)]
    display_name: String,
    handler: HandlerRef,
}

fn parse<T: DeserializeOwned>(content: &str, path: &Path) -> Result<T> {
    toml::from_str(content).map_err(|e| Error::invalid_manifest(path, e.to_string()))
}

/// Parse `content` as a `kind` manifest and build the definition it
/// describes. Inline shell handlers run with the manifest's directory as
/// their working directory.
pub fn parse_manifest(
    kind: PluginKind,
    content: &str,
    path: &Path,
    catalog: &HandlerCatalog,
) -> Result<PluginDefinition> {
    let dir = path.parent();
    let definition = match kind {
        PluginKind::Commands => {
            let manifest: CommandManifest = parse(content, path)?;
            let mut builder = Command::builder(manifest.name.as_str())
                .aliases(manifest.aliases)
                .info(manifest.info)
                .restrictions(manifest.restrictions);
            if let Some(text) = manifest.text {
                let label = format!("{}:text", manifest.name);
                builder = builder.text(catalog.resolve(&text.handler, &label, dir)?);
            }
            if let Some(slash) = manifest.slash {
                let label = format!("{}:slash", manifest.name);
                builder = builder.slash(
                    slash.descriptor,
                    catalog.resolve(&slash.handler, &label, dir)?,
                );
                if let Some(autocomplete) = slash.autocomplete {
                    let label = format!("{}:autocomplete", manifest.name);
                    builder = builder.autocomplete(catalog.resolve(&autocomplete, &label, dir)?);
                }
            }
            builder.build()?.into()
        },
        PluginKind::Events => {
            let manifest: EventManifest = parse(content, path)?;
            let handler = catalog.resolve(&manifest.handler, &manifest.name, dir)?;
            Event::new(manifest.name, handler)?.into()
        },
        PluginKind::Triggers => {
            let manifest: TriggerManifest = parse(content, path)?;
            let handler = catalog.resolve(&manifest.handler, &manifest.name, dir)?;
            Trigger::builder(manifest.name)
                .disabled(manifest.disabled)
                .message(manifest.message)
                .channel(manifest.channel)
                .role(manifest.role)
                .user(manifest.user)
                .handler(handler)
                .build()?
                .into()
        },
        PluginKind::Buttons
        | PluginKind::ContextMenus
        | PluginKind::SelectMenus
        | PluginKind::Modals => {
            let manifest: ComponentManifest = parse(content, path)?;
            let component_kind = kind
                .component_kind()
                .ok_or_else(|| Error::invalid_manifest(path, "not a component kind"))?;
            let handler = catalog.resolve(&manifest.handler, &manifest.name, dir)?;
            let mut builder = Component::builder(component_kind, manifest.name).handler(handler);
            if let Some(info) = manifest.info {
                builder = builder.info(info);
            }
            if let Some(descriptor) = manifest.descriptor {
                builder = builder.descriptor(descriptor);
            }
            builder.build()?.into()
        },
        PluginKind::CannedMessages => {
            let manifest: CannedMessageManifest = parse(content, path)?;
            let handler = catalog.resolve(&manifest.handler, &manifest.name, dir)?;
            CannedMessage::new(manifest.name, manifest.display_name, handler)?.into()
        },
    };
    Ok(definition)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        herald_common::handler_fn,
        herald_registry::{EntryKind, TriggerBlock},
        serde_json::json,
    };

    fn catalog() -> HandlerCatalog {
        let mut catalog = HandlerCatalog::new();
        for name in ["ping", "greet", "rules"] {
            catalog.insert(
                name,
                handler_fn(name, |_| async { Ok::<_, anyhow::Error>(Value::Null) }),
            );
        }
        catalog
    }

    fn load(kind: PluginKind, content: &str) -> Result<PluginDefinition> {
        parse_manifest(kind, content, Path::new("plugins/test.toml"), &catalog())
    }

    #[test]
    fn command_with_both_modes() {
        let definition = load(
            PluginKind::Commands,
            r#"
name = "ping"
aliases = ["p"]

[info]
category = "util"
description = "Replies with pong"

[text]
handler = "ping"

[slash]
handler = "ping"
descriptor = { name = "ping", description = "Replies with pong" }
"#,
        )
        .unwrap();

        let PluginDefinition::Command(command) = definition else {
            panic!("expected a command");
        };
        assert_eq!(command.aliases(), ["p".to_string()]);
        assert_eq!(command.info().category, "util");
        assert!(command.modes().text && command.modes().slash);
        assert_eq!(
            command.slash_descriptor(),
            Some(&json!({"name": "ping", "description": "Replies with pong"}))
        );
    }

    #[test]
    fn inline_shell_handler() {
        let definition = load(
            PluginKind::Events,
            r#"
name = "guildCreate"
handler = { command = "./on-guild.sh", timeout = 3 }
"#,
        )
        .unwrap();
        assert_eq!(definition.kind(), EntryKind::Event);
        assert_eq!(definition.name(), "guildCreate");
    }

    #[test]
    fn trigger_blocks_are_read() {
        let definition = load(
            PluginKind::Triggers,
            r#"
name = "hello"
handler = "greet"

[message]
activated = true
contains = ["hello"]
regex = ["^hi+$"]
"#,
        )
        .unwrap();
        let PluginDefinition::Trigger(trigger) = definition else {
            panic!("expected a trigger");
        };
        assert_eq!(
            trigger.activated_blocks().collect::<Vec<_>>(),
            vec![TriggerBlock::Message]
        );
        assert_eq!(trigger.patterns().len(), 1);
    }

    #[test]
    fn context_menu_needs_descriptor() {
        let err = load(
            PluginKind::ContextMenus,
            r#"
name = "Report"
handler = "ping"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Registry(_)), "{err}");

        let definition = load(
            PluginKind::ContextMenus,
            r#"
name = "Report"
handler = "ping"
descriptor = { name = "Report", type = 3 }
"#,
        )
        .unwrap();
        assert_eq!(
            definition.kind(),
            EntryKind::Component(ComponentKind::ContextMenu)
        );
    }

    #[test]
    fn canned_message_display_name_defaults_to_name() {
        let definition = load(
            PluginKind::CannedMessages,
            r#"
name = "rules"
handler = "rules"
"#,
        )
        .unwrap();
        let PluginDefinition::CannedMessage(message) = definition else {
            panic!("expected a canned message");
        };
        assert_eq!(message.display_name(), "rules");
    }

    #[test]
    fn unknown_handler_is_rejected() {
        let err = load(
            PluginKind::Events,
            r#"
name = "ready"
handler = "missing"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnknownHandler { ref name } if name == "missing"));
    }

    #[test]
    fn missing_fields_name_the_file() {
        let err = load(PluginKind::Events, "handler = \"ping\"").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("plugins/test.toml"), "{message}");
        assert!(message.contains("name"), "{message}");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = load(
            PluginKind::Events,
            r#"
name = "ready"
handler = "ping"
once = true
"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidManifest { .. }));
    }

    #[test]
    fn command_without_modes_is_invalid() {
        let err = load(PluginKind::Commands, "name = \"ping\"").unwrap_err();
        assert!(matches!(err, Error::Registry(_)));
    }
}
