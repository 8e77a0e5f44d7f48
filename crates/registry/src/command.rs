//! Text and slash commands.

use std::{fmt, sync::Arc};

use {
    herald_common::Handler,
    serde::{Deserialize, Serialize},
    serde_json::Value,
};

use crate::{
    error::{Error, Result},
    kind::EntryKind,
};

/// Help metadata shown to users.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandInfo {
    pub category: String,
    pub description: String,
    /// `[...]` optional, `<...>` required, `|` choice, `...` rest.
    pub usage: String,
    pub examples: Vec<String>,
    pub disabled: bool,
}

/// Who may run a command and where.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandRestrictions {
    /// Platform permission required, e.g. `ManageMessages`.
    pub permission: Option<String>,
    /// Channel kinds the command is limited to. Empty means any.
    pub channel_kinds: Vec<String>,
    /// Role ids allowed to run the command. Empty means any.
    pub role_ids: Vec<String>,
    /// User ids allowed to run the command. Empty means any.
    pub user_ids: Vec<String>,
    /// Whether the command may run in direct messages.
    pub dms: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CommandModes {
    pub text: bool,
    pub slash: bool,
}

struct Slash {
    descriptor: Value,
    handler: Arc<dyn Handler>,
}

/// A command invocable as a prefixed text message, a slash interaction, or
/// both.
pub struct Command {
    name: String,
    aliases: Vec<String>,
    info: CommandInfo,
    restrictions: CommandRestrictions,
    text: Option<Arc<dyn Handler>>,
    slash: Option<Slash>,
    autocomplete: Option<Arc<dyn Handler>>,
}

impl Command {
    pub fn builder(name: impl Into<String>) -> CommandBuilder {
        CommandBuilder {
            name: name.into(),
            aliases: Vec::new(),
            info: CommandInfo::default(),
            restrictions: CommandRestrictions::default(),
            text: None,
            slash: None,
            autocomplete: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn info(&self) -> &CommandInfo {
        &self.info
    }

    pub fn restrictions(&self) -> &CommandRestrictions {
        &self.restrictions
    }

    pub fn modes(&self) -> CommandModes {
        CommandModes {
            text: self.text.is_some(),
            slash: self.slash.is_some(),
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.info.disabled
    }

    /// Descriptor published to the platform for the slash form.
    pub fn slash_descriptor(&self) -> Option<&Value> {
        self.slash.as_ref().map(|s| &s.descriptor)
    }

    pub fn text_handler(&self) -> Option<&Arc<dyn Handler>> {
        self.text.as_ref()
    }

    pub fn slash_handler(&self) -> Option<&Arc<dyn Handler>> {
        self.slash.as_ref().map(|s| &s.handler)
    }

    pub fn autocomplete_handler(&self) -> Option<&Arc<dyn Handler>> {
        self.autocomplete.as_ref()
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("modes", &self.modes())
            .field("disabled", &self.info.disabled)
            .finish_non_exhaustive()
    }
}

pub struct CommandBuilder {
    name: String,
    aliases: Vec<String>,
    info: CommandInfo,
    restrictions: CommandRestrictions,
    text: Option<Arc<dyn Handler>>,
    slash: Option<Slash>,
    autocomplete: Option<Arc<dyn Handler>>,
}

impl CommandBuilder {
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    #[must_use]
    pub fn aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn info(mut self, info: CommandInfo) -> Self {
        self.info = info;
        self
    }

    #[must_use]
    pub fn restrictions(mut self, restrictions: CommandRestrictions) -> Self {
        self.restrictions = restrictions;
        self
    }

    /// Enable the text form.
    #[must_use]
    pub fn text(mut self, handler: Arc<dyn Handler>) -> Self {
        self.text = Some(handler);
        self
    }

    /// Enable the slash form with its platform descriptor.
    #[must_use]
    pub fn slash(mut self, descriptor: Value, handler: Arc<dyn Handler>) -> Self {
        self.slash = Some(Slash {
            descriptor,
            handler,
        });
        self
    }

    #[must_use]
    pub fn autocomplete(mut self, handler: Arc<dyn Handler>) -> Self {
        self.autocomplete = Some(handler);
        self
    }

    /// # Errors
    ///
    /// [`Error::InvalidEntry`] when the name is blank, no mode is enabled,
    /// an alias is blank, the slash descriptor is not a JSON object, or
    /// autocomplete is set without the slash form.
    pub fn build(self) -> Result<Command> {
        let invalid = |reason: &str| Err(Error::invalid(EntryKind::Command, &self.name, reason));
        if self.name.trim().is_empty() {
            return invalid("name must not be empty");
        }
        if self.text.is_none() && self.slash.is_none() {
            return invalid("enable at least one of the text or slash forms");
        }
        if self.aliases.iter().any(|a| a.trim().is_empty()) {
            return invalid("aliases must not be empty");
        }
        if let Some(slash) = &self.slash
            && !slash.descriptor.is_object()
        {
            return invalid("slash descriptor must be a JSON object");
        }
        if self.autocomplete.is_some() && self.slash.is_none() {
            return invalid("autocomplete requires the slash form");
        }

        Ok(Command {
            name: self.name,
            aliases: self.aliases,
            info: self.info,
            restrictions: self.restrictions,
            text: self.text,
            slash: self.slash,
            autocomplete: self.autocomplete,
        })
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, herald_common::handler_fn, serde_json::json};

    fn noop() -> Arc<dyn Handler> {
        handler_fn("noop", |_| async { Ok::<_, anyhow::Error>(Value::Null) })
    }

    #[test]
    fn modes_follow_handlers() {
        let text = Command::builder("ping").text(noop()).build().unwrap();
        assert_eq!(text.modes(), CommandModes { text: true, slash: false });
        assert!(text.slash_descriptor().is_none());

        let both = Command::builder("ping")
            .alias("p")
            .text(noop())
            .slash(json!({"name": "ping"}), noop())
            .autocomplete(noop())
            .build()
            .unwrap();
        assert_eq!(both.modes(), CommandModes { text: true, slash: true });
        assert_eq!(both.slash_descriptor(), Some(&json!({"name": "ping"})));
        assert_eq!(both.aliases(), ["p".to_string()]);
        assert!(both.autocomplete_handler().is_some());
    }

    #[test]
    fn rejects_commands_without_a_mode() {
        let err = Command::builder("ping").build().unwrap_err();
        assert!(matches!(err, Error::InvalidEntry { kind: EntryKind::Command, .. }));
    }

    #[test]
    fn rejects_bad_slash_descriptor() {
        let err = Command::builder("ping")
            .slash(json!("ping"), noop())
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("JSON object"), "{err}");
    }

    #[test]
    fn rejects_autocomplete_without_slash() {
        assert!(
            Command::builder("ping")
                .text(noop())
                .autocomplete(noop())
                .build()
                .is_err()
        );
    }

    #[test]
    fn rejects_blank_names() {
        assert!(Command::builder("  ").text(noop()).build().is_err());
        assert!(Command::builder("ping").alias("").text(noop()).build().is_err());
    }
}
