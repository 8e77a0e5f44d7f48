//! Triggers: handlers run when a message matches a set of conditions.
//!
//! Each trigger carries four condition blocks. Only blocks with `activated`
//! set take part in matching and in registration statistics. Matching itself
//! belongs to the platform layer; this module validates and stores the
//! conditions.

use std::{fmt, sync::Arc};

use {
    herald_common::Handler,
    herald_stats::paths,
    regex::Regex,
    serde::{Deserialize, Serialize},
};

use crate::{
    error::{Error, Result},
    kind::EntryKind,
};

/// Message content conditions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageCondition {
    pub activated: bool,
    pub requires_prefix: bool,
    pub prefixes: Vec<String>,
    pub contains: Vec<String>,
    pub suffixes: Vec<String>,
    /// Regular expressions, compiled when the trigger is built.
    pub regex: Vec<String>,
}

/// Channel conditions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelCondition {
    pub activated: bool,
    pub requires_prefix: bool,
    pub ids: Vec<String>,
    pub kinds: Vec<String>,
}

/// Role or user id conditions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdCondition {
    pub activated: bool,
    pub requires_prefix: bool,
    pub ids: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerBlock {
    Message,
    Channel,
    Role,
    User,
}

impl TriggerBlock {
    pub const ALL: [Self; 4] = [Self::Message, Self::Channel, Self::Role, Self::User];

    pub fn stats_path(self) -> &'static str {
        match self {
            Self::Message => paths::TRIGGERS_MESSAGE,
            Self::Channel => paths::TRIGGERS_CHANNEL,
            Self::Role => paths::TRIGGERS_ROLE,
            Self::User => paths::TRIGGERS_USER,
        }
    }
}

pub struct Trigger {
    name: String,
    disabled: bool,
    message: MessageCondition,
    channel: ChannelCondition,
    role: IdCondition,
    user: IdCondition,
    patterns: Vec<Regex>,
    handler: Arc<dyn Handler>,
}

impl Trigger {
    pub fn builder(name: impl Into<String>) -> TriggerBuilder {
        TriggerBuilder {
            name: name.into(),
            disabled: false,
            message: MessageCondition::default(),
            channel: ChannelCondition::default(),
            role: IdCondition::default(),
            user: IdCondition::default(),
            handler: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn message(&self) -> &MessageCondition {
        &self.message
    }

    pub fn channel(&self) -> &ChannelCondition {
        &self.channel
    }

    pub fn role(&self) -> &IdCondition {
        &self.role
    }

    pub fn user(&self) -> &IdCondition {
        &self.user
    }

    /// Compiled forms of [`MessageCondition::regex`], same order.
    pub fn patterns(&self) -> &[Regex] {
        &self.patterns
    }

    pub fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }

    pub fn is_activated(&self, block: TriggerBlock) -> bool {
        match block {
            TriggerBlock::Message => self.message.activated,
            TriggerBlock::Channel => self.channel.activated,
            TriggerBlock::Role => self.role.activated,
            TriggerBlock::User => self.user.activated,
        }
    }

    /// Activated blocks in message, channel, role, user order.
    pub fn activated_blocks(&self) -> impl Iterator<Item = TriggerBlock> + '_ {
        TriggerBlock::ALL
            .into_iter()
            .filter(|block| self.is_activated(*block))
    }
}

impl fmt::Debug for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Trigger")
            .field("name", &self.name)
            .field("disabled", &self.disabled)
            .field("blocks", &self.activated_blocks().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

pub struct TriggerBuilder {
    name: String,
    disabled: bool,
    message: MessageCondition,
    channel: ChannelCondition,
    role: IdCondition,
    user: IdCondition,
    handler: Option<Arc<dyn Handler>>,
}

impl TriggerBuilder {
    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    #[must_use]
    pub fn message(mut self, condition: MessageCondition) -> Self {
        self.message = condition;
        self
    }

    #[must_use]
    pub fn channel(mut self, condition: ChannelCondition) -> Self {
        self.channel = condition;
        self
    }

    #[must_use]
    pub fn role(mut self, condition: IdCondition) -> Self {
        self.role = condition;
        self
    }

    #[must_use]
    pub fn user(mut self, condition: IdCondition) -> Self {
        self.user = condition;
        self
    }

    #[must_use]
    pub fn handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handler = Some(handler);
        self
    }

    /// # Errors
    ///
    /// [`Error::InvalidEntry`] when the name is blank, no handler was set, or
    /// a message regex does not compile.
    pub fn build(self) -> Result<Trigger> {
        let invalid = |reason: String| Error::invalid(EntryKind::Trigger, &self.name, reason);
        if self.name.trim().is_empty() {
            return Err(invalid("name must not be empty".into()));
        }
        let handler = self
            .handler
            .clone()
            .ok_or_else(|| invalid("a handler is required".into()))?;
        let patterns = self
            .message
            .regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| invalid(format!("bad regex '{pattern}': {e}")))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Trigger {
            name: self.name,
            disabled: self.disabled,
            message: self.message,
            channel: self.channel,
            role: self.role,
            user: self.user,
            patterns,
            handler,
        })
    }
}
