use std::{fmt, str::FromStr};

use {
    herald_config::StatusConfig,
    serde::{Deserialize, Serialize},
};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error(
        "unknown activity kind '{0}' (expected playing, streaming, listening, watching, competing or custom)"
    )]
    UnknownKind(String),

    #[error("streaming activity '{0}' needs a url")]
    MissingUrl(String),
}

/// What the bot is shown as doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Playing,
    Streaming,
    Listening,
    Watching,
    Competing,
    Custom,
}

impl ActivityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Playing => "playing",
            Self::Streaming => "streaming",
            Self::Listening => "listening",
            Self::Watching => "watching",
            Self::Competing => "competing",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "playing" => Self::Playing,
            "streaming" => Self::Streaming,
            "listening" => Self::Listening,
            "watching" => Self::Watching,
            "competing" => Self::Competing,
            "custom" => Self::Custom,
            _ => return Err(Error::UnknownKind(s.to_string())),
        })
    }
}

/// One presence status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub kind: ActivityKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Activity {
    pub fn new(kind: ActivityKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            url: None,
        }
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.name)
    }
}

impl TryFrom<&StatusConfig> for Activity {
    type Error = Error;

    fn try_from(status: &StatusConfig) -> Result<Self, Self::Error> {
        let kind: ActivityKind = status.kind.parse()?;
        if kind == ActivityKind::Streaming && status.url.is_none() {
            return Err(Error::MissingUrl(status.name.clone()));
        }
        Ok(Self {
            kind,
            name: status.name.clone(),
            url: status.url.clone(),
        })
    }
}
