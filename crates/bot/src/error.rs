use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] herald_config::Error),

    #[error(transparent)]
    Plugins(#[from] herald_plugins::Error),

    #[error(transparent)]
    Registry(#[from] herald_registry::Error),

    #[error("invalid presence status: {0}")]
    Presence(#[from] herald_presence::Error),

    #[cfg(feature = "metrics")]
    #[error(transparent)]
    Metrics(#[from] herald_metrics::Error),

    #[error("bot.token is not configured")]
    MissingToken,

    #[error("platform session failed to {action}")]
    Session {
        action: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("{message}")]
    Message { message: String },
}

impl Error {
    #[must_use]
    pub fn session(action: &'static str, source: anyhow::Error) -> Self {
        Self::Session { action, source }
    }

    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
