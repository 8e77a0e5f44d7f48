use std::{
    fmt,
    path::{Path, PathBuf},
};

use {herald_common::FromMessage, thiserror::Error};

/// One plugin file that failed to load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginFailure {
    pub path: PathBuf,
    pub reason: String,
}

impl fmt::Display for PluginFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.reason)
    }
}

fn join_failures(failures: &[PluginFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read plugin directory {}: {source}", .dir.display())]
    ReadDir {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "failed to load {} plugin file(s) from {}: {}",
        .failures.len(),
        .dir.display(),
        join_failures(.failures)
    )]
    PluginLoad {
        dir: PathBuf,
        failures: Vec<PluginFailure>,
    },

    #[error("invalid manifest {}: {reason}", .path.display())]
    InvalidManifest { path: PathBuf, reason: String },

    #[error("unknown handler '{name}'")]
    UnknownHandler { name: String },

    #[error(transparent)]
    Registry(#[from] herald_registry::Error),

    #[error("{message}")]
    Message { message: String },
}

impl Error {
    #[must_use]
    pub fn invalid_manifest(path: &Path, reason: impl Into<String>) -> Self {
        Self::InvalidManifest {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn unknown_handler(name: impl Into<String>) -> Self {
        Self::UnknownHandler { name: name.into() }
    }

    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }
}

impl FromMessage for Error {
    fn from_message(message: String) -> Self {
        Self::Message { message }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

herald_common::impl_context!();
