use crate::kind::EntryKind;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{kind} '{name}' is already registered")]
    DuplicateRegistration { kind: EntryKind, name: String },

    #[error("invalid {kind} '{name}': {reason}")]
    InvalidEntry {
        kind: EntryKind,
        name: String,
        reason: String,
    },

    #[error(transparent)]
    Stats(#[from] herald_stats::Error),
}

impl Error {
    #[must_use]
    pub fn invalid(kind: EntryKind, name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEntry {
            kind,
            name: name.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
