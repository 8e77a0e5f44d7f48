#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("statistics path not found: {path}")]
    PathNotFound { path: String },
}

impl Error {
    #[must_use]
    pub fn path_not_found(path: impl Into<String>) -> Self {
        Self::PathNotFound { path: path.into() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
