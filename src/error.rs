//! Crate error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("invalid configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("io error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("both images must be set before marking or playing")]
    MissingImages,

    #[error("configuration has no differences")]
    NoDifferences,

    #[error("difference index {index} out of range (have {len})")]
    InvalidIndex { index: usize, len: usize },

    #[error("unknown difference field '{0}'")]
    UnknownField(String),

    #[error("invalid value '{value}' for field '{field}'")]
    InvalidValue { field: String, value: String },

    #[error("cannot start while a difference is being marked")]
    MarkingInProgress,

    #[error("image probe failed for '{path}': {reason}")]
    ImageProbe { path: String, reason: String },
}

impl GameError {
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, GameError>;
