use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("Empty command")]
    EmptyCommand,

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("{0} timed out after {1:?}")]
    Timeout(String, Duration),

    #[error("Invalid item ID")]
    InvalidItem,

    #[error("Missing path")]
    MissingPath,

    #[error("Watcher error: {0}")]
    Watcher(#[from] notify::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
