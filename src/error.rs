use thiserror::Error;

use crate::core::TaskId;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {detail}")]
    Api { status: u16, detail: String },

    #[error("No home directory")]
    NoHomeDir,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("A task cannot depend on itself (task {0})")]
    SelfDependency(TaskId),

    #[error("Need at least 2 tasks to infer dependencies (found {found})")]
    NotEnoughTasks { found: usize },

    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),
}

impl Error {
    /// Whether the error was raised locally, before any request was sent.
    pub fn is_local_validation(&self) -> bool {
        matches!(
            self,
            Error::Validation(_) | Error::SelfDependency(_) | Error::NotEnoughTasks { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
