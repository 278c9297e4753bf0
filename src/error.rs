use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResumeError {
    #[error("Project path does not exist: {}", .0.display())]
    ProjectNotFound(PathBuf),

    #[error("Project path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("No folder was selected")]
    NoFolderSelected,

    #[error("Editor '{0}' was not found on PATH")]
    EditorNotFound(String),

    #[error("Failed to launch editor '{editor}': {reason}")]
    EditorFailed { editor: String, reason: String },

    #[error("Invalid configuration in {}: {source}", path.display())]
    ConfigError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ResumeError>;
