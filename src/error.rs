use std::path::PathBuf;
use thiserror::Error;

/// Fatal conditions that end a run.
#[derive(Error, Debug)]
pub enum TermtimeError {
    /// Home directory or user identity could not be resolved.
    #[error("Environment error: {0}")]
    Environment(String),

    /// Neither a zsh nor a bash history file exists.
    #[error("No bash or zsh history file found in {}", .home.display())]
    NotFound { home: PathBuf },

    /// The history file exists but could not be opened or read.
    #[error("Failed to read history file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, TermtimeError>;
