use serde::Serialize;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Task error: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Backend command '{command}' failed: {message}")]
    Backend { command: String, message: String },

    #[error("No active profile selected")]
    NoActiveProfile,

    #[error("Device login failed: {0}")]
    LoginFailed(String),

    #[error("Device login timed out after {0} seconds")]
    LoginTimedOut(u64),

    #[error("Modrinth API error: {0}")]
    ModrinthApi(String),

    #[error("Invalid Mod Loader: {0}")]
    InvalidModLoader(String),

    #[error("Invalid Input: {0}")]
    InvalidInput(String),

    #[error("Other error: {0}")]
    Other(String),
}

impl AppError {
    /// Shorthand for a failed backend round trip.
    pub fn backend(command: &str, message: impl Into<String>) -> Self {
        AppError::Backend {
            command: command.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct CommandError {
    pub message: String,
    pub kind: String,
}

impl From<AppError> for CommandError {
    fn from(error: AppError) -> Self {
        CommandError {
            message: error.to_string(),
            kind: format!("{:?}", error),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
