use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JobwatchError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] crate::store::StoreError),

    #[error("Intake error: {0}")]
    Intake(#[from] IntakeError),

    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),

    #[error("Database error: {0}")]
    Database(#[from] crate::db::DatabaseError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Invalid pattern '{name}': {reason}")]
    InvalidPattern { name: String, reason: String },
}

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("Failed to spawn intake worker: {0}")]
    SpawnFailed(String),

    #[error("Intake channel closed")]
    ChannelClosed,
}

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Invalid log filter: {0}")]
    Filter(String),

    #[error("A global logger is already installed: {0}")]
    AlreadyInitialized(String),
}

pub type Result<T> = std::result::Result<T, JobwatchError>;
