//! Core error types for wordgate-core.
//!
//! One enum per domain, unified under [`CoreError`] via `thiserror`.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for wordgate-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Audio capture/playback errors
    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    /// Quiz content errors
    #[error("Quiz error: {0}")]
    Quiz(#[from] QuizError),

    /// Wake-timer errors
    #[error("Schedule error: {0}")]
    Schedule(#[from] ScheduleError),

    /// Presentation surface errors
    #[error("Surface error: {0}")]
    Surface(#[from] SurfaceError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

/// Audio capture and playback errors.
#[derive(Error, Debug)]
pub enum AudioError {
    /// Clip file does not exist
    #[error("Audio clip not found at {path}")]
    ClipMissing { path: PathBuf },

    /// Clip file exists but has no content
    #[error("Audio clip at {path} is empty")]
    ClipEmpty { path: PathBuf },

    /// A recording session produced an empty or missing file
    #[error("Recording produced an empty or missing file at {path}")]
    EmptyRecording { path: PathBuf },

    /// The capture backend failed to start or stop
    #[error("Audio capture failed: {0}")]
    CaptureFailed(String),

    /// Playback could not be started
    #[error("Playback failed for {path}: {message}")]
    PlaybackFailed { path: PathBuf, message: String },

    /// stop() was called with no recording in progress
    #[error("No recording in progress")]
    NoActiveRecording,
}

/// Quiz content-selection errors.
#[derive(Error, Debug)]
pub enum QuizError {
    /// Fewer qualifying words than a round needs
    #[error("Not enough words with audio for a quiz (found {found}, need 5)")]
    InsufficientContent { found: usize },

    /// Distractor pool too small (should not occur once the content guard passed)
    #[error("Not enough distinct distractors (found {found}, need 4)")]
    NotEnoughDistractors { found: usize },
}

/// Wake-timer errors.
#[derive(Error, Debug)]
pub enum ScheduleError {
    /// The wake-signal facility could not arm the requested trigger
    #[error("Failed to arm wake signal: {0}")]
    ArmFailed(String),
}

/// Presentation surface errors.
#[derive(Error, Debug)]
pub enum SurfaceError {
    /// The host has not granted the surface-drawing capability
    #[error("Surface capability not granted")]
    NotPermitted,

    /// Attaching the surface failed
    #[error("Failed to attach surface: {0}")]
    AttachFailed(String),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
