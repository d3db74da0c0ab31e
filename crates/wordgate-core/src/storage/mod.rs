mod config;
pub mod database;

pub use config::{AudioConfig, Config, IntervalPreset, ScheduleSettings, SecurityConfig};
pub use database::{Word, WordStore};

use std::path::PathBuf;

use crate::error::CoreError;

/// Returns `~/.config/wordgate[-dev]/` based on WORDGATE_ENV.
///
/// Set WORDGATE_ENV=dev to use a development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, CoreError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("WORDGATE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("wordgate-dev")
    } else {
        base_dir.join("wordgate")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Returns the directory holding recorded word clips, creating it if needed.
pub fn clips_dir() -> Result<PathBuf, CoreError> {
    let dir = data_dir()?.join("clips");
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
