//! Audio facility backed by external player/recorder processes.
//!
//! Commands come from [`AudioConfig`]; each is split on whitespace and the
//! clip path is appended as the final argument.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::Mutex;

use tracing::{debug, warn};

use super::{is_valid_clip, AudioOutput, CaptureBackend, Cue};
use crate::error::AudioError;
use crate::storage::AudioConfig;

fn spawn_command(cmd: &str, path: &Path) -> Result<Child, std::io::Error> {
    let mut parts = cmd.split_whitespace();
    let program = parts.next().unwrap_or_default();
    if program.is_empty() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "command not configured",
        ));
    }
    Command::new(program)
        .args(parts)
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
}

/// Playback via an external player process. One child at a time; a new
/// playback kills the previous one.
pub struct SystemPlayer {
    player_cmd: String,
    success_cue: Option<PathBuf>,
    failure_cue: Option<PathBuf>,
    child: Mutex<Option<Child>>,
}

impl SystemPlayer {
    pub fn from_config(config: &AudioConfig) -> Self {
        Self {
            player_cmd: config.player_cmd.clone(),
            success_cue: config.success_cue.clone(),
            failure_cue: config.failure_cue.clone(),
            child: Mutex::new(None),
        }
    }

    /// Play a clip and wait for the player to finish (used by `word play`).
    pub fn play_clip_blocking(&self, path: &Path) -> Result<(), AudioError> {
        self.validate(path)?;
        self.stop();
        let mut child = spawn_command(&self.player_cmd, path).map_err(|e| {
            AudioError::PlaybackFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        })?;
        let status = child.wait().map_err(|e| AudioError::PlaybackFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        if status.success() {
            Ok(())
        } else {
            Err(AudioError::PlaybackFailed {
                path: path.to_path_buf(),
                message: format!("player exited with {status}"),
            })
        }
    }

    fn validate(&self, path: &Path) -> Result<(), AudioError> {
        if !path.exists() {
            return Err(AudioError::ClipMissing {
                path: path.to_path_buf(),
            });
        }
        if !is_valid_clip(path) {
            return Err(AudioError::ClipEmpty {
                path: path.to_path_buf(),
            });
        }
        Ok(())
    }
}

impl AudioOutput for SystemPlayer {
    fn play_clip(&self, path: &Path) -> Result<(), AudioError> {
        self.validate(path)?;
        self.stop();
        let child =
            spawn_command(&self.player_cmd, path).map_err(|e| AudioError::PlaybackFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        debug!(path = %path.display(), "playback started");
        if let Ok(mut slot) = self.child.lock() {
            *slot = Some(child);
        }
        Ok(())
    }

    fn play_cue(&self, cue: Cue) {
        let clip = match cue {
            Cue::Success => self.success_cue.as_ref(),
            Cue::Failure => self.failure_cue.as_ref(),
        };
        let Some(clip) = clip else {
            debug!(?cue, "no cue clip configured");
            return;
        };
        // Cues run alongside word playback; don't touch the main child slot.
        match spawn_command(&self.player_cmd, clip) {
            Ok(mut child) => {
                std::thread::spawn(move || {
                    let _ = child.wait();
                });
            }
            Err(e) => warn!(?cue, error = %e, "failed to play cue"),
        }
    }

    fn stop(&self) {
        if let Ok(mut slot) = self.child.lock() {
            if let Some(mut child) = slot.take() {
                let _ = child.kill();
                let _ = child.wait();
                debug!("playback stopped");
            }
        }
    }
}

impl Drop for SystemPlayer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Capture via an external recorder process that writes until killed.
pub struct SystemCapture {
    recorder_cmd: String,
    child: Option<Child>,
}

impl SystemCapture {
    pub fn from_config(config: &AudioConfig) -> Self {
        Self {
            recorder_cmd: config.recorder_cmd.clone(),
            child: None,
        }
    }
}

impl CaptureBackend for SystemCapture {
    fn start(&mut self, path: &Path) -> Result<(), AudioError> {
        if self.child.is_some() {
            let _ = self.stop();
        }
        let child = spawn_command(&self.recorder_cmd, path)
            .map_err(|e| AudioError::CaptureFailed(e.to_string()))?;
        debug!(path = %path.display(), "recording started");
        self.child = Some(child);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), AudioError> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        child
            .kill()
            .map_err(|e| AudioError::CaptureFailed(e.to_string()))?;
        child
            .wait()
            .map_err(|e| AudioError::CaptureFailed(e.to_string()))?;
        debug!("recording stopped");
        Ok(())
    }
}

impl Drop for SystemCapture {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}
