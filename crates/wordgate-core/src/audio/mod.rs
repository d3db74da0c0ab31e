//! Audio clip handling: validation, lifecycle, and the capture/playback
//! facility contracts.
//!
//! Exactly one playback handle and one recording handle are live at a time;
//! starting a new session of either kind tears the previous one down first.

mod system;

pub use system::{SystemCapture, SystemPlayer};

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{AudioError, CoreError};
use crate::storage::clips_dir;

/// Feedback sounds played on answer resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Success,
    Failure,
}

/// Playback side of the audio facility.
pub trait AudioOutput: Send + Sync {
    /// Play a clip, tearing down any previous playback first.
    fn play_clip(&self, path: &Path) -> Result<(), AudioError>;

    /// Play a feedback cue. Cues are best-effort and never fail the session.
    fn play_cue(&self, cue: Cue);

    /// Stop and release any active playback.
    fn stop(&self);
}

/// Capture side of the audio facility. Driven exclusively through
/// [`Recorder`], which owns the one-live-recording invariant.
pub trait CaptureBackend: Send {
    fn start(&mut self, path: &Path) -> Result<(), AudioError>;
    fn stop(&mut self) -> Result<(), AudioError>;
}

/// A clip is playable when the file exists and has content.
pub fn is_valid_clip(path: &Path) -> bool {
    match std::fs::metadata(path) {
        Ok(meta) => meta.is_file() && meta.len() > 0,
        Err(_) => false,
    }
}

/// Delete a superseded clip file. Missing files are fine.
pub fn discard_clip(path: &Path) {
    if path.as_os_str().is_empty() {
        return;
    }
    if let Err(e) = std::fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %path.display(), error = %e, "failed to delete clip");
        }
    }
}

/// Allocate a fresh clip path for a word under the clips directory.
pub fn clip_path_for(text: &str) -> Result<PathBuf, CoreError> {
    let slug: String = text
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(24)
        .collect::<String>()
        .to_lowercase();
    let slug = if slug.is_empty() { "word".into() } else { slug };
    Ok(clips_dir()?.join(format!("{slug}-{}.wav", uuid::Uuid::new_v4())))
}

/// Exclusive owner of the single recording handle.
///
/// `start` tears down any in-flight recording; `stop` hands back the path
/// only when the produced file is a valid clip, deleting it otherwise so an
/// empty recording can never become a word's audio reference.
pub struct Recorder {
    backend: Box<dyn CaptureBackend>,
    current: Option<PathBuf>,
}

impl Recorder {
    pub fn new(backend: Box<dyn CaptureBackend>) -> Self {
        Self {
            backend,
            current: None,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.current.is_some()
    }

    /// Begin recording to `path`.
    pub fn start(&mut self, path: PathBuf) -> Result<(), AudioError> {
        if self.current.is_some() {
            // Previous session's result is abandoned, not returned.
            if let Err(e) = self.stop() {
                warn!(error = %e, "discarding previous recording before restart");
            }
        }
        self.backend.start(&path)?;
        self.current = Some(path);
        Ok(())
    }

    /// Finish recording and validate the produced file.
    pub fn stop(&mut self) -> Result<PathBuf, AudioError> {
        let path = self.current.take().ok_or(AudioError::NoActiveRecording)?;
        if let Err(e) = self.backend.stop() {
            // The file may be incomplete; don't leave it behind.
            discard_clip(&path);
            return Err(e);
        }
        if is_valid_clip(&path) {
            Ok(path)
        } else {
            discard_clip(&path);
            Err(AudioError::EmptyRecording { path })
        }
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        if self.current.is_some() {
            let _ = self.stop();
        }
    }
}
