//! Interruption session runtime.
//!
//! Binds the quiz engine to its collaborators: the word repository, the
//! audio facility, the presentation surface, and the scheduler. One session
//! runs at a time; the surface is attached before any content is shown and
//! detached on every exit path, and the next wake signal is re-armed at the
//! single terminal exit regardless of outcome.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, warn};

use crate::audio::{AudioOutput, Cue};
use crate::error::{DatabaseError, SurfaceError};
use crate::events::{Event, SessionOutcome};
use crate::quiz::{QuizEngine, QuizState};
use crate::scheduler::Scheduler;
use crate::storage::{ScheduleSettings, Word, WordStore};

/// Engine tick cadence while a session is live.
const TICK_MS: u64 = 50;

/// Read side of the word repository consumed by quiz sessions.
pub trait WordSource: Send + Sync {
    /// All words carrying a non-empty audio reference.
    fn qualifying_words(&self) -> Result<Vec<Word>, DatabaseError>;
}

impl WordSource for Mutex<WordStore> {
    fn qualifying_words(&self) -> Result<Vec<Word>, DatabaseError> {
        self.lock()
            .map_err(|_| DatabaseError::Locked)?
            .words_with_audio()
    }
}

/// Full-screen presentation surface for a quiz.
///
/// Attach may fail when the host has not granted the surface capability;
/// in that case no quiz is shown but the next wake signal still gets armed.
pub trait Surface: Send + Sync {
    fn attach(&self) -> Result<(), SurfaceError>;
    fn detach(&self);
    /// Present a round's answer options.
    fn show_round(&self, options: &[String]);
    /// Highlight one option as correct or incorrect.
    fn show_verdict(&self, option: &str, correct: bool);
    /// Clear highlighting for the next attempt on the same round.
    fn clear_verdict(&self);
    /// Short-lived user-facing notice.
    fn show_message(&self, message: &str);
}

type LoadTask = JoinHandle<Result<Vec<Word>, DatabaseError>>;

/// One quiz interruption from wake signal to terminal outcome.
pub struct InterruptionSession {
    words: Arc<dyn WordSource>,
    audio: Arc<dyn AudioOutput>,
    surface: Arc<dyn Surface>,
    scheduler: Scheduler,
}

impl InterruptionSession {
    pub fn new(
        words: Arc<dyn WordSource>,
        audio: Arc<dyn AudioOutput>,
        surface: Arc<dyn Surface>,
        scheduler: Scheduler,
    ) -> Self {
        Self {
            words,
            audio,
            surface,
            scheduler,
        }
    }

    /// Run a session to completion.
    ///
    /// `selections` carries the user's option picks; closing it tears the
    /// session down (host destruction). Always re-arms the scheduler before
    /// returning, whatever the outcome.
    pub async fn run(
        &self,
        settings: &ScheduleSettings,
        selections: &mut mpsc::UnboundedReceiver<String>,
    ) -> SessionOutcome {
        // Picks queued before this session belong to a dead surface.
        while selections.try_recv().is_ok() {}

        if let Err(e) = self.surface.attach() {
            warn!(error = %e, "cannot attach presentation surface");
            self.rearm(settings);
            return SessionOutcome::SurfaceUnavailable;
        }

        let outcome = self.drive(selections).await;

        self.audio.stop();
        self.surface.detach();
        self.rearm(settings);
        outcome
    }

    async fn drive(&self, selections: &mut mpsc::UnboundedReceiver<String>) -> SessionOutcome {
        let mut engine = QuizEngine::new();
        if let Some(event) = engine.wake() {
            debug!(?event, "interruption session started");
        }

        let mut load: Option<LoadTask> = Some(self.spawn_load());
        let mut ticker = tokio::time::interval(std::time::Duration::from_millis(TICK_MS));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        while engine.state() != QuizState::Terminal {
            tokio::select! {
                result = join_load(&mut load), if load.is_some() => {
                    load = None;
                    let event = match result {
                        Ok(Ok(words)) => engine.load(&words, &mut rand::thread_rng()),
                        Ok(Err(e)) => {
                            error!(error = %e, "quiz content query failed");
                            engine.fail_load(&e.to_string())
                        }
                        Err(e) => {
                            error!(error = %e, "quiz load task failed");
                            engine.fail_load(&e.to_string())
                        }
                    };
                    if let Some(event) = event {
                        self.apply(&engine, &event, &mut load);
                    }
                }
                selection = selections.recv() => {
                    match selection {
                        Some(option) => {
                            if let Some(event) = engine.select(&option) {
                                self.apply(&engine, &event, &mut load);
                            }
                        }
                        None => {
                            debug!("selection channel closed, aborting session");
                            engine.abort();
                        }
                    }
                }
                _ = ticker.tick() => {
                    if let Some(event) = engine.tick() {
                        self.apply(&engine, &event, &mut load);
                    }
                }
            }
        }

        // A load still in flight delivers nothing once the session is over.
        if let Some(handle) = load.take() {
            handle.abort();
        }
        engine.outcome().unwrap_or(SessionOutcome::Aborted)
    }

    fn spawn_load(&self) -> LoadTask {
        debug!("loading quiz content");
        let words = Arc::clone(&self.words);
        tokio::task::spawn_blocking(move || words.qualifying_words())
    }

    /// React to an engine event: drive the surface and audio collaborators.
    fn apply(&self, engine: &QuizEngine, event: &Event, load: &mut Option<LoadTask>) {
        match event {
            Event::SessionStarted { .. } => {}
            Event::RoundStarted { options, clip, .. } => {
                self.surface.show_round(options);
                if let Err(e) = self.audio.play_clip(clip) {
                    warn!(error = %e, "target clip playback failed");
                    self.surface.show_message("Audio playback failed");
                }
            }
            Event::AnswerCorrect { option, .. } => {
                self.audio.play_cue(Cue::Success);
                self.surface.show_verdict(option, true);
            }
            Event::AnswerIncorrect {
                option, exhausted, ..
            } => {
                self.audio.play_cue(Cue::Failure);
                self.surface.show_verdict(option, false);
                if *exhausted {
                    self.surface.show_message("Let's try a new word!");
                } else {
                    self.surface.show_message("Try again!");
                    // Replay the target so it is heard before the next attempt.
                    if let Some(round) = engine.round() {
                        if let Err(e) = self.audio.play_clip(&round.target.audio_path) {
                            warn!(error = %e, "target clip replay failed");
                        }
                    }
                }
            }
            Event::RoundResumed { .. } => {
                self.surface.clear_verdict();
            }
            Event::RoundReloading { .. } => {
                // Cancel any in-flight load before starting the next one.
                if let Some(handle) = load.take() {
                    handle.abort();
                }
                *load = Some(self.spawn_load());
            }
            Event::SessionEnded { outcome, .. } => match outcome {
                SessionOutcome::InsufficientContent { found } => {
                    let message = if *found == 0 {
                        "No words with audio found. Please add words with recordings.".to_string()
                    } else {
                        format!("Need at least 5 words with audio (found {found}).")
                    };
                    self.surface.show_message(&message);
                }
                SessionOutcome::LoadFailed => {
                    self.surface.show_message("Failed to load quiz");
                }
                _ => {}
            },
        }
    }

    fn rearm(&self, settings: &ScheduleSettings) {
        match self.scheduler.schedule_next(settings) {
            Ok(outcome) => debug!(?outcome, "next interruption scheduling outcome"),
            Err(e) => error!(error = %e, "failed to arm next interruption"),
        }
    }
}

type LoadResult = Result<Result<Vec<Word>, DatabaseError>, tokio::task::JoinError>;

async fn join_load(load: &mut Option<LoadTask>) -> LoadResult {
    match load.as_mut() {
        Some(handle) => handle.await,
        None => std::future::pending().await,
    }
}
