//! # Wordgate Core Library
//!
//! Core business logic for wordgate, a parental-control tool that
//! periodically interrupts device use with an audio vocabulary quiz. All
//! operations are available through a standalone CLI binary; any richer host
//! is a thin layer over this same library.
//!
//! ## Architecture
//!
//! - **Quiz Engine**: a wall-clock-based state machine that requires the
//!   caller to periodically invoke `tick()` for deadline resolution
//! - **Scheduler**: computes and arms the single pending interruption wake
//!   signal from interval and active-day settings
//! - **Storage**: SQLite-based word catalog and TOML-based configuration
//! - **Session**: async runtime binding the engine to the presentation
//!   surface, audio facility, and scheduler
//!
//! ## Key Components
//!
//! - [`QuizEngine`]: answer/retry/failure state machine
//! - [`Scheduler`] / [`WakeTimer`]: wake-signal slot management
//! - [`WordStore`] / [`Config`]: persistence
//! - [`InterruptionSession`]: one interruption from wake to terminal outcome

pub mod audio;
pub mod error;
pub mod events;
pub mod quiz;
pub mod scheduler;
pub mod session;
pub mod storage;

pub use audio::{AudioOutput, CaptureBackend, Cue, Recorder, SystemCapture, SystemPlayer};
pub use error::{
    AudioError, ConfigError, CoreError, DatabaseError, QuizError, ScheduleError, SurfaceError,
};
pub use events::{Event, SessionOutcome};
pub use quiz::{QuizEngine, QuizRound, QuizState, MAX_FAILS, OPTION_COUNT};
pub use scheduler::{ScheduleOutcome, Scheduler, TokioWakeTimer, WakeTimer, INTERRUPTION_SLOT};
pub use session::{InterruptionSession, Surface, WordSource};
pub use storage::{Config, IntervalPreset, ScheduleSettings, Word, WordStore};
