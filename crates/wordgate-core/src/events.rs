use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every state change in a quiz session produces an Event.
/// The hosting surface reacts to them; they also feed structured logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A wake signal arrived and the session began loading content.
    SessionStarted {
        at: DateTime<Utc>,
    },
    /// A round is ready: show the options and play the target clip once.
    RoundStarted {
        options: Vec<String>,
        clip: PathBuf,
        at: DateTime<Utc>,
    },
    AnswerCorrect {
        option: String,
        at: DateTime<Utc>,
    },
    AnswerIncorrect {
        option: String,
        failure_count: u8,
        /// True when this miss exhausted the attempt budget for the target.
        exhausted: bool,
        at: DateTime<Utc>,
    },
    /// Retry delay elapsed: clear highlighting, same target and options.
    RoundResumed {
        at: DateTime<Utc>,
    },
    /// Attempt budget exhausted: abandon the round and load a new target.
    RoundReloading {
        at: DateTime<Utc>,
    },
    SessionEnded {
        outcome: SessionOutcome,
        at: DateTime<Utc>,
    },
}

/// The single terminal result of an interruption session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum SessionOutcome {
    /// The user picked the target word.
    Success,
    /// Fewer than five qualifying words exist; no quiz was shown.
    InsufficientContent { found: usize },
    /// Content loading or round building failed unexpectedly.
    LoadFailed,
    /// The hosting context tore the session down early.
    Aborted,
    /// The presentation surface could not be attached.
    SurfaceUnavailable,
}
