//! Quiz engine implementation.
//!
//! The quiz engine is a wall-clock-based state machine. It does not use
//! internal threads - the caller is responsible for calling `tick()`
//! periodically and for running the content query when the engine is in
//! `Loading`.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Loading -> Presenting -> Resolving -> (Presenting | Loading | Terminal)
//! ```
//!
//! A correct answer resolves to `Terminal`; an incorrect one resolves back to
//! `Presenting` with the same round, until `MAX_FAILS` misses swap in a fresh
//! target via `Loading`. Every session ends in `Terminal` exactly once.

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::select::{build_round, QuizRound};
use crate::error::QuizError;
use crate::events::{Event, SessionOutcome};
use crate::storage::Word;

/// Misses allowed on one target before a new word is loaded.
pub const MAX_FAILS: u8 = 3;
/// How long the correct answer stays highlighted before the session ends.
pub const SUCCESS_DISPLAY_MS: u64 = 1000;
/// How long an incorrect highlight stays before the round resumes.
pub const RETRY_RESET_MS: u64 = 500;
/// Pause between exhausting a target and loading the next one.
pub const NEW_WORD_DELAY_MS: u64 = 1500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizState {
    Idle,
    Loading,
    Presenting,
    Resolving,
    Terminal,
}

/// What a `Resolving` state turns into once its deadline passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Resolution {
    Correct,
    Retry,
    NewWord,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PendingResolve {
    kind: Resolution,
    until_epoch_ms: u64,
}

/// Core quiz state machine.
///
/// Operates on wall-clock deadlines -- no internal thread. The caller is
/// responsible for calling `tick()` periodically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizEngine {
    state: QuizState,
    round: Option<QuizRound>,
    failure_count: u8,
    #[serde(default)]
    pending: Option<PendingResolve>,
    #[serde(default)]
    outcome: Option<SessionOutcome>,
}

impl QuizEngine {
    pub fn new() -> Self {
        Self {
            state: QuizState::Idle,
            round: None,
            failure_count: 0,
            pending: None,
            outcome: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> QuizState {
        self.state
    }

    pub fn failure_count(&self) -> u8 {
        self.failure_count
    }

    pub fn round(&self) -> Option<&QuizRound> {
        self.round.as_ref()
    }

    /// Set once `Terminal` is reached.
    pub fn outcome(&self) -> Option<SessionOutcome> {
        self.outcome
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// A wake signal arrived: begin loading content.
    pub fn wake(&mut self) -> Option<Event> {
        match self.state {
            QuizState::Idle => {
                self.state = QuizState::Loading;
                Some(Event::SessionStarted { at: Utc::now() })
            }
            _ => None, // Already woken.
        }
    }

    /// Deliver the qualifying-word query result while `Loading`.
    ///
    /// Builds a round and presents it, or ends the session when the pool is
    /// too small or round building fails.
    pub fn load<R: Rng + ?Sized>(&mut self, words: &[Word], rng: &mut R) -> Option<Event> {
        if self.state != QuizState::Loading {
            return None;
        }
        match build_round(words, rng) {
            Ok(round) => {
                debug!(target = %round.target.text, "quiz round ready");
                let event = Event::RoundStarted {
                    options: round.options.clone(),
                    clip: round.target.audio_path.clone(),
                    at: Utc::now(),
                };
                self.round = Some(round);
                self.state = QuizState::Presenting;
                Some(event)
            }
            Err(QuizError::InsufficientContent { found }) => {
                Some(self.finish(SessionOutcome::InsufficientContent { found }))
            }
            Err(QuizError::NotEnoughDistractors { .. }) => {
                Some(self.finish(SessionOutcome::LoadFailed))
            }
        }
    }

    /// Report that the content query itself failed.
    pub fn fail_load(&mut self, message: &str) -> Option<Event> {
        if self.state != QuizState::Loading {
            return None;
        }
        debug!(message, "quiz content load failed");
        Some(self.finish(SessionOutcome::LoadFailed))
    }

    /// The user picked an option. Ignored outside `Presenting`.
    pub fn select(&mut self, option: &str) -> Option<Event> {
        if self.state != QuizState::Presenting {
            return None;
        }
        let round = self.round.as_ref()?;

        if option == round.target.text {
            self.failure_count = 0;
            self.resolve_after(Resolution::Correct, SUCCESS_DISPLAY_MS);
            Some(Event::AnswerCorrect {
                option: option.to_string(),
                at: Utc::now(),
            })
        } else {
            self.failure_count += 1;
            let exhausted = self.failure_count >= MAX_FAILS;
            let failure_count = self.failure_count;
            if exhausted {
                // A fresh target gets a fresh attempt budget.
                self.failure_count = 0;
                self.resolve_after(Resolution::NewWord, NEW_WORD_DELAY_MS);
            } else {
                self.resolve_after(Resolution::Retry, RETRY_RESET_MS);
            }
            Some(Event::AnswerIncorrect {
                option: option.to_string(),
                failure_count,
                exhausted,
                at: Utc::now(),
            })
        }
    }

    /// Call periodically. Resolves elapsed deadlines.
    pub fn tick(&mut self) -> Option<Event> {
        if self.state != QuizState::Resolving {
            return None;
        }
        let pending = self.pending.as_ref()?;
        if now_ms() < pending.until_epoch_ms {
            return None;
        }
        let kind = pending.kind;
        self.pending = None;
        match kind {
            Resolution::Correct => Some(self.finish(SessionOutcome::Success)),
            Resolution::Retry => {
                // Same target, same options; only the highlighting clears.
                self.state = QuizState::Presenting;
                Some(Event::RoundResumed { at: Utc::now() })
            }
            Resolution::NewWord => {
                self.round = None;
                self.state = QuizState::Loading;
                Some(Event::RoundReloading { at: Utc::now() })
            }
        }
    }

    /// Host teardown: force the session to its terminal state.
    pub fn abort(&mut self) -> Option<Event> {
        if self.state == QuizState::Terminal {
            return None;
        }
        Some(self.finish(SessionOutcome::Aborted))
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn resolve_after(&mut self, kind: Resolution, delay_ms: u64) {
        self.state = QuizState::Resolving;
        self.pending = Some(PendingResolve {
            kind,
            until_epoch_ms: now_ms().saturating_add(delay_ms),
        });
    }

    fn finish(&mut self, outcome: SessionOutcome) -> Event {
        debug!(?outcome, "quiz session reached terminal state");
        self.state = QuizState::Terminal;
        self.pending = None;
        self.outcome = Some(outcome);
        Event::SessionEnded {
            outcome,
            at: Utc::now(),
        }
    }

    #[cfg(test)]
    fn expire_pending(&mut self) {
        if let Some(pending) = self.pending.as_mut() {
            pending.until_epoch_ms = 0;
        }
    }
}

impl Default for QuizEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;
    use std::path::PathBuf;

    fn pool() -> Vec<Word> {
        ["apple", "banana", "cherry", "date", "egg"]
            .iter()
            .enumerate()
            .map(|(i, text)| Word {
                id: i as i64 + 1,
                text: (*text).into(),
                audio_path: PathBuf::from(format!("/clips/{text}.wav")),
            })
            .collect()
    }

    fn presenting_engine() -> QuizEngine {
        let mut engine = QuizEngine::new();
        assert!(engine.wake().is_some());
        let event = engine.load(&pool(), &mut Pcg64::seed_from_u64(3));
        assert!(matches!(event, Some(Event::RoundStarted { .. })));
        engine
    }

    fn wrong_option(engine: &QuizEngine) -> String {
        let round = engine.round().unwrap();
        round
            .options
            .iter()
            .find(|o| **o != round.target.text)
            .unwrap()
            .clone()
    }

    #[test]
    fn wake_moves_idle_to_loading() {
        let mut engine = QuizEngine::new();
        assert!(engine.wake().is_some());
        assert_eq!(engine.state(), QuizState::Loading);
        // Waking twice is a no-op.
        assert!(engine.wake().is_none());
    }

    #[test]
    fn load_presents_a_round() {
        let engine = presenting_engine();
        assert_eq!(engine.state(), QuizState::Presenting);
        let round = engine.round().unwrap();
        assert_eq!(round.options.len(), 5);
        assert!(round.options.contains(&round.target.text));
    }

    #[test]
    fn small_pool_ends_session_without_options() {
        let mut engine = QuizEngine::new();
        engine.wake();
        let event = engine.load(&pool()[..3], &mut Pcg64::seed_from_u64(3));
        assert!(matches!(
            event,
            Some(Event::SessionEnded {
                outcome: SessionOutcome::InsufficientContent { found: 3 },
                ..
            })
        ));
        assert_eq!(engine.state(), QuizState::Terminal);
        assert!(engine.round().is_none());
    }

    #[test]
    fn failed_query_ends_session() {
        let mut engine = QuizEngine::new();
        engine.wake();
        let event = engine.fail_load("disk on fire");
        assert!(matches!(
            event,
            Some(Event::SessionEnded {
                outcome: SessionOutcome::LoadFailed,
                ..
            })
        ));
        assert_eq!(engine.state(), QuizState::Terminal);
    }

    #[test]
    fn correct_answer_resolves_to_terminal() {
        let mut engine = presenting_engine();
        let target = engine.round().unwrap().target.text.clone();

        let event = engine.select(&target);
        assert!(matches!(event, Some(Event::AnswerCorrect { .. })));
        assert_eq!(engine.state(), QuizState::Resolving);
        assert_eq!(engine.failure_count(), 0);

        // Deadline not yet elapsed: nothing resolves.
        assert!(engine.tick().is_none());

        engine.expire_pending();
        let event = engine.tick();
        assert!(matches!(
            event,
            Some(Event::SessionEnded {
                outcome: SessionOutcome::Success,
                ..
            })
        ));
        assert_eq!(engine.state(), QuizState::Terminal);
    }

    #[test]
    fn correct_answer_resets_failure_count() {
        let mut engine = presenting_engine();
        let wrong = wrong_option(&engine);
        engine.select(&wrong);
        assert_eq!(engine.failure_count(), 1);
        engine.expire_pending();
        assert!(matches!(engine.tick(), Some(Event::RoundResumed { .. })));

        let target = engine.round().unwrap().target.text.clone();
        engine.select(&target);
        assert_eq!(engine.failure_count(), 0);
    }

    #[test]
    fn incorrect_answer_retries_same_round() {
        let mut engine = presenting_engine();
        let options_before = engine.round().unwrap().options.clone();
        let target_before = engine.round().unwrap().target.clone();

        let wrong = wrong_option(&engine);
        let event = engine.select(&wrong);
        assert!(matches!(
            event,
            Some(Event::AnswerIncorrect {
                failure_count: 1,
                exhausted: false,
                ..
            })
        ));

        engine.expire_pending();
        assert!(matches!(engine.tick(), Some(Event::RoundResumed { .. })));
        assert_eq!(engine.state(), QuizState::Presenting);
        assert_eq!(engine.round().unwrap().options, options_before);
        assert_eq!(engine.round().unwrap().target, target_before);
    }

    #[test]
    fn selections_ignored_while_resolving() {
        let mut engine = presenting_engine();
        let wrong = wrong_option(&engine);
        engine.select(&wrong);
        assert_eq!(engine.state(), QuizState::Resolving);
        assert!(engine.select(&wrong).is_none());
        assert_eq!(engine.failure_count(), 1);
    }

    #[test]
    fn three_misses_reload_with_fresh_budget() {
        let mut engine = presenting_engine();

        for expected in 1..MAX_FAILS {
            let wrong = wrong_option(&engine);
            let event = engine.select(&wrong);
            assert!(matches!(
                event,
                Some(Event::AnswerIncorrect {
                    exhausted: false,
                    failure_count,
                    ..
                }) if failure_count == expected
            ));
            engine.expire_pending();
            assert!(matches!(engine.tick(), Some(Event::RoundResumed { .. })));
        }

        let wrong = wrong_option(&engine);
        let event = engine.select(&wrong);
        assert!(matches!(
            event,
            Some(Event::AnswerIncorrect {
                exhausted: true,
                failure_count: MAX_FAILS,
                ..
            })
        ));

        engine.expire_pending();
        let event = engine.tick();
        assert!(matches!(event, Some(Event::RoundReloading { .. })));
        assert_eq!(engine.state(), QuizState::Loading);
        assert_eq!(engine.failure_count(), 0);
        assert!(engine.round().is_none());

        // The reload presents a brand-new round, not Terminal.
        let event = engine.load(&pool(), &mut Pcg64::seed_from_u64(9));
        assert!(matches!(event, Some(Event::RoundStarted { .. })));
        assert_eq!(engine.state(), QuizState::Presenting);
    }

    #[test]
    fn abort_forces_terminal_once() {
        let mut engine = presenting_engine();
        let event = engine.abort();
        assert!(matches!(
            event,
            Some(Event::SessionEnded {
                outcome: SessionOutcome::Aborted,
                ..
            })
        ));
        assert_eq!(engine.state(), QuizState::Terminal);
        assert!(engine.abort().is_none());
    }
}
