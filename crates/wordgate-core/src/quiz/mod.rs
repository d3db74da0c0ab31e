mod engine;
mod select;

pub use engine::{
    QuizEngine, QuizState, MAX_FAILS, NEW_WORD_DELAY_MS, RETRY_RESET_MS, SUCCESS_DISPLAY_MS,
};
pub use select::{build_round, QuizRound, DISTRACTOR_COUNT, OPTION_COUNT};
