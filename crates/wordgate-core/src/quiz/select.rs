//! Quiz round selection.
//!
//! Shuffle-and-take over the qualifying pool: one uniformly random target,
//! four distinct distractor texts drawn without replacement from the rest.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::QuizError;
use crate::storage::Word;

/// Options presented per round: the target plus four distractors.
pub const OPTION_COUNT: usize = 5;
pub const DISTRACTOR_COUNT: usize = OPTION_COUNT - 1;

/// One quiz round's content. Transient; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizRound {
    pub target: Word,
    /// Exactly [`OPTION_COUNT`] distinct texts in randomized order,
    /// containing `target.text`.
    pub options: Vec<String>,
}

/// Build a round from the qualifying pool.
///
/// # Errors
///
/// [`QuizError::InsufficientContent`] when the pool holds fewer than
/// [`OPTION_COUNT`] words; [`QuizError::NotEnoughDistractors`] when duplicate
/// texts leave fewer than [`DISTRACTOR_COUNT`] distinct distractors.
pub fn build_round<R: Rng + ?Sized>(words: &[Word], rng: &mut R) -> Result<QuizRound, QuizError> {
    if words.len() < OPTION_COUNT {
        return Err(QuizError::InsufficientContent { found: words.len() });
    }

    let target = words[rng.gen_range(0..words.len())].clone();

    let mut seen: HashSet<&str> = HashSet::new();
    let mut distractors: Vec<&Word> = words
        .iter()
        .filter(|w| w.id != target.id && w.text != target.text && seen.insert(w.text.as_str()))
        .collect();
    distractors.shuffle(rng);
    distractors.truncate(DISTRACTOR_COUNT);
    if distractors.len() < DISTRACTOR_COUNT {
        return Err(QuizError::NotEnoughDistractors {
            found: distractors.len(),
        });
    }

    let mut options: Vec<String> = distractors.iter().map(|w| w.text.clone()).collect();
    options.push(target.text.clone());
    options.shuffle(rng);

    Ok(QuizRound { target, options })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;
    use std::path::PathBuf;

    fn pool(texts: &[&str]) -> Vec<Word> {
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| Word {
                id: i as i64 + 1,
                text: (*text).into(),
                audio_path: PathBuf::from(format!("/clips/{text}.wav")),
            })
            .collect()
    }

    #[test]
    fn round_has_five_distinct_options_including_target() {
        let words = pool(&["apple", "banana", "cherry", "date", "egg"]);
        let mut rng = Pcg64::seed_from_u64(7);
        let round = build_round(&words, &mut rng).unwrap();

        assert_eq!(round.options.len(), OPTION_COUNT);
        let distinct: HashSet<&String> = round.options.iter().collect();
        assert_eq!(distinct.len(), OPTION_COUNT);
        assert!(round.options.contains(&round.target.text));
    }

    #[test]
    fn small_pool_is_insufficient() {
        let words = pool(&["apple", "banana", "cherry", "date"]);
        let mut rng = Pcg64::seed_from_u64(7);
        assert!(matches!(
            build_round(&words, &mut rng),
            Err(QuizError::InsufficientContent { found: 4 })
        ));
    }

    #[test]
    fn duplicate_texts_shrink_the_distractor_pool() {
        // Five rows but only two distinct non-target texts.
        let words = pool(&["apple", "apple", "banana", "banana", "cherry"]);
        let mut rng = Pcg64::seed_from_u64(7);
        assert!(matches!(
            build_round(&words, &mut rng),
            Err(QuizError::NotEnoughDistractors { .. })
        ));
    }

    #[test]
    fn every_word_can_become_the_target() {
        let words = pool(&["apple", "banana", "cherry", "date", "egg", "fig"]);
        let mut rng = Pcg64::seed_from_u64(42);
        let mut targets = HashSet::new();
        for _ in 0..200 {
            targets.insert(build_round(&words, &mut rng).unwrap().target.text);
        }
        assert_eq!(targets.len(), words.len());
    }

    proptest! {
        #[test]
        fn options_always_drawn_from_pool(seed in any::<u64>(), extra in 0usize..20) {
            let texts: Vec<String> = (0..OPTION_COUNT + extra).map(|i| format!("word{i}")).collect();
            let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
            let words = pool(&refs);
            let mut rng = Pcg64::seed_from_u64(seed);

            let round = build_round(&words, &mut rng).unwrap();
            prop_assert_eq!(round.options.len(), OPTION_COUNT);
            let distinct: HashSet<&String> = round.options.iter().collect();
            prop_assert_eq!(distinct.len(), OPTION_COUNT);
            prop_assert!(round.options.contains(&round.target.text));
            for option in &round.options {
                prop_assert!(texts.contains(option));
            }
        }
    }
}
