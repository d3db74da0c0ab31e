use std::path::PathBuf;

use clap::Subcommand;
use wordgate_core::audio::{discard_clip, is_valid_clip};
use wordgate_core::{Config, SystemPlayer, WordStore};

use crate::common;

#[derive(Subcommand)]
pub enum WordAction {
    /// Add a word with a recorded clip
    Add {
        text: String,
        /// Import an existing audio file instead of recording
        #[arg(long)]
        audio: Option<PathBuf>,
        /// Record the clip now via the configured recorder
        #[arg(long)]
        record: bool,
    },
    /// Edit a word's text and/or clip
    Edit {
        id: i64,
        /// New word text
        #[arg(long)]
        text: Option<String>,
        /// Import a replacement audio file
        #[arg(long)]
        audio: Option<PathBuf>,
        /// Record a replacement clip now
        #[arg(long)]
        record: bool,
    },
    /// Delete a word and discard its clip
    Rm { id: i64 },
    /// List all words
    List,
    /// Play a word's clip
    Play { id: i64 },
}

pub fn run(action: WordAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = WordStore::open()?;
    let config = Config::load_or_default();

    match action {
        WordAction::Add {
            text,
            audio,
            record,
        } => {
            common::require_pin(&config)?;
            let text = text.trim().to_string();
            if text.is_empty() {
                return Err("word text cannot be empty".into());
            }
            let clip = common::resolve_clip(&config, &text, audio, record)?;
            let id = store.insert_word(&text, &clip)?;
            println!("added word {id}: {text}");
        }
        WordAction::Edit {
            id,
            text,
            audio,
            record,
        } => {
            common::require_pin(&config)?;
            let Some(mut word) = store.word_by_id(id)? else {
                return Err(format!("no word with id {id}").into());
            };
            if let Some(text) = text {
                let text = text.trim().to_string();
                if text.is_empty() {
                    return Err("word text cannot be empty".into());
                }
                word.text = text;
            }
            if audio.is_some() || record {
                let clip = common::resolve_clip(&config, &word.text, audio, record)?;
                if clip != word.audio_path {
                    // The replaced clip has no owner left.
                    discard_clip(&word.audio_path);
                }
                word.audio_path = clip;
            }
            store.update_word(&word)?;
            println!("updated word {id}: {}", word.text);
        }
        WordAction::Rm { id } => {
            common::require_pin(&config)?;
            let Some(word) = store.word_by_id(id)? else {
                return Err(format!("no word with id {id}").into());
            };
            store.delete_word(id)?;
            discard_clip(&word.audio_path);
            println!("removed word {id}: {}", word.text);
        }
        WordAction::List => {
            let words = store.all_words()?;
            let ready = store.count_words_with_audio()?;
            for word in &words {
                let status = if !word.has_audio() {
                    "no clip"
                } else if is_valid_clip(&word.audio_path) {
                    "ok"
                } else {
                    "clip missing"
                };
                println!("{:>4}  {:<24} [{status}]", word.id, word.text);
            }
            println!("{} words, {ready} quiz-ready (5 needed for quizzes)", words.len());
        }
        WordAction::Play { id } => {
            let Some(word) = store.word_by_id(id)? else {
                return Err(format!("no word with id {id}").into());
            };
            if !word.has_audio() {
                return Err(format!("word '{}' has no recorded clip", word.text).into());
            }
            let player = SystemPlayer::from_config(&config.audio);
            player.play_clip_blocking(&word.audio_path)?;
        }
    }
    Ok(())
}
