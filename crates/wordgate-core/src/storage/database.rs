//! SQLite-backed word catalog.
//!
//! A single flat table of word records. A word is *qualifying* (usable in a
//! quiz) when its audio path is non-empty; rows with an empty path may exist
//! mid-edit and are excluded from quiz queries.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::{CoreError, DatabaseError};

/// A word record: text plus a recorded audio clip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    pub id: i64,
    pub text: String,
    /// Path of the recorded clip; empty when no recording has been saved yet.
    pub audio_path: PathBuf,
}

impl Word {
    /// Whether this word carries an audio reference at all.
    ///
    /// File-level validity (the clip exists and is non-empty) is checked at
    /// playback time, not here.
    pub fn has_audio(&self) -> bool {
        !self.audio_path.as_os_str().is_empty()
    }
}

/// SQLite database for the word catalog.
pub struct WordStore {
    conn: Connection,
}

impl WordStore {
    /// Open the store at `~/.config/wordgate/words.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, CoreError> {
        let path = data_dir()?.join("words.db");
        Ok(Self::open_at(&path)?)
    }

    /// Open the store at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, DatabaseError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory store (for tests).
    #[cfg(test)]
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS words (
                    id          INTEGER PRIMARY KEY AUTOINCREMENT,
                    text        TEXT NOT NULL,
                    audio_path  TEXT NOT NULL DEFAULT ''
                );

                CREATE INDEX IF NOT EXISTS idx_words_text ON words(text);",
            )
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))
    }

    /// Insert a word, returning its new id.
    pub fn insert_word(&self, text: &str, audio_path: &Path) -> Result<i64, DatabaseError> {
        self.conn.execute(
            "INSERT INTO words (text, audio_path) VALUES (?1, ?2)",
            params![text, audio_path.to_string_lossy()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Update an existing word's text and audio path.
    pub fn update_word(&self, word: &Word) -> Result<(), DatabaseError> {
        let changed = self.conn.execute(
            "UPDATE words SET text = ?1, audio_path = ?2 WHERE id = ?3",
            params![word.text, word.audio_path.to_string_lossy(), word.id],
        )?;
        if changed == 0 {
            return Err(DatabaseError::QueryFailed(format!(
                "no word with id {}",
                word.id
            )));
        }
        Ok(())
    }

    /// Delete a word row. The caller is responsible for discarding its clip.
    pub fn delete_word(&self, id: i64) -> Result<(), DatabaseError> {
        self.conn
            .execute("DELETE FROM words WHERE id = ?1", params![id])?;
        Ok(())
    }

    /// All words, ordered by text.
    pub fn all_words(&self) -> Result<Vec<Word>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, text, audio_path FROM words ORDER BY text ASC")?;
        let rows = stmt.query_map([], row_to_word)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Words carrying a non-empty audio reference -- the quiz candidate pool.
    pub fn words_with_audio(&self) -> Result<Vec<Word>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, text, audio_path FROM words WHERE audio_path != ''")?;
        let rows = stmt.query_map([], row_to_word)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Count of quiz-ready words.
    pub fn count_words_with_audio(&self) -> Result<usize, DatabaseError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM words WHERE audio_path != ''",
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Look a word up by id.
    pub fn word_by_id(&self, id: i64) -> Result<Option<Word>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, text, audio_path FROM words WHERE id = ?1")?;
        let result = stmt.query_row(params![id], row_to_word);
        match result {
            Ok(word) => Ok(Some(word)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Up to `count` words in random order.
    pub fn random_words(&self, count: usize) -> Result<Vec<Word>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, text, audio_path FROM words ORDER BY RANDOM() LIMIT ?1")?;
        let rows = stmt.query_map(params![count as i64], row_to_word)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

fn row_to_word(row: &rusqlite::Row<'_>) -> Result<Word, rusqlite::Error> {
    Ok(Word {
        id: row.get(0)?,
        text: row.get(1)?,
        audio_path: PathBuf::from(row.get::<_, String>(2)?),
    })
}
