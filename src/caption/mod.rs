pub mod window;

pub use window::{find_active, select_window, select_window_for_index, Window, WindowSize};

use crate::error::{CaptionError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// One transcribed word with its timing in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

impl Word {
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }

    /// Whether `time` falls inside this word, both ends inclusive.
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && time <= self.end
    }

    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}

/// A word as returned by the transcription provider, timed in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderWord {
    pub text: String,
    pub start: u64,
    pub end: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl From<ProviderWord> for Word {
    fn from(w: ProviderWord) -> Self {
        Word {
            text: w.text,
            start: w.start as f64 / 1000.0,
            end: w.end as f64 / 1000.0,
        }
    }
}

/// The editable word list for one upload.
///
/// Edits replace a word's text and deletions drop an entry; neither touches
/// the timing of any other word.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    words: Vec<Word>,
}

impl Transcript {
    pub fn new(words: Vec<Word>) -> Self {
        Self { words }
    }

    pub fn from_provider(words: Vec<ProviderWord>) -> Self {
        Self {
            words: words.into_iter().map(Word::from).collect(),
        }
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn into_words(self) -> Vec<Word> {
        self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Index of the word being spoken at `time`, if any.
    pub fn active_index(&self, time: f64) -> Option<usize> {
        find_active(&self.words, time)
    }

    /// Replace the text of the word at `index`. The new text is trimmed and
    /// must not be empty.
    pub fn edit_text(&mut self, index: usize, text: &str) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            return Err(CaptionError::InvalidEdit(
                "Caption text cannot be empty".to_string(),
            ));
        }

        let len = self.words.len();
        let word = self.words.get_mut(index).ok_or_else(|| {
            CaptionError::InvalidEdit(format!("No word at index {} (have {})", index, len))
        })?;
        word.text = text.to_string();
        Ok(())
    }

    /// Remove the word at `index`, returning it.
    pub fn remove(&mut self, index: usize) -> Result<Word> {
        if index >= self.words.len() {
            return Err(CaptionError::InvalidEdit(format!(
                "No word at index {} (have {})",
                index,
                self.words.len()
            )));
        }
        Ok(self.words.remove(index))
    }

    /// Load a transcript from a JSON array of `{text, start, end}` in seconds.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CaptionError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        let transcript: Transcript = serde_json::from_str(&contents)?;
        debug!("Loaded {} words from {}", transcript.len(), path.display());
        Ok(transcript)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
