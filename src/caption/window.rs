//! Sliding caption window shared by the live preview and the script export.
//!
//! The window holds at most `size` consecutive words with the active word kept
//! as close to the middle as integer arithmetic allows. Near either end of the
//! transcript the window pins to the boundary instead of running off it.

use super::Word;
use crate::error::{CaptionError, Result};
use serde::{Deserialize, Serialize};

/// Maximum number of words shown at once. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct WindowSize(usize);

impl WindowSize {
    pub const DEFAULT: WindowSize = WindowSize(5);

    pub fn new(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(CaptionError::Config(
                "Window size must be greater than 0".to_string(),
            ));
        }
        Ok(Self(size))
    }

    /// Last-resort constructor that clamps 0 up to 1.
    pub fn clamped(size: usize) -> Self {
        Self(size.max(1))
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for WindowSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<usize> for WindowSize {
    type Error = String;

    fn try_from(size: usize) -> std::result::Result<Self, Self::Error> {
        WindowSize::new(size).map_err(|e| e.to_string())
    }
}

impl From<WindowSize> for usize {
    fn from(size: WindowSize) -> Self {
        size.0
    }
}

impl std::str::FromStr for WindowSize {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let size: usize = s
            .trim()
            .parse()
            .map_err(|_| format!("Invalid window size: {}", s))?;
        WindowSize::try_from(size)
    }
}

impl std::fmt::Display for WindowSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A borrowed run of words plus the position of the active one within it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window<'a> {
    pub words: &'a [Word],
    /// Index of `words[0]` in the full transcript.
    pub offset: usize,
    pub active: Option<usize>,
}

impl<'a> Window<'a> {
    pub fn empty() -> Self {
        Self {
            words: &[],
            offset: 0,
            active: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn active_word(&self) -> Option<&'a Word> {
        self.active.and_then(|i| self.words.get(i))
    }

    /// Absolute transcript index of the active word.
    pub fn active_absolute(&self) -> Option<usize> {
        self.active.map(|i| self.offset + i)
    }

    /// Words paired with whether each one is the active word.
    pub fn iter(&self) -> impl Iterator<Item = (&'a Word, bool)> + '_ {
        self.words
            .iter()
            .enumerate()
            .map(move |(i, w)| (w, self.active == Some(i)))
    }
}

/// First word whose `[start, end]` contains `time`.
pub fn find_active(words: &[Word], time: f64) -> Option<usize> {
    words.iter().position(|w| w.contains(time))
}

/// Window around whatever word is playing at `time`. Empty when nothing is.
pub fn select_window(words: &[Word], time: f64, size: WindowSize) -> Window<'_> {
    match find_active(words, time) {
        Some(center) => select_window_for_index(words, center, size),
        None => Window::empty(),
    }
}

/// Window around the word at absolute index `center`.
pub fn select_window_for_index(words: &[Word], center: usize, size: WindowSize) -> Window<'_> {
    if center >= words.len() {
        return Window::empty();
    }

    let size = size.get();
    let mut start = center.saturating_sub(size / 2);
    if start + size > words.len() {
        start = words.len().saturating_sub(size);
    }
    let end = (start + size).min(words.len());

    Window {
        words: &words[start..end],
        offset: start,
        active: Some(center - start),
    }
}
