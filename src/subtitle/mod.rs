pub mod ass;
pub mod timecode;

pub use ass::{generate, generate_with, KaraokeScript, ScriptOptions, WindowedScript};
pub use timecode::format_timecode;

use crate::caption::{Word, WindowSize};
use crate::style::ResolvedStyle;
use serde::{Deserialize, Serialize};

/// One timed line of the exported script.
#[derive(Debug, Clone, PartialEq)]
pub struct DialogueEvent {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl DialogueEvent {
    pub fn to_line(&self) -> String {
        format!(
            "Dialogue: 0,{},{},Default,,0,0,0,,{}",
            format_timecode(self.start),
            format_timecode(self.end),
            self.text
        )
    }
}

/// A complete ASS script: header directives followed by dialogue events.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleDocument {
    pub header: String,
    pub events: Vec<DialogueEvent>,
}

impl std::fmt::Display for SubtitleDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.header)?;
        for event in &self.events {
            writeln!(f, "{}", event.to_line())?;
        }
        Ok(())
    }
}

/// How the active word is encoded in the exported script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HighlightMode {
    /// One event per word, each showing the sliding window with that word
    /// highlighted. Matches the live preview frame for frame.
    #[default]
    Windowed,
    /// One event per window-sized run of words, timed with `\k` tags.
    Karaoke,
}

impl std::fmt::Display for HighlightMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HighlightMode::Windowed => write!(f, "windowed"),
            HighlightMode::Karaoke => write!(f, "karaoke"),
        }
    }
}

impl std::str::FromStr for HighlightMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "windowed" => Ok(HighlightMode::Windowed),
            "karaoke" => Ok(HighlightMode::Karaoke),
            _ => Err(format!(
                "Unknown highlight mode: {}. Use 'windowed' or 'karaoke'",
                s
            )),
        }
    }
}

pub trait ScriptGenerator {
    fn events(&self, words: &[Word], style: &ResolvedStyle, size: WindowSize) -> Vec<DialogueEvent>;
    fn name(&self) -> &'static str;
}

pub fn create_generator(mode: HighlightMode) -> Box<dyn ScriptGenerator> {
    match mode {
        HighlightMode::Windowed => Box::new(WindowedScript),
        HighlightMode::Karaoke => Box::new(KaraokeScript),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialogue_line() {
        let event = DialogueEvent {
            start: 1.5,
            end: 4.0,
            text: "Hello".to_string(),
        };
        assert_eq!(
            event.to_line(),
            "Dialogue: 0,00:00:01.50,00:00:04.00,Default,,0,0,0,,Hello"
        );
    }

    #[test]
    fn test_document_display() {
        let doc = SubtitleDocument {
            header: "[Events]\n".to_string(),
            events: vec![
                DialogueEvent {
                    start: 0.0,
                    end: 1.0,
                    text: "a".to_string(),
                },
                DialogueEvent {
                    start: 1.0,
                    end: 2.0,
                    text: "b".to_string(),
                },
            ],
        };
        assert_eq!(
            doc.to_string(),
            "[Events]\n\
             Dialogue: 0,00:00:00.00,00:00:01.00,Default,,0,0,0,,a\n\
             Dialogue: 0,00:00:01.00,00:00:02.00,Default,,0,0,0,,b\n"
        );
    }

    #[test]
    fn test_highlight_mode_parsing() {
        assert_eq!("windowed".parse::<HighlightMode>().unwrap(), HighlightMode::Windowed);
        assert_eq!("KARAOKE".parse::<HighlightMode>().unwrap(), HighlightMode::Karaoke);
        assert!("fade".parse::<HighlightMode>().is_err());
        assert_eq!(HighlightMode::default(), HighlightMode::Windowed);
    }

    #[test]
    fn test_create_generator_factory() {
        assert_eq!(create_generator(HighlightMode::Windowed).name(), "windowed");
        assert_eq!(create_generator(HighlightMode::Karaoke).name(), "karaoke");
    }
}
