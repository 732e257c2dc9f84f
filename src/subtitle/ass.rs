//! Advanced SubStation Alpha script generation.

use super::timecode::span_centis;
use super::{create_generator, DialogueEvent, HighlightMode, ScriptGenerator, SubtitleDocument};
use crate::caption::{select_window_for_index, Word, WindowSize};
use crate::style::{color::OPAQUE_BLACK, ResolvedStyle, StyleConfig};
use tracing::{debug, warn};

/// Knobs for script generation that are not part of the visual style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScriptOptions {
    pub window_size: WindowSize,
    pub mode: HighlightMode,
}

/// Generate a complete ASS script with the default window size and the
/// windowed highlight mode. Never fails; bad style values fall back to
/// defaults.
pub fn generate(words: &[Word], style: &StyleConfig) -> String {
    generate_with(words, style, &ScriptOptions::default())
}

pub fn generate_with(words: &[Word], style: &StyleConfig, options: &ScriptOptions) -> String {
    build_document(words, &style.resolve(), options).to_string()
}

pub fn build_document(
    words: &[Word],
    style: &ResolvedStyle,
    options: &ScriptOptions,
) -> SubtitleDocument {
    let header = script_header(style);
    if words.is_empty() {
        debug!("No words, emitting header-only script");
        return SubtitleDocument {
            header,
            events: Vec::new(),
        };
    }

    let generator = create_generator(options.mode);
    let events = generator.events(words, style, options.window_size);
    debug!(
        "Generated {} {} events for {} words",
        events.len(),
        generator.name(),
        words.len()
    );

    SubtitleDocument { header, events }
}

pub fn script_header(style: &ResolvedStyle) -> String {
    format!(
        "[Script Info]\n\
         Title: Generated Captions\n\
         ScriptType: v4.00+\n\
         WrapStyle: 0\n\
         PlayResX: 384\n\
         PlayResY: 288\n\
         ScaledBorderAndShadow: yes\n\
         YCbCr Matrix: None\n\
         \n\
         [V4+ Styles]\n\
         Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding\n\
         Style: Default,{font},{size},{primary},{secondary},{outline},{back},{bold},0,0,0,100,100,0,0,1,1,1,2,10,10,10,1\n\
         \n\
         [Events]\n\
         Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n",
        font = style.font_family.replace(',', " "),
        size = style.font_size,
        primary = style.primary.to_ass_opaque(),
        secondary = style.highlight.to_ass_opaque(),
        outline = OPAQUE_BLACK,
        back = style.background.to_ass(),
        bold = if style.bold { -1 } else { 0 },
    )
}

/// Override blocks and hard line breaks would be interpreted by the renderer.
fn escape_text(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '{' => '(',
            '}' => ')',
            '\n' | '\r' => ' ',
            other => other,
        })
        .collect::<String>()
        .replace('\\', "/")
}

/// One event per word; each shows the window centered on that word.
pub struct WindowedScript;

impl ScriptGenerator for WindowedScript {
    fn events(&self, words: &[Word], style: &ResolvedStyle, size: WindowSize) -> Vec<DialogueEvent> {
        let highlight_on = format!("{{\\c&H{}&\\b1}}", style.highlight.to_bgr());
        let highlight_off = format!("{{\\c&H{}&\\b0}}", style.primary.to_bgr());

        let mut events = Vec::with_capacity(words.len());
        for (index, word) in words.iter().enumerate() {
            let window = select_window_for_index(words, index, size);
            let Some(active) = window.active else {
                warn!("Word {} missing from its own window, skipping", index);
                continue;
            };

            let text = window
                .words
                .iter()
                .enumerate()
                .map(|(i, w)| {
                    if i == active {
                        format!("{}{}{}", highlight_on, escape_text(&w.text), highlight_off)
                    } else {
                        escape_text(&w.text)
                    }
                })
                .collect::<Vec<_>>()
                .join(" ");

            events.push(DialogueEvent {
                start: word.start,
                end: word.end,
                text,
            });
        }
        events
    }

    fn name(&self) -> &'static str {
        "windowed"
    }
}

/// One event per window-sized run of words. Each word carries a `\k`
/// duration, and silences between words get an empty `\k` block so the
/// sweep stays on the audio timeline.
///
/// `\k` draws a syllable in the secondary color until it starts and in the
/// primary color afterwards, so each line swaps them: the highlight becomes
/// `\1c` and the text color becomes `\2c`.
pub struct KaraokeScript;

impl ScriptGenerator for KaraokeScript {
    fn events(&self, words: &[Word], style: &ResolvedStyle, size: WindowSize) -> Vec<DialogueEvent> {
        words
            .chunks(size.get())
            .map(|line| {
                let mut text = format!(
                    "{{\\1c&H{}&\\2c&H{}&}}",
                    style.highlight.to_bgr(),
                    style.primary.to_bgr()
                );
                let mut cursor = line[0].start;

                for (i, word) in line.iter().enumerate() {
                    let gap = span_centis(cursor, word.start);
                    if gap > 0 {
                        text.push_str(&format!("{{\\k{}}}", gap));
                    }
                    if i > 0 {
                        text.push(' ');
                    }
                    text.push_str(&format!(
                        "{{\\k{}}}{}",
                        span_centis(word.start, word.end),
                        escape_text(&word.text)
                    ));
                    cursor = word.end.max(cursor);
                }

                DialogueEvent {
                    start: line[0].start,
                    end: line[line.len() - 1].end,
                    text,
                }
            })
            .collect()
    }

    fn name(&self) -> &'static str {
        "karaoke"
    }
}
