//! Live caption preview driven by a playback clock.
//!
//! Every update recomputes the window from `(words, time)` alone, so seeks and
//! out-of-order ticks are harmless. The only state is the last active index,
//! used to skip redrawing when nothing changed.

use crate::caption::{select_window, Word, WindowSize};
use crate::style::{AnimationStyle, Color, ResolvedStyle, TextAlign, TextPosition};
use console::{pad_str, Alignment, Style};

#[derive(Debug, Clone, PartialEq)]
pub struct FrameWord {
    pub text: String,
    pub active: bool,
}

/// What the overlay shows at one instant. Empty when no word is playing.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub time: f64,
    pub active_index: Option<usize>,
    pub words: Vec<FrameWord>,
}

/// Terminal columns per CSS pixel of letter spacing.
const PX_PER_COLUMN: f32 = 8.0;

impl Frame {
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Words the animation style shows. Typewriter reveals words only up to
    /// the one being spoken.
    fn visible(&self, animation: AnimationStyle) -> &[FrameWord] {
        match animation {
            AnimationStyle::Typewriter => {
                let shown = self
                    .words
                    .iter()
                    .position(|w| w.active)
                    .map_or(self.words.len(), |i| i + 1);
                &self.words[..shown]
            }
            _ => &self.words,
        }
    }

    /// Plain text with the active word in brackets.
    pub fn render_plain(&self, style: &ResolvedStyle) -> String {
        let animation = style.preview.animation;
        self.visible(animation)
            .iter()
            .map(|w| {
                let text = style.preview.transform.apply(&w.text);
                if w.active && animation != AnimationStyle::None {
                    format!("[{}]", text)
                } else {
                    text
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Terminal rendering of the caption line, aligned within `width` columns.
    ///
    /// The window uses the primary color and the active word the highlight
    /// color in bold. Fade dims the words around the active one and `none`
    /// drops the highlight. Outline color becomes the cell background.
    pub fn render_styled(&self, style: &ResolvedStyle, width: usize) -> String {
        let preview = &style.preview;
        let mut base = terminal_style(style.primary, style.bold);
        let mut active = match preview.animation {
            AnimationStyle::None => base.clone(),
            _ => terminal_style(style.highlight, true),
        };
        if let Some(outline) = preview.outline {
            base = base.on_color256(to_ansi256(outline));
            active = active.on_color256(to_ansi256(outline));
        }
        let inactive = match preview.animation {
            AnimationStyle::Fade => base.clone().dim(),
            _ => base,
        };

        let spacing = letter_gap(preview.letter_spacing);
        let line = self
            .visible(preview.animation)
            .iter()
            .map(|w| {
                let text = spread(&preview.transform.apply(&w.text), spacing);
                if w.active {
                    active.apply_to(text).to_string()
                } else {
                    inactive.apply_to(text).to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(&" ".repeat(1 + spacing));

        let align = match preview.align {
            TextAlign::Left => Alignment::Left,
            TextAlign::Center => Alignment::Center,
            TextAlign::Right => Alignment::Right,
        };
        pad_str(&line, width, align, None).into_owned()
    }

    /// Full overlay of `height` rows. The caption sits in a band
    /// `lineHeight` rows tall, placed at the top, middle or bottom.
    pub fn render_screen(&self, style: &ResolvedStyle, width: usize, height: usize) -> Vec<String> {
        let rows = height.max(1);
        let band = (style.preview.line_height.round().max(1.0) as usize).min(rows);
        let band_start = match style.preview.position {
            TextPosition::Top => 0,
            TextPosition::Middle => (rows - band) / 2,
            TextPosition::Bottom => rows - band,
        };
        let caption_row = band_start + (band - 1) / 2;

        let blank = " ".repeat(width);
        (0..rows)
            .map(|row| {
                if row == caption_row {
                    self.render_styled(style, width)
                } else {
                    blank.clone()
                }
            })
            .collect()
    }
}

fn letter_gap(letter_spacing: f32) -> usize {
    (letter_spacing / PX_PER_COLUMN).round().max(0.0) as usize
}

fn spread(text: &str, gap: usize) -> String {
    if gap == 0 {
        return text.to_string();
    }
    let sep = " ".repeat(gap);
    text.chars()
        .map(String::from)
        .collect::<Vec<_>>()
        .join(&sep)
}

fn terminal_style(color: Color, bold: bool) -> Style {
    let style = Style::new().color256(to_ansi256(color));
    if bold {
        style.bold()
    } else {
        style
    }
}

/// Nearest entry in the xterm 6x6x6 color cube.
fn to_ansi256(color: Color) -> u8 {
    let (r, g, b) = match color {
        Color::Hex { r, g, b } | Color::Rgba { r, g, b, .. } => (r, g, b),
    };
    let level = |c: u8| ((c as u16 * 5 + 127) / 255) as u8;
    16 + 36 * level(r) + 6 * level(g) + level(b)
}

pub struct LivePreview {
    words: Vec<Word>,
    style: ResolvedStyle,
    size: WindowSize,
    last_active: Option<Option<usize>>,
}

impl LivePreview {
    pub fn new(words: Vec<Word>, style: ResolvedStyle, size: WindowSize) -> Self {
        Self {
            words,
            style,
            size,
            last_active: None,
        }
    }

    pub fn style(&self) -> &ResolvedStyle {
        &self.style
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// Frame at `time`, without touching the memoized state.
    pub fn frame_at(&self, time: f64) -> Frame {
        let window = select_window(&self.words, time, self.size);
        Frame {
            time,
            active_index: window.active_absolute(),
            words: window
                .iter()
                .map(|(w, active)| FrameWord {
                    text: w.text.clone(),
                    active,
                })
                .collect(),
        }
    }

    /// Frame at `time` if the active word changed since the last update.
    pub fn update(&mut self, time: f64) -> Option<Frame> {
        let frame = self.frame_at(time);
        if self.last_active == Some(frame.active_index) {
            return None;
        }
        self.last_active = Some(frame.active_index);
        Some(frame)
    }

    /// Forget the memoized index so the next update always yields a frame.
    pub fn reset(&mut self) {
        self.last_active = None;
    }

    /// End of the last word, the natural length of a playback run.
    pub fn duration(&self) -> f64 {
        self.words.iter().map(|w| w.end).fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::StyleConfig;

    fn preview() -> LivePreview {
        let words = vec![
            Word::new("the", 0.0, 0.3),
            Word::new("quick", 0.3, 0.6),
            Word::new("brown", 0.7, 1.0),
            Word::new("fox", 1.0, 1.4),
        ];
        LivePreview::new(words, ResolvedStyle::default(), WindowSize::new(3).unwrap())
    }

    #[test]
    fn test_frame_at_marks_active_word() {
        let frame = preview().frame_at(0.8);

        assert_eq!(frame.active_index, Some(2));
        let texts: Vec<&str> = frame.words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, vec!["quick", "brown", "fox"]);
        assert!(frame.words[1].active);
    }

    #[test]
    fn test_frame_in_silence_is_empty() {
        let frame = preview().frame_at(0.65);
        assert!(frame.is_empty());
        assert_eq!(frame.active_index, None);
    }

    #[test]
    fn test_update_only_on_change() {
        let mut preview = preview();

        assert!(preview.update(0.1).is_some());
        assert!(preview.update(0.2).is_none());
        assert!(preview.update(0.4).is_some());
        assert!(preview.update(0.65).is_some());
        assert!(preview.update(0.66).is_none());

        preview.reset();
        assert!(preview.update(0.66).is_some());
    }

    #[test]
    fn test_seeking_backwards_recomputes() {
        let mut preview = preview();
        let late = preview.update(1.2).unwrap();
        let early = preview.update(0.1).unwrap();

        assert_eq!(late.active_index, Some(3));
        assert_eq!(early.active_index, Some(0));
    }

    #[test]
    fn test_render_plain_with_transform() {
        let style = StyleConfig {
            text_transform: Some("uppercase".to_string()),
            ..Default::default()
        }
        .resolve();
        let frame = preview().frame_at(0.1);

        assert_eq!(frame.render_plain(&style), "[THE] QUICK BROWN");
    }

    #[test]
    fn test_render_styled_pads_to_width() {
        let frame = preview().frame_at(0.1);
        let rendered = frame.render_styled(&ResolvedStyle::default(), 40);
        assert_eq!(console::measure_text_width(&rendered), 40);
    }

    fn styled(config: StyleConfig) -> ResolvedStyle {
        config.resolve()
    }

    fn caption_row(screen: &[String]) -> usize {
        screen.iter().position(|row| !row.trim().is_empty()).unwrap()
    }

    #[test]
    fn test_render_screen_follows_position() {
        let frame = preview().frame_at(0.1);

        let bottom = frame.render_screen(&ResolvedStyle::default(), 30, 10);
        assert_eq!(bottom.len(), 10);
        assert_eq!(caption_row(&bottom), 9);

        let top = styled(StyleConfig {
            text_position: Some("top".to_string()),
            ..Default::default()
        });
        assert_eq!(caption_row(&frame.render_screen(&top, 30, 10)), 0);

        let middle = styled(StyleConfig {
            text_position: Some("middle".to_string()),
            ..Default::default()
        });
        assert_eq!(caption_row(&frame.render_screen(&middle, 30, 10)), 4);
    }

    #[test]
    fn test_render_screen_line_height_band() {
        let frame = preview().frame_at(0.1);
        let style = styled(StyleConfig {
            line_height: Some("3".to_string()),
            ..Default::default()
        });
        let screen = frame.render_screen(&style, 30, 10);

        assert_eq!(caption_row(&screen), 8);
        assert!(screen.iter().all(|row| console::measure_text_width(row) == 30));
    }

    #[test]
    fn test_letter_spacing_widens_text() {
        let frame = preview().frame_at(0.1);
        let style = styled(StyleConfig {
            letter_spacing: Some("8px".to_string()),
            text_align: Some("left".to_string()),
            ..Default::default()
        });
        let rendered = frame.render_styled(&style, 40);

        assert!(console::strip_ansi_codes(&rendered).starts_with("t h e  q u i c k"));
    }

    #[test]
    fn test_typewriter_hides_upcoming_words() {
        let style = styled(StyleConfig {
            animation_style: Some("typewriter".to_string()),
            ..Default::default()
        });

        assert_eq!(preview().frame_at(0.8).render_plain(&style), "quick [brown]");
        assert_eq!(preview().frame_at(1.2).render_plain(&style), "quick brown [fox]");
    }

    #[test]
    fn test_no_animation_drops_highlight() {
        let style = styled(StyleConfig {
            animation_style: Some("none".to_string()),
            ..Default::default()
        });
        assert_eq!(preview().frame_at(0.1).render_plain(&style), "the quick brown");
    }

    #[test]
    fn test_outline_sets_background() {
        console::set_colors_enabled(true);
        let style = styled(StyleConfig {
            text_outline: Some("2px #000000".to_string()),
            ..Default::default()
        });
        let rendered = preview().frame_at(0.1).render_styled(&style, 40);
        assert!(rendered.contains("\u{1b}[48;5;16m"));
    }

    #[test]
    fn test_ansi256_cube() {
        assert_eq!(to_ansi256(Color::WHITE), 231);
        assert_eq!(to_ansi256(Color::YELLOW), 226);
        assert_eq!(to_ansi256(Color::HALF_BLACK), 16);
    }

    #[test]
    fn test_duration() {
        assert_eq!(preview().duration(), 1.4);
    }
}
