pub mod color;

pub use color::{encode_opaque, encode_with_alpha, hex_to_bgr, Color};

use crate::error::{CaptionError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use tracing::{debug, warn};

pub const DEFAULT_FONT_FAMILY: &str = "Arial";
pub const DEFAULT_FONT_SIZE: u32 = 20;

/// Font size as it arrives from a style file: a bare number or a CSS length
/// such as `"24px"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FontSize {
    Px(i64),
    Fractional(f64),
    Text(String),
}

impl FontSize {
    /// Leading integer, like `parseInt`. `None` for non-numeric or non-positive.
    pub fn to_px(&self) -> Option<u32> {
        let value = match self {
            FontSize::Px(n) => *n,
            FontSize::Fractional(n) if n.is_finite() => n.trunc() as i64,
            FontSize::Fractional(_) => return None,
            FontSize::Text(s) => {
                let s = s.trim();
                let end = s
                    .char_indices()
                    .find(|(i, c)| !(c.is_ascii_digit() || (*i == 0 && (*c == '-' || *c == '+'))))
                    .map(|(i, _)| i)
                    .unwrap_or(s.len());
                s[..end].parse().ok()?
            }
        };
        u32::try_from(value).ok().filter(|px| *px > 0)
    }
}

/// Caption style as supplied by the user. Every field is optional and nothing
/// here is validated; call [`StyleConfig::resolve`] before rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleConfig {
    pub color: Option<String>,
    pub highlight_color: Option<String>,
    pub background_color: Option<String>,
    pub font_family: Option<String>,
    pub font_size: Option<FontSize>,
    #[serde(deserialize_with = "css_value")]
    pub font_weight: Option<String>,

    // Preview-only attributes.
    pub text_align: Option<String>,
    pub text_position: Option<String>,
    #[serde(deserialize_with = "css_value")]
    pub letter_spacing: Option<String>,
    #[serde(deserialize_with = "css_value")]
    pub line_height: Option<String>,
    pub text_outline: Option<String>,
    pub text_transform: Option<String>,
    pub animation_style: Option<String>,
}

impl StyleConfig {
    /// Load a style from a `.toml` or `.json` file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CaptionError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        let style = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&contents)?,
            Some("toml") => toml::from_str(&contents)?,
            other => {
                return Err(CaptionError::Config(format!(
                    "Unsupported style file extension: {:?}. Use .toml or .json",
                    other.unwrap_or("")
                )))
            }
        };
        debug!("Loaded style from {}", path.display());
        Ok(style)
    }

    /// Fill every gap with its default and parse every color once.
    ///
    /// Malformed values are logged and replaced; this never fails.
    pub fn resolve(&self) -> ResolvedStyle {
        let primary = resolve_foreground("color", self.color.as_deref(), Color::WHITE);
        let highlight = resolve_foreground(
            "highlightColor",
            self.highlight_color.as_deref(),
            Color::YELLOW,
        );

        let background = match self.background_color.as_deref() {
            None => Color::HALF_BLACK,
            Some(raw) => Color::parse(raw).unwrap_or_else(|| {
                warn!("Invalid backgroundColor '{}', using 50% black", raw);
                Color::HALF_BLACK
            }),
        };

        let font_family = self
            .font_family
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .unwrap_or(DEFAULT_FONT_FAMILY)
            .to_string();

        let font_size = match &self.font_size {
            None => DEFAULT_FONT_SIZE,
            Some(size) => size.to_px().unwrap_or_else(|| {
                warn!("Invalid fontSize {:?}, using {}", size, DEFAULT_FONT_SIZE);
                DEFAULT_FONT_SIZE
            }),
        };

        let bold = self.font_weight.as_deref().is_some_and(is_bold_weight);

        ResolvedStyle {
            font_family,
            font_size,
            primary,
            highlight,
            background,
            bold,
            preview: self.resolve_preview(),
        }
    }

    fn resolve_preview(&self) -> PreviewStyle {
        PreviewStyle {
            align: parse_or_default("textAlign", self.text_align.as_deref()),
            position: parse_or_default("textPosition", self.text_position.as_deref()),
            transform: parse_or_default("textTransform", self.text_transform.as_deref()),
            animation: parse_or_default("animationStyle", self.animation_style.as_deref()),
            letter_spacing: self
                .letter_spacing
                .as_deref()
                .and_then(|s| s.trim().trim_end_matches("px").trim().parse().ok())
                .unwrap_or(0.0),
            line_height: self
                .line_height
                .as_deref()
                .and_then(|s| s.trim().parse().ok())
                .filter(|h: &f32| *h > 0.0)
                .unwrap_or(1.2),
            outline: self.text_outline.as_deref().and_then(outline_color),
        }
    }
}

/// Accepts a CSS property written either as a string or as a bare number.
fn css_value<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Number(n) => n.to_string(),
        Raw::Text(s) => s,
    }))
}

/// `bold`, `bolder`, or a numeric weight of 700 and up.
fn is_bold_weight(weight: &str) -> bool {
    let weight = weight.trim();
    match weight.parse::<f64>() {
        Ok(n) => n >= 700.0,
        Err(_) => matches!(weight.to_lowercase().as_str(), "bold" | "bolder"),
    }
}

/// Color of a CSS outline shorthand like `"2px #000000"`. `None` when the
/// outline is absent, `none`, or names no parseable color.
fn outline_color(raw: &str) -> Option<Color> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "none" {
        return None;
    }
    let color = Color::parse(raw).or_else(|| {
        raw.split_whitespace()
            .filter(|token| token.starts_with('#'))
            .find_map(Color::parse)
    });
    if color.is_none() {
        warn!("Ignoring textOutline '{}' without a #RRGGBB color", raw);
    }
    color
}

fn resolve_foreground(field: &str, raw: Option<&str>, default: Color) -> Color {
    match raw {
        None => default,
        Some(raw) => match Color::parse(raw) {
            Some(c @ Color::Hex { .. }) => c,
            _ => {
                warn!("Invalid {} '{}', expected #RRGGBB; using default", field, raw);
                default
            }
        },
    }
}

fn parse_or_default<T>(field: &str, raw: Option<&str>) -> T
where
    T: std::str::FromStr + Default,
{
    match raw {
        None => T::default(),
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("Ignoring unknown {} '{}'", field, raw);
            T::default()
        }),
    }
}

/// A fully populated style. Generators only ever see this type.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStyle {
    pub font_family: String,
    pub font_size: u32,
    pub primary: Color,
    pub highlight: Color,
    pub background: Color,
    pub bold: bool,
    pub preview: PreviewStyle,
}

impl Default for ResolvedStyle {
    fn default() -> Self {
        StyleConfig::default().resolve()
    }
}

/// Attributes the live preview honours and the exported script ignores.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewStyle {
    pub align: TextAlign,
    pub position: TextPosition,
    pub transform: TextTransform,
    pub animation: AnimationStyle,
    pub letter_spacing: f32,
    pub line_height: f32,
    pub outline: Option<Color>,
}

macro_rules! style_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? } default $default:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    _ => Err(format!("Unknown {}: {}", stringify!($name), s)),
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }
    };
}

style_enum!(TextAlign { Left => "left", Center => "center", Right => "right" } default Center);
style_enum!(TextPosition { Top => "top", Middle => "middle", Bottom => "bottom" } default Bottom);
style_enum!(TextTransform {
    None => "none",
    Uppercase => "uppercase",
    Lowercase => "lowercase",
    Capitalize => "capitalize",
} default None);
style_enum!(AnimationStyle {
    Karaoke => "karaoke",
    Fade => "fade",
    Typewriter => "typewriter",
    None => "none",
} default Karaoke);

impl TextTransform {
    pub fn apply(&self, text: &str) -> String {
        match self {
            TextTransform::None => text.to_string(),
            TextTransform::Uppercase => text.to_uppercase(),
            TextTransform::Lowercase => text.to_lowercase(),
            TextTransform::Capitalize => text
                .split(' ')
                .map(|word| {
                    let mut chars = word.chars();
                    match chars.next() {
                        Some(first) => first.to_uppercase().chain(chars).collect(),
                        None => String::new(),
                    }
                })
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}
