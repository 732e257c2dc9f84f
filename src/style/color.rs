//! Web colors to ASS color literals.
//!
//! ASS stores channels as `BBGGRR` and puts an inverted alpha byte in front:
//! `&HAABBGGRR`, where `00` is fully opaque and `FF` fully transparent.

use regex::Regex;
use std::sync::OnceLock;

/// Reordered white, used for any hex string that fails to parse.
pub const FALLBACK_BGR: &str = "FFFFFF";

/// 50% transparent black, used for any background that fails to parse.
pub const FALLBACK_BACKGROUND: &str = "&H80000000";

/// Opaque black.
pub const OPAQUE_BLACK: &str = "&H00000000";

fn rgba_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^rgba\(\s*(\d+)\s*,\s*(\d+)\s*,\s*(\d+)\s*,\s*(\d*\.?\d+)\s*\)$")
            .expect("Invalid rgba regex")
    })
}

/// A style color in one of the two forms the style surface accepts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Color {
    /// `#RRGGBB`, always opaque.
    Hex { r: u8, g: u8, b: u8 },
    /// CSS `rgba(r, g, b, a)` with `a` in `0.0..=1.0` (1.0 opaque).
    Rgba { r: u8, g: u8, b: u8, a: f64 },
}

impl Color {
    pub const WHITE: Color = Color::Hex {
        r: 0xFF,
        g: 0xFF,
        b: 0xFF,
    };
    pub const YELLOW: Color = Color::Hex {
        r: 0xFF,
        g: 0xFF,
        b: 0x00,
    };
    pub const HALF_BLACK: Color = Color::Rgba {
        r: 0,
        g: 0,
        b: 0,
        a: 0.5,
    };

    /// Parse either `#RRGGBB` or `rgba(r,g,b,a)`, dispatching on the prefix.
    pub fn parse(s: &str) -> Option<Color> {
        let s = s.trim();
        if s.starts_with('#') {
            parse_hex(s)
        } else if s.starts_with("rgba") {
            parse_rgba(s)
        } else {
            None
        }
    }

    /// Inverted alpha byte: `00` opaque, `FF` transparent.
    pub fn alpha_byte(&self) -> u8 {
        match *self {
            Color::Hex { .. } => 0,
            Color::Rgba { a, .. } => ((1.0 - a.clamp(0.0, 1.0)) * 255.0).round() as u8,
        }
    }

    fn channels(&self) -> (u8, u8, u8) {
        match *self {
            Color::Hex { r, g, b } | Color::Rgba { r, g, b, .. } => (r, g, b),
        }
    }

    /// Channels in ASS order, `BBGGRR`.
    pub fn to_bgr(&self) -> String {
        let (r, g, b) = self.channels();
        format!("{:02X}{:02X}{:02X}", b, g, r)
    }

    /// Full `&HAABBGGRR` literal.
    pub fn to_ass(&self) -> String {
        format!("&H{:02X}{}", self.alpha_byte(), self.to_bgr())
    }

    /// `&H00BBGGRR`, ignoring any alpha.
    pub fn to_ass_opaque(&self) -> String {
        format!("&H00{}", self.to_bgr())
    }

    /// CSS form, used by the terminal preview and config round-trips.
    pub fn to_css(&self) -> String {
        match *self {
            Color::Hex { r, g, b } => format!("#{:02X}{:02X}{:02X}", r, g, b),
            Color::Rgba { r, g, b, a } => format!("rgba({}, {}, {}, {})", r, g, b, a),
        }
    }
}

fn parse_hex(s: &str) -> Option<Color> {
    let digits = s.strip_prefix('#')?;
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some(Color::Hex {
        r: channel(0)?,
        g: channel(2)?,
        b: channel(4)?,
    })
}

fn parse_rgba(s: &str) -> Option<Color> {
    let caps = rgba_regex().captures(s)?;
    let channel = |i: usize| -> Option<u8> {
        let value: u32 = caps.get(i)?.as_str().parse().ok()?;
        Some(value.min(255) as u8)
    };
    let a: f64 = caps.get(4)?.as_str().parse().ok()?;
    Some(Color::Rgba {
        r: channel(1)?,
        g: channel(2)?,
        b: channel(3)?,
        a: a.clamp(0.0, 1.0),
    })
}

/// `#RRGGBB` to `BBGGRR`. Anything malformed yields white.
pub fn hex_to_bgr(hex: &str) -> String {
    parse_hex(hex.trim())
        .map(|c| c.to_bgr())
        .unwrap_or_else(|| FALLBACK_BGR.to_string())
}

/// `&H00BBGGRR` for a `#RRGGBB` string.
pub fn encode_opaque(hex: &str) -> String {
    format!("&H00{}", hex_to_bgr(hex))
}

/// `&HAABBGGRR` for either an `rgba(...)` or a `#RRGGBB` string. Anything
/// malformed yields 50% transparent black.
pub fn encode_with_alpha(css: &str) -> String {
    Color::parse(css)
        .map(|c| c.to_ass())
        .unwrap_or_else(|| FALLBACK_BACKGROUND.to_string())
}
