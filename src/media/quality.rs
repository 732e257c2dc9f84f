//! Output encoding settings handed through to FFmpeg.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Resolution {
    #[serde(rename = "480p")]
    P480,
    #[default]
    #[serde(rename = "720p")]
    P720,
    #[serde(rename = "1080p")]
    P1080,
    #[serde(rename = "original")]
    Original,
}

impl Resolution {
    pub const ALL: [Resolution; 4] = [
        Resolution::P480,
        Resolution::P720,
        Resolution::P1080,
        Resolution::Original,
    ];

    /// Output height in pixels; `None` keeps the source size.
    pub fn height(&self) -> Option<u32> {
        match self {
            Resolution::P480 => Some(480),
            Resolution::P720 => Some(720),
            Resolution::P1080 => Some(1080),
            Resolution::Original => None,
        }
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.height() {
            Some(h) => write!(f, "{}p", h),
            None => write!(f, "original"),
        }
    }
}

impl std::str::FromStr for Resolution {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "480p" => Ok(Resolution::P480),
            "720p" => Ok(Resolution::P720),
            "1080p" => Ok(Resolution::P1080),
            "original" => Ok(Resolution::Original),
            _ => Err(format!(
                "Unknown resolution: {}. Use '480p', '720p', '1080p', or 'original'",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FrameRate {
    #[serde(rename = "24")]
    Fps24,
    #[default]
    #[serde(rename = "30")]
    Fps30,
    #[serde(rename = "60")]
    Fps60,
    #[serde(rename = "original")]
    Original,
}

impl FrameRate {
    pub const ALL: [FrameRate; 4] = [
        FrameRate::Fps24,
        FrameRate::Fps30,
        FrameRate::Fps60,
        FrameRate::Original,
    ];

    pub fn fps(&self) -> Option<u32> {
        match self {
            FrameRate::Fps24 => Some(24),
            FrameRate::Fps30 => Some(30),
            FrameRate::Fps60 => Some(60),
            FrameRate::Original => None,
        }
    }
}

impl std::fmt::Display for FrameRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.fps() {
            Some(fps) => write!(f, "{}", fps),
            None => write!(f, "original"),
        }
    }
}

impl std::str::FromStr for FrameRate {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().trim_end_matches("fps") {
            "24" => Ok(FrameRate::Fps24),
            "30" => Ok(FrameRate::Fps30),
            "60" => Ok(FrameRate::Fps60),
            "original" => Ok(FrameRate::Original),
            _ => Err(format!(
                "Unknown frame rate: {}. Use '24', '30', '60', or 'original'",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    Ultrafast,
    Fast,
    #[default]
    Medium,
    Slow,
    Veryslow,
}

impl Preset {
    pub const ALL: [Preset; 5] = [
        Preset::Ultrafast,
        Preset::Fast,
        Preset::Medium,
        Preset::Slow,
        Preset::Veryslow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Ultrafast => "ultrafast",
            Preset::Fast => "fast",
            Preset::Medium => "medium",
            Preset::Slow => "slow",
            Preset::Veryslow => "veryslow",
        }
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Preset::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s.to_lowercase())
            .ok_or_else(|| {
                format!(
                    "Unknown preset: {}. Use 'ultrafast', 'fast', 'medium', 'slow', or 'veryslow'",
                    s
                )
            })
    }
}

/// Encoding settings for the burned-in export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QualitySettings {
    pub resolution: Resolution,
    pub frame_rate: FrameRate,
    /// Video bitrate in kbps.
    pub video_bitrate: u32,
    /// Audio bitrate in kbps.
    pub audio_bitrate: u32,
    pub preset: Preset,
}

impl Default for QualitySettings {
    fn default() -> Self {
        Self {
            resolution: Resolution::default(),
            frame_rate: FrameRate::default(),
            video_bitrate: 2000,
            audio_bitrate: 128,
            preset: Preset::default(),
        }
    }
}

impl QualitySettings {
    /// Extra video filter for scaling, appended after the subtitle filter.
    pub fn scale_filter(&self) -> Option<String> {
        self.resolution.height().map(|h| format!("scale=-2:{}", h))
    }

    /// Encoder arguments (everything except inputs, filters and the output).
    pub fn encoder_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(fps) = self.frame_rate.fps() {
            args.push("-r".to_string());
            args.push(fps.to_string());
        }
        args.extend([
            "-b:v".to_string(),
            format!("{}k", self.video_bitrate),
            "-b:a".to_string(),
            format!("{}k", self.audio_bitrate),
            "-preset".to_string(),
            self.preset.to_string(),
        ]);
        args
    }
}

impl std::fmt::Display for QualitySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} @ {} fps, video {}k, audio {}k, preset {}",
            self.resolution, self.frame_rate, self.video_bitrate, self.audio_bitrate, self.preset
        )
    }
}
