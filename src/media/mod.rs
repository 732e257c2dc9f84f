pub mod burn;
pub mod extract;
pub mod quality;

pub use burn::{burn_args, burn_subtitles, escape_filter_path};
pub use extract::{check_ffmpeg, extract_audio, extract_args};
pub use quality::{FrameRate, Preset, QualitySettings, Resolution};
