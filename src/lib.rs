pub mod caption;
pub mod config;
pub mod error;
pub mod interactive;
pub mod media;
pub mod pipeline;
pub mod preview;
pub mod style;
pub mod subtitle;
pub mod transcribe;

pub use caption::{select_window, Transcript, Window, WindowSize, Word};
pub use config::Config;
pub use error::{CaptionError, Result};
pub use pipeline::{caption_video, export_video, CaptionResult, ExportOptions, ExportStats};
pub use preview::LivePreview;
pub use style::{encode_opaque, encode_with_alpha, hex_to_bgr, StyleConfig};
pub use subtitle::{generate, generate_with, HighlightMode, ScriptOptions};
