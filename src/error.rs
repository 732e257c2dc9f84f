use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptionError {
    #[error("Audio extraction failed: {0}")]
    AudioExtraction(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Video rendering failed: {0}")]
    Render(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid caption edit: {0}")]
    InvalidEdit(String),

    #[error("Cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, CaptionError>;
