use std::path::Path;
use std::process::Command;

use tracing::{debug, info};

use crate::error::{CaptionError, Result};

/// Check if FFmpeg is installed and accessible.
pub fn check_ffmpeg() -> Result<()> {
    let output = Command::new("ffmpeg")
        .arg("-version")
        .output()
        .map_err(|e| {
            CaptionError::AudioExtraction(format!(
                "FFmpeg not found. Please install FFmpeg and ensure it's in your PATH. Error: {e}"
            ))
        })?;

    if !output.status.success() {
        return Err(CaptionError::AudioExtraction(
            "FFmpeg check failed".to_string(),
        ));
    }

    debug!("FFmpeg is available");
    Ok(())
}

/// Build the FFmpeg arguments that turn `input` into mono 16 kHz PCM WAV.
pub fn extract_args(input: &Path, output: &Path) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-i".to_string(),
        input.display().to_string(),
        "-vn".to_string(),
        "-acodec".to_string(),
        "pcm_s16le".to_string(),
        "-ar".to_string(),
        "16000".to_string(),
        "-ac".to_string(),
        "1".to_string(),
        output.display().to_string(),
    ]
}

/// Extract the audio track of a video as mono 16-bit PCM at 16 kHz, the
/// format speech recognition providers handle best.
pub async fn extract_audio(input: &Path, output: &Path) -> Result<()> {
    check_ffmpeg()?;

    if !input.exists() {
        return Err(CaptionError::FileNotFound(input.display().to_string()));
    }

    info!("Extracting audio from {}", input.display());

    let result = tokio::process::Command::new("ffmpeg")
        .args(extract_args(input, output))
        .output()
        .await
        .map_err(|e| CaptionError::AudioExtraction(format!("Failed to run FFmpeg: {e}")))?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        return Err(CaptionError::AudioExtraction(format!(
            "FFmpeg audio extraction failed: {}",
            stderr.lines().last().unwrap_or("unknown error")
        )));
    }

    if !output.exists() {
        return Err(CaptionError::AudioExtraction(
            "Output file was not created".to_string(),
        ));
    }

    info!("Audio extracted to {}", output.display());
    Ok(())
}
