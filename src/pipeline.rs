use crate::caption::{Transcript, Word};
use crate::config::Config;
use crate::error::{CaptionError, Result};
use crate::media::{burn_subtitles, check_ffmpeg, extract_audio, QualitySettings};
use crate::style::StyleConfig;
use crate::subtitle::{generate_with, ScriptOptions};
use crate::transcribe::{AssemblyAiClient, Transcriber};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tracing::{debug, info, warn};

/// Statistics from the transcription stage.
#[derive(Debug, Clone)]
pub struct CaptionStats {
    pub total_time: Duration,
    pub extraction_time: Duration,
    pub transcription_time: Duration,
    pub word_count: usize,
    /// End time of the last word, in seconds.
    pub speech_duration: f64,
    pub provider: String,
}

/// Result of [`caption_video`].
#[derive(Debug)]
pub struct CaptionResult {
    pub words_path: PathBuf,
    pub transcript: Transcript,
    pub stats: CaptionStats,
}

/// Options for [`export_video`].
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub script: ScriptOptions,
    /// Also write the generated script here.
    pub keep_script: Option<PathBuf>,
    pub show_progress: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            script: ScriptOptions::default(),
            keep_script: None,
            show_progress: true,
        }
    }
}

/// Statistics from the export stage.
#[derive(Debug, Clone)]
pub struct ExportStats {
    pub total_time: Duration,
    pub render_time: Duration,
    pub event_count: usize,
    pub output_path: PathBuf,
    pub quality: QualitySettings,
}

/// Owns the scratch directory for one run and logs how it was released.
struct TempCleanupGuard {
    temp_dir: Option<TempDir>,
    cancelled: Arc<AtomicBool>,
}

impl TempCleanupGuard {
    fn new(cancelled: Arc<AtomicBool>) -> Result<Self> {
        let temp_dir = TempDir::new().map_err(|e| {
            CaptionError::Io(std::io::Error::other(format!(
                "Failed to create temp directory: {}",
                e
            )))
        })?;
        debug!("Using temp directory: {:?}", temp_dir.path());
        Ok(Self {
            temp_dir: Some(temp_dir),
            cancelled,
        })
    }

    fn path(&self) -> &Path {
        self.temp_dir
            .as_ref()
            .map(TempDir::path)
            .unwrap_or_else(|| Path::new("."))
    }
}

impl Drop for TempCleanupGuard {
    fn drop(&mut self) {
        if let Some(temp_dir) = self.temp_dir.take() {
            let path = temp_dir.path().to_path_buf();
            if self.cancelled.load(Ordering::Relaxed) {
                warn!("Cancelled, cleaning up temp files: {:?}", path);
            } else {
                debug!("Cleaning up temp directory: {:?}", path);
            }
        }
    }
}

fn check_cancelled(cancelled: &AtomicBool) -> Result<()> {
    if cancelled.load(Ordering::Relaxed) {
        return Err(CaptionError::Cancelled);
    }
    Ok(())
}

fn spinner(enabled: bool, message: &str) -> Option<ProgressBar> {
    if !enabled {
        return None;
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    Some(pb)
}

/// Transcribe a video into word timings with the configured AssemblyAI key
/// and write them to `words_out` as JSON.
pub async fn caption_video(
    input: &Path,
    words_out: &Path,
    config: &Config,
    cancelled: Arc<AtomicBool>,
) -> Result<CaptionResult> {
    config.validate(true)?;
    let api_key = config.assemblyai_api_key.clone().unwrap_or_default();
    let mut client = AssemblyAiClient::new(api_key);
    if let Some(language) = &config.language {
        client = client.with_language(language.clone());
    }
    caption_video_with(input, words_out, &client, true, cancelled).await
}

/// [`caption_video`] with an explicit transcriber.
pub async fn caption_video_with(
    input: &Path,
    words_out: &Path,
    transcriber: &dyn Transcriber,
    show_progress: bool,
    cancelled: Arc<AtomicBool>,
) -> Result<CaptionResult> {
    let start_time = Instant::now();

    if !input.exists() {
        return Err(CaptionError::FileNotFound(input.display().to_string()));
    }

    check_ffmpeg().map_err(|_| {
        CaptionError::AudioExtraction(
            "FFmpeg not found. Install it with: brew install ffmpeg (macOS) or apt install ffmpeg (Linux)".to_string()
        )
    })?;

    let guard = TempCleanupGuard::new(cancelled.clone())?;
    check_cancelled(&cancelled)?;

    info!("Stage 1/2: Extracting audio from {:?}", input);
    let extraction_start = Instant::now();
    let pb = spinner(show_progress, "Extracting audio...");

    let audio_path = guard.path().join("audio.wav");
    extract_audio(input, &audio_path).await?;

    if let Some(pb) = pb {
        pb.finish_with_message("✓ Audio extracted");
    }
    let extraction_time = extraction_start.elapsed();
    check_cancelled(&cancelled)?;

    info!("Stage 2/2: Transcribing with {}", transcriber.name());
    let transcription_start = Instant::now();
    let pb = spinner(
        show_progress,
        &format!("Transcribing with {}...", transcriber.name()),
    );

    let provider_words = transcriber.transcribe(&audio_path).await?;
    let transcript = Transcript::from_provider(provider_words);

    if let Some(pb) = pb {
        pb.finish_with_message(format!("✓ Transcribed {} words", transcript.len()));
    }
    let transcription_time = transcription_start.elapsed();
    check_cancelled(&cancelled)?;

    if transcript.is_empty() {
        warn!("No words were recognized in {:?}", input);
    }

    transcript.save(words_out)?;
    info!("Wrote {} words to {:?}", transcript.len(), words_out);

    let stats = CaptionStats {
        total_time: start_time.elapsed(),
        extraction_time,
        transcription_time,
        word_count: transcript.len(),
        speech_duration: transcript.words().last().map_or(0.0, |w| w.end),
        provider: transcriber.name().to_string(),
    };

    Ok(CaptionResult {
        words_path: words_out.to_path_buf(),
        transcript,
        stats,
    })
}

/// Burn windowed captions for `words` into `input`, writing `output`.
pub async fn export_video(
    input: &Path,
    words: &[Word],
    style: &StyleConfig,
    quality: &QualitySettings,
    output: &Path,
    options: &ExportOptions,
    cancelled: Arc<AtomicBool>,
) -> Result<ExportStats> {
    let start_time = Instant::now();

    if !input.exists() {
        return Err(CaptionError::FileNotFound(input.display().to_string()));
    }
    check_ffmpeg().map_err(|e| CaptionError::Render(e.to_string()))?;

    let guard = TempCleanupGuard::new(cancelled.clone())?;
    check_cancelled(&cancelled)?;

    if words.is_empty() {
        warn!("No words to caption, the video will be re-encoded without captions");
    }

    info!(
        "Stage 1/2: Generating {} script ({} words, window {})",
        options.script.mode,
        words.len(),
        options.script.window_size
    );
    let script = generate_with(words, style, &options.script);
    let event_count = script
        .lines()
        .filter(|line| line.starts_with("Dialogue:"))
        .count();

    let script_path = guard.path().join("captions.ass");
    fs::write(&script_path, &script)?;
    if let Some(keep) = &options.keep_script {
        fs::write(keep, &script)?;
        info!("Script saved to {:?}", keep);
    }
    check_cancelled(&cancelled)?;

    info!("Stage 2/2: Rendering video ({})", quality);
    let render_start = Instant::now();
    let pb = spinner(options.show_progress, "Burning captions...");

    burn_subtitles(input, &script_path, output, quality).await?;

    if let Some(pb) = pb {
        pb.finish_with_message(format!("✓ Rendered {}", output.display()));
    }
    let render_time = render_start.elapsed();

    Ok(ExportStats {
        total_time: start_time.elapsed(),
        render_time,
        event_count,
        output_path: output.to_path_buf(),
        quality: *quality,
    })
}

/// Print a summary of a transcription run.
pub fn print_caption_summary(result: &CaptionResult) {
    let stats = &result.stats;
    println!();
    println!("═══════════════════════════════════════════════════════════════");
    println!("                      Transcription Complete                   ");
    println!("═══════════════════════════════════════════════════════════════");
    println!();
    println!("  Words file: {}", result.words_path.display());
    println!("  Words:      {}", stats.word_count);
    println!("  Provider:   {}", stats.provider);
    println!("  Speech:     {:.1}s", stats.speech_duration);
    println!();
    println!("  Timing:");
    println!("    Extract:     {:.2}s", stats.extraction_time.as_secs_f64());
    println!(
        "    Transcribe:  {:.2}s",
        stats.transcription_time.as_secs_f64()
    );
    println!("    Total:       {:.2}s", stats.total_time.as_secs_f64());
    println!();
    println!("═══════════════════════════════════════════════════════════════");
}

/// Print a summary of an export run.
pub fn print_export_summary(stats: &ExportStats) {
    println!();
    println!("═══════════════════════════════════════════════════════════════");
    println!("                        Export Complete                        ");
    println!("═══════════════════════════════════════════════════════════════");
    println!();
    println!("  Output:     {}", stats.output_path.display());
    println!("  Events:     {}", stats.event_count);
    println!("  Quality:    {}", stats.quality);
    println!();
    println!("  Timing:");
    println!("    Render:      {:.2}s", stats.render_time.as_secs_f64());
    println!("    Total:       {:.2}s", stats.total_time.as_secs_f64());
    println!();
    println!("═══════════════════════════════════════════════════════════════");
}
