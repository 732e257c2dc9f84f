use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::Term;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use wordcap::caption::{Transcript, WindowSize};
use wordcap::config::Config;
use wordcap::interactive::{derive_output_path, run_export_wizard};
use wordcap::media::{FrameRate, Preset, QualitySettings, Resolution};
use wordcap::pipeline::{self, ExportOptions};
use wordcap::preview::LivePreview;
use wordcap::style::StyleConfig;
use wordcap::subtitle::{generate_with, HighlightMode, ScriptOptions};

#[derive(Parser)]
#[command(name = "wordcap")]
#[command(version, about = "Word-level highlighted captions")]
#[command(
    long_about = "Transcribe videos into word timings, preview captions that highlight the spoken word, and burn them into the video as an ASS script."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Transcribe a video into a words JSON file
    Transcribe {
        /// Input video file
        input: PathBuf,

        /// Words file (defaults to input name with .words.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Spoken language code (e.g. en_us); auto-detected when omitted
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Write the ASS script for a words file
    Render {
        /// Words JSON file
        words: PathBuf,

        /// Style file (.toml or .json)
        #[arg(short, long)]
        style: Option<PathBuf>,

        /// Output script (defaults to words name with .ass)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        highlight: HighlightArgs,
    },

    /// Play captions in the terminal
    Preview {
        /// Words JSON file
        words: PathBuf,

        /// Style file (.toml or .json)
        #[arg(short, long)]
        style: Option<PathBuf>,

        /// Show a single frame at this time (seconds) instead of playing
        #[arg(long)]
        at: Option<f64>,

        /// Playback speed multiplier
        #[arg(long, default_value = "1.0")]
        speed: f64,

        /// Number of words visible at once
        #[arg(short, long)]
        window_size: Option<WindowSize>,
    },

    /// Burn highlighted captions into a video
    Burn {
        /// Input video file (prompted for with --interactive)
        input: Option<PathBuf>,

        /// Words JSON file
        #[arg(short = 'W', long)]
        words: PathBuf,

        /// Style file (.toml or .json)
        #[arg(short, long)]
        style: Option<PathBuf>,

        /// Output video (defaults to <input>_captioned.mp4)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also save the generated script
        #[arg(long)]
        keep_script: Option<PathBuf>,

        /// Choose style and quality with prompts
        #[arg(short, long)]
        interactive: bool,

        #[command(flatten)]
        highlight: HighlightArgs,

        /// Output resolution: 480p, 720p, 1080p, original
        #[arg(long)]
        resolution: Option<Resolution>,

        /// Output frame rate: 24, 30, 60, original
        #[arg(long)]
        fps: Option<FrameRate>,

        /// Encoder preset: ultrafast, fast, medium, slow, veryslow
        #[arg(long)]
        preset: Option<Preset>,

        /// Video bitrate in kbps
        #[arg(long)]
        video_bitrate: Option<u32>,

        /// Audio bitrate in kbps
        #[arg(long)]
        audio_bitrate: Option<u32>,
    },
}

#[derive(clap::Args)]
struct HighlightArgs {
    /// Number of words visible at once
    #[arg(short, long)]
    window_size: Option<WindowSize>,

    /// Highlight mode: windowed, karaoke
    #[arg(short, long)]
    mode: Option<HighlightMode>,
}

impl HighlightArgs {
    fn script_options(&self, config: &Config) -> ScriptOptions {
        ScriptOptions {
            window_size: self.window_size.unwrap_or(config.window_size),
            mode: self.mode.unwrap_or(config.highlight_mode),
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

fn with_extension(path: &Path, extension: &str) -> PathBuf {
    let stem = path.file_stem().unwrap_or_default().to_string_lossy();
    let stem = stem.strip_suffix(".words").unwrap_or(&*stem);
    path.with_file_name(format!("{}.{}", stem, extension))
}

fn load_style(path: Option<&Path>, config: &Config) -> Result<StyleConfig> {
    let mut style = match path {
        Some(path) => StyleConfig::load(path)
            .with_context(|| format!("Failed to load style from {}", path.display()))?,
        None => StyleConfig::default(),
    };
    if style.font_family.is_none() {
        style.font_family = config.font_family.clone();
    }
    Ok(style)
}

fn load_words(path: &Path) -> Result<Transcript> {
    let transcript = Transcript::load(path)
        .with_context(|| format!("Failed to load words from {}", path.display()))?;
    if transcript.is_empty() {
        warn!("{} contains no words", path.display());
    }
    Ok(transcript)
}

fn install_ctrlc(cancelled: Arc<AtomicBool>) {
    let result = ctrlc::set_handler(move || {
        if cancelled.swap(true, Ordering::Relaxed) {
            std::process::exit(130);
        }
        eprintln!("\nCancelling... press Ctrl+C again to force quit");
    });
    if let Err(e) = result {
        warn!("Failed to install Ctrl+C handler: {}", e);
    }
}

async fn play_preview(
    preview: &mut LivePreview,
    speed: f64,
    cancelled: &AtomicBool,
) -> Result<()> {
    let term = Term::stdout();
    let (rows, cols) = term.size();
    let (height, width) = (usize::from(rows), usize::from(cols));
    let end = preview.duration() + 0.5;
    let started = Instant::now();
    let mut ticker = tokio::time::interval(Duration::from_millis(33));

    loop {
        ticker.tick().await;
        if cancelled.load(Ordering::Relaxed) {
            break;
        }
        let time = started.elapsed().as_secs_f64() * speed;
        if time > end {
            break;
        }
        if let Some(frame) = preview.update(time) {
            term.clear_screen()?;
            term.write_str(&frame.render_screen(preview.style(), width, height).join("\n"))?;
        }
    }
    term.write_line("")?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let config = Config::load().context("Failed to load configuration")?;
    let cancelled = Arc::new(AtomicBool::new(false));
    install_ctrlc(cancelled.clone());

    match cli.command {
        Command::Transcribe {
            input,
            output,
            language,
        } => {
            if !input.exists() {
                anyhow::bail!("Input file not found: {}", input.display());
            }
            let mut config = config;
            if language.is_some() {
                config.language = language;
            }
            config
                .validate(true)
                .context("Configuration validation failed")?;

            let output = output.unwrap_or_else(|| with_extension(&input, "words.json"));
            info!("Input:  {}", input.display());
            info!("Output: {}", output.display());

            let result = pipeline::caption_video(&input, &output, &config, cancelled).await?;
            pipeline::print_caption_summary(&result);
        }

        Command::Render {
            words,
            style,
            output,
            highlight,
        } => {
            let transcript = load_words(&words)?;
            let style = load_style(style.as_deref(), &config)?;
            let options = highlight.script_options(&config);
            let output = output.unwrap_or_else(|| with_extension(&words, "ass"));

            let script = generate_with(transcript.words(), &style, &options);
            std::fs::write(&output, script)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            info!(
                "Wrote {} script for {} words to {}",
                options.mode,
                transcript.len(),
                output.display()
            );
        }

        Command::Preview {
            words,
            style,
            at,
            speed,
            window_size,
        } => {
            let transcript = load_words(&words)?;
            let style = load_style(style.as_deref(), &config)?.resolve();
            let size = window_size.unwrap_or(config.window_size);
            let mut preview = LivePreview::new(transcript.into_words(), style, size);

            match at {
                Some(time) => {
                    let frame = preview.frame_at(time);
                    println!("{}", frame.render_plain(preview.style()));
                }
                None => {
                    if speed <= 0.0 {
                        anyhow::bail!("Playback speed must be positive");
                    }
                    play_preview(&mut preview, speed, &cancelled).await?;
                }
            }
        }

        Command::Burn {
            input,
            words,
            style,
            output,
            keep_script,
            interactive,
            highlight,
            resolution,
            fps,
            preset,
            video_bitrate,
            audio_bitrate,
        } => {
            let transcript = load_words(&words)?;
            let base_style = load_style(style.as_deref(), &config)?;

            let (input, output, style, quality, script) = if interactive {
                let wizard = run_export_wizard(input, base_style, &config)?;
                let output = output.unwrap_or(wizard.output);
                (wizard.input, output, wizard.style, wizard.quality, wizard.script)
            } else {
                let input = input.context("An input video is required without --interactive")?;
                let output = output.unwrap_or_else(|| derive_output_path(&input));
                let defaults = config.quality;
                let quality = QualitySettings {
                    resolution: resolution.unwrap_or(defaults.resolution),
                    frame_rate: fps.unwrap_or(defaults.frame_rate),
                    preset: preset.unwrap_or(defaults.preset),
                    video_bitrate: video_bitrate.unwrap_or(defaults.video_bitrate),
                    audio_bitrate: audio_bitrate.unwrap_or(defaults.audio_bitrate),
                };
                let script = highlight.script_options(&config);
                (input, output, base_style, quality, script)
            };

            if !input.exists() {
                anyhow::bail!("Input file not found: {}", input.display());
            }

            info!("Input:   {}", input.display());
            info!("Output:  {}", output.display());
            info!("Quality: {}", quality);

            let options = ExportOptions {
                script,
                keep_script,
                show_progress: true,
            };
            let stats = pipeline::export_video(
                &input,
                transcript.words(),
                &style,
                &quality,
                &output,
                &options,
                cancelled,
            )
            .await?;
            pipeline::print_export_summary(&stats);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_extension() {
        let words = with_extension(Path::new("/path/to/video.mp4"), "words.json");
        assert_eq!(words, PathBuf::from("/path/to/video.words.json"));

        let script = with_extension(&words, "ass");
        assert_eq!(script, PathBuf::from("/path/to/video.ass"));
    }

    #[test]
    fn test_cli_rejects_zero_window() {
        let result = Cli::try_parse_from(["wordcap", "render", "w.json", "--window-size", "0"]);
        assert!(result.is_err());

        let result = Cli::try_parse_from(["wordcap", "render", "w.json", "-w", "3", "-m", "karaoke"]);
        assert!(result.is_ok());
    }

    #[test]
    fn test_cli_burn_quality_flags() {
        let cli = Cli::try_parse_from([
            "wordcap",
            "burn",
            "in.mp4",
            "-W",
            "in.words.json",
            "--resolution",
            "1080p",
            "--fps",
            "60",
        ])
        .unwrap();
        match cli.command {
            Command::Burn {
                resolution, fps, ..
            } => {
                assert_eq!(resolution, Some(Resolution::P1080));
                assert_eq!(fps, Some(FrameRate::Fps60));
            }
            _ => panic!("expected burn"),
        }
    }
}
