use crate::caption::WindowSize;
use crate::config::Config;
use crate::media::{FrameRate, Preset, QualitySettings, Resolution};
use crate::style::{Color, FontSize, StyleConfig};
use crate::subtitle::{HighlightMode, ScriptOptions};
use console::style;
use dialoguer::{Confirm, Input, Select};
use std::fs;
use std::path::{Path, PathBuf};

const SUPPORTED_EXTENSIONS: &[&str] = &["mp4", "mkv", "avi", "mov", "webm"];

const COLORS: &[(&str, &str)] = &[
    ("#FFFFFF", "White"),
    ("#FFFF00", "Yellow"),
    ("#00FF00", "Green"),
    ("#00FFFF", "Cyan"),
    ("#FF00FF", "Magenta"),
    ("#FF0000", "Red"),
    ("#000000", "Black"),
];

const BACKGROUNDS: &[(&str, &str)] = &[
    ("rgba(0, 0, 0, 0.5)", "Translucent black"),
    ("rgba(0, 0, 0, 0.8)", "Dark"),
    ("rgba(0, 0, 0, 0)", "None"),
];

pub struct WizardResult {
    pub input: PathBuf,
    pub output: PathBuf,
    pub style: StyleConfig,
    pub quality: QualitySettings,
    pub script: ScriptOptions,
}

/// Walk through caption style and export quality for `burn --interactive`.
pub fn run_export_wizard(
    input: Option<PathBuf>,
    base_style: StyleConfig,
    config: &Config,
) -> anyhow::Result<WizardResult> {
    print_header();

    // Step 1: Source video
    let input = match input {
        Some(path) => path,
        None => select_source_file()?,
    };

    // Step 2: Caption style
    println!("\n{}", style("Caption style:").bold());
    let mut caption_style = base_style;
    caption_style.color = Some(select_color(
        "Text color",
        caption_style.color.as_deref().unwrap_or("#FFFFFF"),
    )?);
    caption_style.highlight_color = Some(select_color(
        "Highlight color",
        caption_style.highlight_color.as_deref().unwrap_or("#FFFF00"),
    )?);
    caption_style.background_color = Some(select_background()?);
    caption_style.font_size = Some(FontSize::Px(input_font_size(&caption_style)?));
    if Confirm::new()
        .with_prompt("Bold text?")
        .default(caption_style.resolve().bold)
        .interact()?
    {
        caption_style.font_weight = Some("bold".to_string());
    } else {
        caption_style.font_weight = Some("normal".to_string());
    }

    // Step 3: Highlighting
    let script = ScriptOptions {
        window_size: input_window_size(config.window_size)?,
        mode: select_highlight_mode(config.highlight_mode)?,
    };

    // Step 4: Export quality
    let quality = select_quality(config.quality)?;

    let output = derive_output_path(&input);

    // Step 5: Confirm
    print_summary(&input, &output, &caption_style, &script, &quality);

    if !Confirm::new()
        .with_prompt("Proceed with these settings?")
        .default(true)
        .interact()?
    {
        anyhow::bail!("Cancelled by user");
    }

    println!();

    Ok(WizardResult {
        input,
        output,
        style: caption_style,
        quality,
        script,
    })
}

fn print_header() {
    println!();
    println!(
        "{}",
        style("╔═══════════════════════════════════════════════════╗").cyan()
    );
    println!(
        "{}",
        style("║        wordcap - Word-Highlighted Captions        ║").cyan()
    );
    println!(
        "{}",
        style("╚═══════════════════════════════════════════════════╝").cyan()
    );
    println!();
}

fn select_source_file() -> anyhow::Result<PathBuf> {
    println!("\n{}", style("Select source video:").bold());

    let files = scan_media_files(".")?;

    if files.is_empty() {
        println!("  No video files found in current directory.\n");
        return input_existing_path();
    }

    let mut items: Vec<String> = files
        .iter()
        .map(|f| {
            let size = fs::metadata(f)
                .map(|m| format_size(m.len()))
                .unwrap_or_else(|_| "?".to_string());
            format!("{} ({})", f.display(), size)
        })
        .collect();
    items.push("Enter custom path...".to_string());

    let selection = Select::new()
        .with_prompt("Choose a file")
        .items(&items)
        .default(0)
        .interact()?;

    if selection == files.len() {
        input_existing_path()
    } else {
        Ok(files[selection].clone())
    }
}

fn input_existing_path() -> anyhow::Result<PathBuf> {
    let path: String = Input::new()
        .with_prompt("Enter file path")
        .interact_text()?;
    let path = PathBuf::from(path.trim());
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }
    Ok(path)
}

fn scan_media_files(dir: &str) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_supported_video(&path) {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

fn is_supported_video(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

fn select_color(prompt: &str, current: &str) -> anyhow::Result<String> {
    let mut items: Vec<String> = COLORS
        .iter()
        .map(|(hex, name)| format!("{} ({})", name, hex))
        .collect();
    items.push("Custom hex...".to_string());

    let default = COLORS
        .iter()
        .position(|(hex, _)| hex.eq_ignore_ascii_case(current))
        .unwrap_or(0);

    let selection = Select::new()
        .with_prompt(prompt)
        .items(&items)
        .default(default)
        .interact()?;

    if selection < COLORS.len() {
        return Ok(COLORS[selection].0.to_string());
    }

    let hex: String = Input::new()
        .with_prompt("Enter a hex color (e.g. #FF8800)")
        .validate_with(|s: &String| -> Result<(), String> {
            match Color::parse(s.trim()) {
                Some(Color::Hex { .. }) => Ok(()),
                _ => Err("Expected #RRGGBB".to_string()),
            }
        })
        .interact_text()?;
    Ok(hex.trim().to_string())
}

fn select_background() -> anyhow::Result<String> {
    let items: Vec<&str> = BACKGROUNDS.iter().map(|(_, name)| *name).collect();
    let selection = Select::new()
        .with_prompt("Background")
        .items(&items)
        .default(0)
        .interact()?;
    Ok(BACKGROUNDS[selection].0.to_string())
}

fn input_font_size(current: &StyleConfig) -> anyhow::Result<i64> {
    let default = current
        .font_size
        .as_ref()
        .and_then(FontSize::to_px)
        .unwrap_or(crate::style::DEFAULT_FONT_SIZE);
    let default = i64::from(default);

    let size: i64 = Input::new()
        .with_prompt("Font size (px)")
        .default(default)
        .validate_with(|n: &i64| -> Result<(), String> {
            if *n > 0 {
                Ok(())
            } else {
                Err("Font size must be positive".to_string())
            }
        })
        .interact_text()?;
    Ok(size)
}

fn input_window_size(current: WindowSize) -> anyhow::Result<WindowSize> {
    let size: String = Input::new()
        .with_prompt("Words visible at once")
        .default(current.to_string())
        .validate_with(|s: &String| s.trim().parse::<WindowSize>().map(|_| ()))
        .interact_text()?;
    size.trim()
        .parse::<WindowSize>()
        .map_err(|e| anyhow::anyhow!(e))
}

fn select_highlight_mode(current: HighlightMode) -> anyhow::Result<HighlightMode> {
    let modes = [
        (HighlightMode::Windowed, "Windowed - one event per word, matches the preview"),
        (HighlightMode::Karaoke, "Karaoke - timed sweep through each group of words"),
    ];
    let items: Vec<&str> = modes.iter().map(|(_, desc)| *desc).collect();
    let default = modes.iter().position(|(m, _)| *m == current).unwrap_or(0);

    let selection = Select::new()
        .with_prompt("Highlight mode")
        .items(&items)
        .default(default)
        .interact()?;
    Ok(modes[selection].0)
}

fn select_quality(current: QualitySettings) -> anyhow::Result<QualitySettings> {
    println!("\n{}", style("Export quality:").bold());

    let resolution = select_from(
        "Resolution",
        Resolution::ALL.as_slice(),
        current.resolution,
    )?;
    let frame_rate = select_from("Frame rate", FrameRate::ALL.as_slice(), current.frame_rate)?;
    let preset = select_from("Encoder preset", Preset::ALL.as_slice(), current.preset)?;

    let video_bitrate: u32 = Input::new()
        .with_prompt("Video bitrate (kbps)")
        .default(current.video_bitrate)
        .interact_text()?;
    let audio_bitrate: u32 = Input::new()
        .with_prompt("Audio bitrate (kbps)")
        .default(current.audio_bitrate)
        .interact_text()?;

    Ok(QualitySettings {
        resolution,
        frame_rate,
        video_bitrate,
        audio_bitrate,
        preset,
    })
}

fn select_from<T>(prompt: &str, options: &[T], current: T) -> anyhow::Result<T>
where
    T: Copy + PartialEq + std::fmt::Display,
{
    let items: Vec<String> = options.iter().map(ToString::to_string).collect();
    let default = options.iter().position(|o| *o == current).unwrap_or(0);
    let selection = Select::new()
        .with_prompt(prompt)
        .items(&items)
        .default(default)
        .interact()?;
    Ok(options[selection])
}

/// `clip.mov` becomes `clip_captioned.mp4` next to the input.
pub fn derive_output_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default();
    input.with_file_name(format!("{}_captioned.mp4", stem.to_string_lossy()))
}

fn print_summary(
    input: &Path,
    output: &Path,
    caption_style: &StyleConfig,
    script: &ScriptOptions,
    quality: &QualitySettings,
) {
    let resolved = caption_style.resolve();
    println!("\n{}", style("═══ Summary ═══").bold());
    println!("  Input:     {}", style(input.display()).cyan());
    println!("  Output:    {}", style(output.display()).cyan());
    println!(
        "  Colors:    {} / {}",
        resolved.primary.to_css(),
        resolved.highlight.to_css()
    );
    println!(
        "  Font:      {} {}px{}",
        resolved.font_family,
        resolved.font_size,
        if resolved.bold { " bold" } else { "" }
    );
    println!("  Window:    {} words ({})", script.window_size, script.mode);
    println!("  Quality:   {}", quality);
    println!();
}
