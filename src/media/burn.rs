use std::path::Path;

use tracing::{debug, info};

use super::quality::QualitySettings;
use crate::error::{CaptionError, Result};

/// Escape a path for use inside `subtitles=filename='...'`.
///
/// The value is unquoted twice: once by the filtergraph parser and once by
/// the filter's option parser. `\` and `:` get a backslash for the option
/// parser and pass through the quotes untouched. A quote cannot appear
/// inside quotes, so it closes them, emits `\\\'` (an escaped backslash
/// and quote, leaving `\'` for the option parser) and reopens them.
pub fn escape_filter_path(path: &Path) -> String {
    let raw = path.display().to_string();
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\\' | ':' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '\'' => escaped.push_str(r"'\\\''"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Full FFmpeg argument list for burning `script` into `input`.
pub fn burn_args(input: &Path, script: &Path, output: &Path, quality: &QualitySettings) -> Vec<String> {
    let mut filter = format!("subtitles=filename='{}'", escape_filter_path(script));
    if let Some(scale) = quality.scale_filter() {
        filter.push(',');
        filter.push_str(&scale);
    }

    let mut args = vec![
        "-y".to_string(),
        "-i".to_string(),
        input.display().to_string(),
        "-vf".to_string(),
        filter,
    ];
    args.extend(quality.encoder_args());
    args.push(output.display().to_string());
    args
}

/// Render `script` onto `input` with FFmpeg, writing `output`.
///
/// FFmpeg must be built with libass for the `subtitles` filter.
pub async fn burn_subtitles(
    input: &Path,
    script: &Path,
    output: &Path,
    quality: &QualitySettings,
) -> Result<()> {
    if !input.exists() {
        return Err(CaptionError::FileNotFound(input.display().to_string()));
    }
    if !script.exists() {
        return Err(CaptionError::FileNotFound(script.display().to_string()));
    }

    let args = burn_args(input, script, output, quality);
    info!("Burning captions into {} ({})", output.display(), quality);
    debug!("ffmpeg {}", args.join(" "));

    let result = tokio::process::Command::new("ffmpeg")
        .args(&args)
        .output()
        .await
        .map_err(|e| CaptionError::Render(format!("Failed to run FFmpeg: {e}")))?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        return Err(CaptionError::Render(format!(
            "FFmpeg exited with {}: {}",
            result.status,
            stderr.lines().last().unwrap_or("unknown error")
        )));
    }

    if !output.exists() {
        return Err(CaptionError::Render(
            "Output file was not created".to_string(),
        ));
    }

    info!("Final video written to {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::quality::{FrameRate, Resolution};

    #[test]
    fn test_escape_filter_path() {
        assert_eq!(escape_filter_path(Path::new("/tmp/a.ass")), "/tmp/a.ass");
        assert_eq!(
            escape_filter_path(Path::new("C:\\subs\\it's.ass")),
            r"C\:\\subs\\it'\\\''s.ass"
        );
    }

    #[test]
    fn test_quote_in_script_path_stays_quoted() {
        let args = burn_args(
            Path::new("in.mp4"),
            Path::new("/tmp/it's.ass"),
            Path::new("out.mp4"),
            &QualitySettings::default(),
        );
        assert!(args[4].starts_with(r"subtitles=filename='/tmp/it'\\\''s.ass',"));
    }

    /// FFmpeg token unescaping: quoted runs are literal, `\x` yields `x`.
    fn unquote(token: &str) -> String {
        let mut out = String::new();
        let mut quoted = false;
        let mut chars = token.chars();
        while let Some(c) = chars.next() {
            match c {
                '\'' => quoted = !quoted,
                '\\' if !quoted => out.extend(chars.next()),
                other => out.push(other),
            }
        }
        out
    }

    #[test]
    fn test_escaped_path_survives_both_parsers() {
        for raw in ["/tmp/it's.ass", "C:\\subs\\a:b.ass", "/tmp/don't stop's.ass"] {
            let quoted = format!("'{}'", escape_filter_path(Path::new(raw)));
            assert_eq!(unquote(&unquote(&quoted)), raw);
        }
    }

    #[test]
    fn test_burn_args_default_quality() {
        let args = burn_args(
            Path::new("in.mp4"),
            Path::new("/tmp/captions.ass"),
            Path::new("out.mp4"),
            &QualitySettings::default(),
        );

        assert_eq!(
            args,
            vec![
                "-y",
                "-i",
                "in.mp4",
                "-vf",
                "subtitles=filename='/tmp/captions.ass',scale=-2:720",
                "-r",
                "30",
                "-b:v",
                "2000k",
                "-b:a",
                "128k",
                "-preset",
                "medium",
                "out.mp4",
            ]
        );
    }

    #[test]
    fn test_burn_args_original_quality() {
        let quality = QualitySettings {
            resolution: Resolution::Original,
            frame_rate: FrameRate::Original,
            ..Default::default()
        };
        let args = burn_args(
            Path::new("in.mp4"),
            Path::new("c.ass"),
            Path::new("out.mp4"),
            &quality,
        );
        assert_eq!(args[4], "subtitles=filename='c.ass'");
        assert!(!args.contains(&"-r".to_string()));
    }

    #[tokio::test]
    async fn test_burn_missing_input() {
        let result = burn_subtitles(
            Path::new("/nonexistent/in.mp4"),
            Path::new("/nonexistent/c.ass"),
            Path::new("/tmp/out.mp4"),
            &QualitySettings::default(),
        )
        .await;
        assert!(matches!(result, Err(CaptionError::FileNotFound(_))));
    }
}
