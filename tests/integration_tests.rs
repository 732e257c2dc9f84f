//! Integration tests for wordcap
//!
//! These tests exercise the caption engine end to end without FFmpeg or
//! API keys.

use std::fs;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tempfile::TempDir;
use wordcap::caption::{select_window, select_window_for_index, Transcript, WindowSize, Word};
use wordcap::config::Config;
use wordcap::media::QualitySettings;
use wordcap::pipeline::{export_video, ExportOptions};
use wordcap::preview::LivePreview;
use wordcap::style::{encode_opaque, encode_with_alpha, hex_to_bgr, StyleConfig};
use wordcap::subtitle::{format_timecode, generate, generate_with, HighlightMode, ScriptOptions};
use wordcap::CaptionError;

fn sentence() -> Vec<Word> {
    ["the", "quick", "brown", "fox", "jumps", "over", "the", "lazy", "dog"]
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let start = i as f64 * 0.5;
            Word::new(*text, start, start + 0.4)
        })
        .collect()
}

fn size(n: usize) -> WindowSize {
    WindowSize::new(n).unwrap()
}

fn dialogue_lines(script: &str) -> Vec<&str> {
    script
        .lines()
        .filter(|l| l.starts_with("Dialogue:"))
        .collect()
}

// ============================================================================
// Window Selection
// ============================================================================

mod window_tests {
    use super::*;

    #[test]
    fn test_window_properties_over_playback() {
        let words = sentence();
        for n in 1..=11 {
            for step in 0..100 {
                let time = step as f64 * 0.05;
                let window = select_window(&words, time, size(n));

                if window.is_empty() {
                    assert!(words.iter().all(|w| !w.contains(time)));
                    continue;
                }

                assert_eq!(window.len(), n.min(words.len()));
                let active = window.active_absolute().unwrap();
                assert!(words[active].contains(time));
                assert!(active >= window.offset && active < window.offset + window.len());
                assert_eq!(window.words, &words[window.offset..window.offset + window.len()]);
            }
        }
    }

    #[test]
    fn test_window_shifts_at_edges() {
        let words = sentence();

        let first = select_window_for_index(&words, 0, size(5));
        assert_eq!(first.offset, 0);
        assert_eq!(first.active, Some(0));

        let last = select_window_for_index(&words, 8, size(5));
        assert_eq!(last.offset, 4);
        assert_eq!(last.active, Some(4));

        let middle = select_window_for_index(&words, 4, size(5));
        assert_eq!(middle.offset, 2);
        assert_eq!(middle.active, Some(2));
    }

    #[test]
    fn test_gap_between_words_shows_nothing() {
        let words = sentence();
        assert!(select_window(&words, 0.45, size(5)).is_empty());
        assert!(select_window(&[], 1.0, size(5)).is_empty());
    }
}

// ============================================================================
// Color Encoding
// ============================================================================

mod color_tests {
    use super::*;

    #[test]
    fn test_ass_color_strings() {
        assert_eq!(hex_to_bgr("#FF0000"), "0000FF");
        assert_eq!(encode_opaque("#00FF00"), "&H0000FF00");
        assert_eq!(encode_with_alpha("rgba(0, 0, 0, 0.5)"), "&H80000000");
        assert_eq!(encode_with_alpha("rgba(255,0,0,1)"), "&H000000FF");
        assert_eq!(encode_with_alpha("#123456"), "&H00563412");
    }

    #[test]
    fn test_malformed_colors_fall_back() {
        assert_eq!(hex_to_bgr("red"), "FFFFFF");
        assert_eq!(encode_with_alpha("hsl(0, 0%, 0%)"), "&H80000000");
    }
}

// ============================================================================
// Script Generation
// ============================================================================

mod script_tests {
    use super::*;

    #[test]
    fn test_one_event_per_word_with_single_highlight() {
        let words = sentence();
        let script = generate(&words, &StyleConfig::default());
        let lines = dialogue_lines(&script);

        assert_eq!(lines.len(), words.len());
        for (line, word) in lines.iter().zip(&words) {
            assert!(line.starts_with(&format!(
                "Dialogue: 0,{},{},Default",
                format_timecode(word.start),
                format_timecode(word.end)
            )));
            assert_eq!(line.matches("\\b1}").count(), 1);
            assert!(line.contains(&format!("\\b1}}{}{{", word.text)));
        }
    }

    #[test]
    fn test_script_follows_style() {
        let style = StyleConfig {
            color: Some("#112233".to_string()),
            highlight_color: Some("#FF8800".to_string()),
            background_color: Some("rgba(16, 32, 48, 0.25)".to_string()),
            font_family: Some("Inter".to_string()),
            font_weight: Some("bold".to_string()),
            ..Default::default()
        };
        let script = generate(&sentence(), &style);

        assert!(script.contains(
            "Style: Default,Inter,20,&H00332211,&H000088FF,&H00000000,&HBF302010,-1,"
        ));
        assert!(script.contains("{\\c&H0088FF&\\b1}"));
        assert!(script.contains("{\\c&H332211&\\b0}"));
    }

    #[test]
    fn test_empty_words_yield_header_only() {
        let script = generate(&[], &StyleConfig::default());
        assert!(script.contains("[Events]"));
        assert!(dialogue_lines(&script).is_empty());
    }

    #[test]
    fn test_karaoke_groups_words() {
        let options = ScriptOptions {
            window_size: size(4),
            mode: HighlightMode::Karaoke,
        };
        let script = generate_with(&sentence(), &StyleConfig::default(), &options);
        let lines = dialogue_lines(&script);

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Dialogue: 0,00:00:00.00,00:00:01.90,"));
        assert!(lines[0].contains("{\\k40}the{\\k10} {\\k40}quick"));
        assert!(lines[2].ends_with("{\\k40}dog"));
    }

    #[test]
    fn test_edits_flow_into_script() {
        let mut transcript = Transcript::new(sentence());
        transcript.edit_text(3, "  cat ").unwrap();
        let removed = transcript.remove(0).unwrap();
        assert_eq!(removed.text, "the");

        let script = generate(transcript.words(), &StyleConfig::default());
        let lines = dialogue_lines(&script);

        assert_eq!(lines.len(), 8);
        assert!(lines[2].contains("\\b1}cat{"));
        assert!(lines[0].starts_with("Dialogue: 0,00:00:00.50,00:00:00.90,"));
    }
}

// ============================================================================
// Preview and Export Agreement
// ============================================================================

mod preview_tests {
    use super::*;

    #[test]
    fn test_preview_matches_script_windows() {
        let words = sentence();
        let style = StyleConfig::default();
        let script = generate(&words, &style);
        let lines = dialogue_lines(&script);
        let preview = LivePreview::new(words.clone(), style.resolve(), WindowSize::default());

        for (i, word) in words.iter().enumerate() {
            let frame = preview.frame_at((word.start + word.end) / 2.0);
            assert_eq!(frame.active_index, Some(i));

            let shown: Vec<&str> = frame.words.iter().map(|w| w.text.as_str()).collect();
            let text = lines[i].rsplit(",,").next().unwrap();
            let plain = text
                .replace("{\\c&H00FFFF&\\b1}", "")
                .replace("{\\c&HFFFFFF&\\b0}", "");
            assert_eq!(plain, shown.join(" "));
        }
    }

    #[test]
    fn test_preview_only_redraws_on_change() {
        let mut preview =
            LivePreview::new(sentence(), StyleConfig::default().resolve(), size(3));

        assert!(preview.update(0.1).is_some());
        assert!(preview.update(0.2).is_none());
        assert!(preview.update(0.45).is_some());
        assert!(preview.update(0.46).is_none());
        assert!(preview.update(0.6).is_some());

        preview.reset();
        assert!(preview.update(0.6).is_some());
    }
}

// ============================================================================
// Files and Config
// ============================================================================

mod file_tests {
    use super::*;

    #[test]
    fn test_transcript_and_style_files() {
        let dir = TempDir::new().unwrap();

        let words_path = dir.path().join("clip.words.json");
        Transcript::new(sentence()).save(&words_path).unwrap();
        let loaded = Transcript::load(&words_path).unwrap();
        assert_eq!(loaded.words(), sentence().as_slice());

        let style_path = dir.path().join("style.toml");
        fs::write(
            &style_path,
            "color = \"#00FF00\"\nhighlightColor = \"#FF00FF\"\nfontSize = \"32px\"\n",
        )
        .unwrap();
        let style = StyleConfig::load(&style_path).unwrap().resolve();
        assert_eq!(style.font_size, 32);
        assert_eq!(style.primary.to_bgr(), "00FF00");
        assert_eq!(style.highlight.to_bgr(), "FF00FF");

        let bad = dir.path().join("style.yaml");
        fs::write(&bad, "color: red").unwrap();
        assert!(matches!(
            StyleConfig::load(&bad),
            Err(CaptionError::Config(_))
        ));
    }

    #[test]
    fn test_config_defaults_match_engine() {
        let config = Config::default();
        assert_eq!(config.window_size, WindowSize::default());
        assert_eq!(config.highlight_mode, HighlightMode::Windowed);
        assert_eq!(config.quality, QualitySettings::default());
    }

    #[test]
    fn test_export_rejects_missing_video() {
        let result = tokio_test::block_on(export_video(
            std::path::Path::new("/nonexistent/video.mp4"),
            &sentence(),
            &StyleConfig::default(),
            &QualitySettings::default(),
            std::path::Path::new("/tmp/wordcap_out.mp4"),
            &ExportOptions {
                show_progress: false,
                ..Default::default()
            },
            Arc::new(AtomicBool::new(false)),
        ));
        tokio_test::assert_err!(&result);
        assert!(matches!(result, Err(CaptionError::FileNotFound(_))));
    }
}
