//! Media inspection through `ffprobe`.

use std::path::Path;
use std::process::Command;

use newsframe_common::error::{NewsframeError, NewsframeResult};
use serde::{Deserialize, Serialize};

use crate::export::command_exists;

/// What `ffprobe` reports about a media file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    pub has_audio: bool,
    pub has_video: bool,
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    format: Option<ProbeFormat>,
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

/// Runs `ffprobe` for durations and dimensions.
#[derive(Debug, Clone)]
pub struct Prober {
    ffprobe_bin: String,
}

impl Prober {
    pub fn new(ffprobe_bin: impl Into<String>) -> Self {
        Self {
            ffprobe_bin: ffprobe_bin.into(),
        }
    }

    pub fn is_available(&self) -> bool {
        command_exists(&self.ffprobe_bin)
    }

    /// Probe container duration and the first video stream's size.
    pub fn probe(&self, path: &Path) -> NewsframeResult<MediaInfo> {
        if !path.exists() {
            return Err(NewsframeError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let output = Command::new(&self.ffprobe_bin)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration:stream=codec_type,width,height",
                "-of",
                "json",
            ])
            .arg(path)
            .output()
            .map_err(|e| NewsframeError::encoding(format!("Failed to start ffprobe: {e}")))?;

        if !output.status.success() {
            return Err(NewsframeError::encoding(format!(
                "ffprobe failed on {} (status {}): {}",
                path.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let info = parse_probe_json(&String::from_utf8_lossy(&output.stdout))?;
        tracing::debug!(path = %path.display(), ?info, "Probed media");
        Ok(info)
    }

    /// Measured duration in seconds; errors when the file reports none.
    pub fn duration(&self, path: &Path) -> NewsframeResult<f64> {
        self.probe(path)?.duration_secs.ok_or_else(|| {
            NewsframeError::encoding(format!("{} reports no duration", path.display()))
        })
    }
}

/// Parse `ffprobe -of json` output.
pub fn parse_probe_json(raw: &str) -> NewsframeResult<MediaInfo> {
    let parsed: ProbeOutput = serde_json::from_str(raw)?;

    let duration_secs = parsed
        .format
        .and_then(|format| format.duration)
        .and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|secs| secs.is_finite() && *secs > 0.0);

    let video = parsed
        .streams
        .iter()
        .find(|stream| stream.codec_type.as_deref() == Some("video"));

    Ok(MediaInfo {
        duration_secs,
        width: video.and_then(|s| s.width).filter(|w| *w > 0),
        height: video.and_then(|s| s.height).filter(|h| *h > 0),
        has_audio: parsed
            .streams
            .iter()
            .any(|stream| stream.codec_type.as_deref() == Some("audio")),
        has_video: video.is_some(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_video_with_audio() {
        let raw = r#"{
            "programs": [],
            "streams": [
                {"codec_type": "video", "width": 1080, "height": 1920},
                {"codec_type": "audio"}
            ],
            "format": {"duration": "23.110000"}
        }"#;
        let info = parse_probe_json(raw).unwrap();
        assert_eq!(info.duration_secs, Some(23.11));
        assert_eq!((info.width, info.height), (Some(1080), Some(1920)));
        assert!(info.has_audio);
        assert!(info.has_video);
    }

    #[test]
    fn test_parse_audio_only() {
        let raw = r#"{"streams": [{"codec_type": "audio"}], "format": {"duration": "5.5"}}"#;
        let info = parse_probe_json(raw).unwrap();
        assert_eq!(info.duration_secs, Some(5.5));
        assert_eq!(info.width, None);
        assert!(!info.has_video);
    }

    #[test]
    fn test_parse_missing_duration() {
        let info = parse_probe_json(r#"{"format": {"duration": "N/A"}}"#).unwrap();
        assert_eq!(info.duration_secs, None);
        assert!(parse_probe_json("not json").is_err());
    }

    #[test]
    fn test_probe_missing_file() {
        let err = Prober::new("ffprobe")
            .probe(Path::new("/nonexistent/clip.mp3"))
            .unwrap_err();
        assert!(matches!(err, NewsframeError::FileNotFound { .. }));
    }
}
