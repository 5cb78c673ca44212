use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use image::{Rgba, RgbaImage};
use newsframe_common::config::AppConfig;
use newsframe_common::error::{NewsframeError, NewsframeResult};
use newsframe_model::geometry::Size;
use newsframe_model::request::{AudioInput, Direction, RenderMode, RenderRequest, VideoOptions};
use newsframe_render_engine::export::{
    render_video, EncodeBackend, EncodeJob, EncodeStats, ExportProgress, ExportStage,
    FfmpegEncoder, ProgressCallback,
};
use newsframe_render_engine::frames::Frame;
use newsframe_render_engine::probe::Prober;
use newsframe_render_engine::{FontSet, ImageCompositor, PanScanRenderer};

const HEADLINE: &str =
    "Argentina venció a colombia y buscará su séptima corona sub20 en la final ante Marruecos";
const HIGHLIGHT: &str = "buscará su séptima corona sub20";

/// Counts frames instead of encoding them.
#[derive(Default)]
struct MemoryEncoder {
    indices: Vec<u64>,
    sizes: Vec<(u32, u32)>,
    skip_output: bool,
    unavailable: bool,
}

impl EncodeBackend for MemoryEncoder {
    fn encode(
        &mut self,
        job: &EncodeJob,
        frames: &mut dyn Iterator<Item = Frame>,
        progress: Option<&ProgressCallback>,
    ) -> NewsframeResult<EncodeStats> {
        let mut stats = EncodeStats::default();
        for frame in frames {
            self.indices.push(frame.index);
            self.sizes.push(frame.image.dimensions());
            stats.frames_written += 1;
            stats.bytes_written += frame.image.as_raw().len() as u64;
            if let Some(cb) = progress {
                cb(ExportProgress {
                    progress: stats.frames_written as f64 / job.frame_count as f64,
                    frames_rendered: stats.frames_written,
                    total_frames: job.frame_count,
                    eta_secs: 0.0,
                    stage: ExportStage::Encoding,
                });
            }
        }
        if !self.skip_output {
            std::fs::write(&job.output_path, format!("{} frames", stats.frames_written))?;
        }
        Ok(stats)
    }

    fn is_available(&self) -> bool {
        !self.unavailable
    }

    fn name(&self) -> &str {
        "memory"
    }
}

fn newsroom_photo() -> RgbaImage {
    RgbaImage::from_fn(1600, 900, |x, y| {
        Rgba([(x * 255 / 1599) as u8, (y * 255 / 899) as u8, 140, 255])
    })
}

fn video_request(options: VideoOptions) -> RenderRequest {
    RenderRequest::new(HEADLINE, HIGHLIGHT, newsroom_photo(), RenderMode::Video).with_video(options)
}

fn small_canvas_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.render.video_width = 180;
    config.render.video_height = 320;
    config
}

#[test]
fn argentina_zoom_in_video_without_audio() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("argentina.mp4");
    let config = AppConfig::default();
    let fonts = FontSet::resolve(&config.fonts);
    let request = video_request(VideoOptions {
        direction: Direction::ZoomIn,
        duration_secs: 5.0,
        fps: 30,
        keep_aspect: true,
        audio: None,
    });

    let mut encoder = MemoryEncoder::default();
    let result = render_video(&request, &fonts, &config, &mut encoder, &output, None).unwrap();

    assert_eq!(result.mode, RenderMode::Video);
    assert_eq!(result.size, Size::new(1080, 1920));
    assert_eq!(result.frame_count, Some(150));
    assert_eq!(result.duration_secs, Some(5.0));
    assert!(!result.has_audio);
    assert_eq!(result.video_path(), Some(&output));
    assert!(output.exists());

    assert_eq!(encoder.indices, (0..150).collect::<Vec<u64>>());
    assert!(encoder.sizes.iter().all(|size| *size == (1080, 1920)));

    let summary = result.summary();
    assert_eq!(summary.dimensions, "1080x1920");

    // The highlight wraps, and every highlighted word is bold, in order.
    let renderer = PanScanRenderer::new(&request, &fonts, &config, 1).unwrap();
    let layout = &renderer.overlay().layout;
    let bold_lines = layout
        .lines
        .iter()
        .filter(|line| line.segments.iter().any(|segment| segment.bold))
        .count();
    assert!(bold_lines >= 2, "highlight fits on {bold_lines} line(s)");
    let bold_words: Vec<&str> = layout
        .lines
        .iter()
        .flat_map(|line| line.segments.iter())
        .filter(|segment| segment.bold)
        .flat_map(|segment| segment.text.split_whitespace())
        .collect();
    assert_eq!(bold_words, HIGHLIGHT.split_whitespace().collect::<Vec<_>>());
    assert_eq!(layout.text(), HEADLINE);
}

#[test]
fn argentina_instagram_still() {
    let config = AppConfig::default();
    let fonts = FontSet::resolve(&config.fonts);
    let request = RenderRequest::new(HEADLINE, HIGHLIGHT, newsroom_photo(), RenderMode::Instagram);

    let result = ImageCompositor::new(&fonts, &config)
        .compose(&request)
        .unwrap();
    assert_eq!(result.size, Size::new(1080, 1350));
    let image = result.as_image().unwrap();
    assert_eq!(image.dimensions(), (1080, 1350));
}

#[test]
fn audio_length_overrides_requested_duration() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("with-audio.mp4");
    let config = small_canvas_config();
    let request = video_request(VideoOptions {
        direction: Direction::LeftToRight,
        duration_secs: 5.0,
        fps: 30,
        keep_aspect: false,
        audio: Some(AudioInput {
            path: PathBuf::from("voice.mp3"),
            duration_secs: 23.11,
        }),
    });

    let mut encoder = MemoryEncoder::default();
    let result = render_video(
        &request,
        &FontSet::builtin(),
        &config,
        &mut encoder,
        &output,
        None,
    )
    .unwrap();

    assert_eq!(result.duration_secs, Some(23.11));
    assert_eq!(result.frame_count, Some(693));
    assert!(result.has_audio);
    assert_eq!(encoder.indices.len(), 693);
}

#[test]
fn progress_ends_complete() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("progress.mp4");
    let config = small_canvas_config();
    let request = video_request(VideoOptions {
        duration_secs: 1.0,
        fps: 12,
        ..VideoOptions::default()
    });

    let stages = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&stages);
    let progress: ProgressCallback = Box::new(move |report: ExportProgress| {
        sink.lock().unwrap().push(report.stage);
    });

    let mut encoder = MemoryEncoder::default();
    render_video(
        &request,
        &FontSet::builtin(),
        &config,
        &mut encoder,
        &output,
        Some(progress),
    )
    .unwrap();

    let stages = stages.lock().unwrap();
    assert_eq!(stages.first(), Some(&ExportStage::Preparing));
    assert_eq!(stages.last(), Some(&ExportStage::Complete));
    assert_eq!(
        stages.iter().filter(|s| **s == ExportStage::Encoding).count(),
        12
    );
}

#[test]
fn empty_artifact_is_an_encoding_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = small_canvas_config();
    let request = video_request(VideoOptions {
        duration_secs: 1.0,
        fps: 5,
        ..VideoOptions::default()
    });

    let mut encoder = MemoryEncoder {
        skip_output: true,
        ..MemoryEncoder::default()
    };
    let err = render_video(
        &request,
        &FontSet::builtin(),
        &config,
        &mut encoder,
        &dir.path().join("missing.mp4"),
        None,
    )
    .unwrap_err();
    assert!(matches!(err, NewsframeError::Encoding { .. }));

    let mut unavailable = MemoryEncoder {
        unavailable: true,
        ..MemoryEncoder::default()
    };
    let err = render_video(
        &request,
        &FontSet::builtin(),
        &config,
        &mut unavailable,
        &dir.path().join("never.mp4"),
        None,
    )
    .unwrap_err();
    assert!(matches!(err, NewsframeError::Encoding { .. }));
    assert!(unavailable.indices.is_empty());
}

#[test]
fn missing_highlight_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("never.mp4");
    let config = small_canvas_config();
    let mut request = video_request(VideoOptions::default());
    request.highlight = "Brasil".to_string();

    let mut encoder = MemoryEncoder::default();
    let err = render_video(
        &request,
        &FontSet::builtin(),
        &config,
        &mut encoder,
        &output,
        None,
    )
    .unwrap_err();
    assert!(matches!(err, NewsframeError::Layout { .. }));
    assert!(!output.exists());
    assert!(encoder.indices.is_empty());
}

#[test]
fn ffmpeg_round_trip_when_installed() {
    let config = small_canvas_config();
    let mut encoder = FfmpegEncoder::new(config.encoder.clone());
    let prober = Prober::new(config.encoder.ffprobe_bin.clone());
    if !encoder.is_available() || !prober.is_available() {
        eprintln!("ffmpeg/ffprobe not installed, skipping");
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("real.mp4");
    let request = video_request(VideoOptions {
        direction: Direction::DiagonalTrBl,
        duration_secs: 2.0,
        fps: 10,
        ..VideoOptions::default()
    });

    let result = render_video(
        &request,
        &FontSet::builtin(),
        &config,
        &mut encoder,
        &output,
        None,
    )
    .unwrap();
    assert_eq!(result.frame_count, Some(20));

    let info = prober.probe(&output).unwrap();
    assert_eq!((info.width, info.height), (Some(180), Some(320)));
    let duration = info.duration_secs.unwrap();
    assert!((duration - 2.0).abs() < 0.25, "duration {duration}");
    assert!(!info.has_audio);
}
