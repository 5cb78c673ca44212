//! Video assembly and encoding.

use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use newsframe_common::config::{AppConfig, EncoderConfig};
use newsframe_common::error::{NewsframeError, NewsframeResult};
use newsframe_model::geometry::Size;
use newsframe_model::request::{AudioInput, RenderMode, RenderRequest, VideoOptions};
use newsframe_model::result::{RenderOutput, RenderResult};
use newsframe_processing_core::pan_scan::frame_count;

use crate::fonts::FontSet;
use crate::frames::{Frame, PanScanRenderer};

/// An encode job: everything the backend needs besides the frames.
#[derive(Debug, Clone)]
pub struct EncodeJob {
    /// Output file path.
    pub output_path: PathBuf,

    /// Frame dimensions.
    pub size: Size,

    pub fps: u32,

    /// Frames the caller will supply.
    pub frame_count: u64,

    /// Final clip length in seconds.
    pub duration_secs: f64,

    /// Audio track muxed into the output.
    pub audio: Option<AudioInput>,
}

/// What a backend reports after a successful encode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeStats {
    pub frames_written: u64,
    pub bytes_written: u64,
}

/// Progress callback for video rendering.
pub type ProgressCallback = Box<dyn Fn(ExportProgress) + Send + Sync>;

/// Export progress report.
#[derive(Debug, Clone)]
pub struct ExportProgress {
    /// Current progress [0.0, 1.0].
    pub progress: f64,

    /// Frames handed to the encoder so far.
    pub frames_rendered: u64,

    /// Total frames to render.
    pub total_frames: u64,

    /// Estimated time remaining in seconds.
    pub eta_secs: f64,

    /// Current stage.
    pub stage: ExportStage,
}

/// Stages of the export process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStage {
    Preparing,
    Encoding,
    Finalizing,
    Complete,
    Failed,
}

/// Trait for encode backends.
pub trait EncodeBackend: Send {
    /// Consume `frames` in order and write `job.output_path`.
    fn encode(
        &mut self,
        job: &EncodeJob,
        frames: &mut dyn Iterator<Item = Frame>,
        progress: Option<&ProgressCallback>,
    ) -> NewsframeResult<EncodeStats>;

    /// Check if this backend is available on the system.
    fn is_available(&self) -> bool;

    /// Backend name.
    fn name(&self) -> &str;
}

/// Duration and frame count for a clip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timing {
    pub duration_secs: f64,
    pub frame_count: u64,
    pub has_audio: bool,
}

/// Decide clip timing before any frame is rendered.
///
/// When audio is present its measured length wins over the requested
/// duration, and the frame count follows from it.
pub fn resolve_timing(options: &VideoOptions) -> NewsframeResult<Timing> {
    if options.fps == 0 {
        return Err(NewsframeError::config("fps must be positive"));
    }

    let (duration_secs, has_audio) = match &options.audio {
        Some(audio) => (audio.duration_secs, true),
        None => (options.duration_secs, false),
    };
    if !duration_secs.is_finite() || duration_secs <= 0.0 {
        return Err(NewsframeError::config(format!(
            "{} duration must be positive, got {duration_secs}",
            if has_audio { "audio" } else { "requested" }
        )));
    }

    Ok(Timing {
        duration_secs,
        frame_count: frame_count(duration_secs, options.fps),
        has_audio,
    })
}

/// Streams frames into a backend and checks the artifact it leaves.
pub struct VideoAssembler<'a> {
    backend: &'a mut dyn EncodeBackend,
}

impl<'a> VideoAssembler<'a> {
    pub fn new(backend: &'a mut dyn EncodeBackend) -> Self {
        Self { backend }
    }

    /// Encode `frames` into `job.output_path`.
    pub fn assemble(
        &mut self,
        frames: &mut dyn Iterator<Item = Frame>,
        job: &EncodeJob,
        progress: Option<&ProgressCallback>,
    ) -> NewsframeResult<RenderResult> {
        if !self.backend.is_available() {
            return Err(NewsframeError::encoding(format!(
                "encoder backend '{}' is not available",
                self.backend.name()
            )));
        }
        if let Some(parent) = job.output_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        tracing::info!(
            backend = self.backend.name(),
            output = %job.output_path.display(),
            frames = job.frame_count,
            fps = job.fps,
            duration_secs = job.duration_secs,
            has_audio = job.audio.is_some(),
            "Encoding video"
        );

        let stats = match self.backend.encode(job, frames, progress) {
            Ok(stats) => stats,
            Err(e) => {
                report(progress, ExportStage::Failed, 0, job.frame_count);
                return Err(e);
            }
        };

        report(progress, ExportStage::Finalizing, stats.frames_written, job.frame_count);
        let written = std::fs::metadata(&job.output_path).map(|meta| meta.len()).unwrap_or(0);
        if written == 0 {
            report(progress, ExportStage::Failed, stats.frames_written, job.frame_count);
            return Err(NewsframeError::encoding(format!(
                "encoder produced no output at {}",
                job.output_path.display()
            )));
        }
        report(progress, ExportStage::Complete, stats.frames_written, job.frame_count);

        tracing::info!(
            output = %job.output_path.display(),
            frames = stats.frames_written,
            bytes = written,
            "Video written"
        );

        Ok(RenderResult {
            mode: RenderMode::Video,
            output: RenderOutput::Video {
                path: job.output_path.clone(),
            },
            size: job.size,
            duration_secs: Some(job.duration_secs),
            frame_count: Some(stats.frames_written),
            has_audio: job.audio.is_some(),
        })
    }
}

/// Render `request` as a pan-&-scan video at `output`.
pub fn render_video(
    request: &RenderRequest,
    fonts: &FontSet,
    config: &AppConfig,
    backend: &mut dyn EncodeBackend,
    output: &Path,
    progress: Option<ProgressCallback>,
) -> NewsframeResult<RenderResult> {
    let started = std::time::Instant::now();
    let timing = resolve_timing(&request.video)?;
    if let Some(audio) = &request.video.audio {
        if (audio.duration_secs - request.video.duration_secs).abs() > f64::EPSILON {
            tracing::info!(
                requested_secs = request.video.duration_secs,
                audio_secs = audio.duration_secs,
                "Using audio length as clip duration"
            );
        }
    }
    report(progress.as_ref(), ExportStage::Preparing, 0, timing.frame_count);

    let renderer = PanScanRenderer::new(request, fonts, config, timing.frame_count)?;
    let job = EncodeJob {
        output_path: output.to_path_buf(),
        size: renderer.output_size(),
        fps: request.video.fps,
        frame_count: renderer.frame_count(),
        duration_secs: timing.duration_secs,
        audio: request.video.audio.clone(),
    };

    let mut frames = renderer.frames();
    let result = VideoAssembler::new(backend).assemble(&mut frames, &job, progress.as_ref())?;
    tracing::info!(
        direction = %request.video.direction,
        elapsed_secs = started.elapsed().as_secs_f64(),
        "Video render finished"
    );
    Ok(result)
}

fn report(progress: Option<&ProgressCallback>, stage: ExportStage, done: u64, total: u64) {
    if let Some(cb) = progress {
        let fraction = match stage {
            ExportStage::Complete => 1.0,
            _ if total == 0 => 0.0,
            _ => done as f64 / total as f64,
        };
        cb(ExportProgress {
            progress: fraction,
            frames_rendered: done,
            total_frames: total,
            eta_secs: 0.0,
            stage,
        });
    }
}

/// Encodes through an `ffmpeg` child process fed raw RGBA frames on stdin.
pub struct FfmpegEncoder {
    config: EncoderConfig,
}

impl FfmpegEncoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    /// Full ffmpeg argument list for `job`.
    pub fn args(&self, job: &EncodeJob) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "-y".into(),
            "-hide_banner".into(),
            "-loglevel".into(),
            "error".into(),
            "-f".into(),
            "rawvideo".into(),
            "-pix_fmt".into(),
            "rgba".into(),
            "-s".into(),
            job.size.to_string(),
            "-r".into(),
            job.fps.to_string(),
            "-i".into(),
            "pipe:0".into(),
        ];
        if let Some(audio) = &job.audio {
            args.push("-i".into());
            args.push(audio.path.display().to_string());
        }

        args.extend(["-map".into(), "0:v:0".into()]);
        if job.audio.is_some() {
            args.extend(["-map".into(), "1:a:0".into()]);
        }
        args.extend(codec_args_for_config(&self.config, job.audio.is_some()));

        // Audio longer than the clip is cut here; shorter audio just ends.
        args.extend(["-t".into(), format!("{:.3}", job.duration_secs)]);
        args.push(job.output_path.display().to_string());
        args
    }
}

impl EncodeBackend for FfmpegEncoder {
    fn encode(
        &mut self,
        job: &EncodeJob,
        frames: &mut dyn Iterator<Item = Frame>,
        progress: Option<&ProgressCallback>,
    ) -> NewsframeResult<EncodeStats> {
        let args = self.args(job);
        tracing::debug!(args = ?args, "Running ffmpeg");

        let mut child = Command::new(&self.config.ffmpeg_bin)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| NewsframeError::encoding(format!("Failed to start ffmpeg: {e}")))?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| NewsframeError::encoding("Failed to capture ffmpeg stderr"))?;
        // Drain stderr concurrently to avoid ffmpeg blocking on a full stderr pipe.
        let stderr_task = std::thread::spawn(move || -> String {
            let mut reader = BufReader::new(stderr);
            let mut output = String::new();
            match reader.read_to_string(&mut output) {
                Ok(_) => output,
                Err(err) => format!("<failed to read ffmpeg stderr: {err}>"),
            }
        });

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| NewsframeError::encoding("Failed to open ffmpeg stdin"))?;

        let started = std::time::Instant::now();
        let mut stats = EncodeStats::default();
        let mut failure = None;
        for frame in frames {
            if frame.image.dimensions() != (job.size.width, job.size.height) {
                failure = Some(format!(
                    "frame {} is {}x{}, expected {}",
                    frame.index,
                    frame.image.width(),
                    frame.image.height(),
                    job.size
                ));
                break;
            }
            if let Err(e) = stdin.write_all(frame.image.as_raw()) {
                failure = Some(format!("writing frame {} failed: {e}", frame.index));
                break;
            }
            stats.frames_written += 1;
            stats.bytes_written += frame.image.as_raw().len() as u64;

            if let Some(cb) = progress {
                cb(progress_report(
                    stats.frames_written,
                    job.frame_count,
                    started.elapsed().as_secs_f64(),
                ));
            }
        }
        drop(stdin);

        if failure.is_some() {
            child.kill().ok();
        }
        let status = child
            .wait()
            .map_err(|e| NewsframeError::encoding(format!("Failed to wait on ffmpeg: {e}")))?;
        let stderr_output = stderr_task
            .join()
            .unwrap_or_else(|_| "<failed to join stderr reader>".to_string());

        if let Some(reason) = failure {
            return Err(NewsframeError::encoding(format!(
                "{reason}: {}",
                stderr_output.trim()
            )));
        }
        if !status.success() {
            return Err(NewsframeError::encoding(format!(
                "ffmpeg export failed (status {}): {}",
                status,
                stderr_output.trim()
            )));
        }

        tracing::debug!(
            frames = stats.frames_written,
            elapsed_secs = started.elapsed().as_secs_f64(),
            "ffmpeg finished"
        );
        Ok(stats)
    }

    fn is_available(&self) -> bool {
        command_exists(&self.config.ffmpeg_bin)
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

fn codec_args_for_config(config: &EncoderConfig, has_audio: bool) -> Vec<String> {
    let mut args = vec![
        "-c:v".to_string(),
        config.video_codec.clone(),
        "-preset".to_string(),
        config.preset.clone(),
        "-crf".to_string(),
        config.crf.to_string(),
        "-pix_fmt".to_string(),
        config.pixel_format.clone(),
    ];
    if has_audio {
        args.extend([
            "-c:a".to_string(),
            config.audio_codec.clone(),
            "-b:a".to_string(),
            format!("{}k", config.audio_bitrate_kbps.max(64)),
        ]);
    } else {
        args.push("-an".to_string());
    }
    args.extend(["-movflags".to_string(), "+faststart".to_string()]);
    args
}

pub(crate) fn command_exists(binary: &str) -> bool {
    Command::new("sh")
        .arg("-c")
        .arg(format!("command -v {binary} >/dev/null 2>&1"))
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

fn progress_report(frames_written: u64, total_frames: u64, elapsed_secs: f64) -> ExportProgress {
    let progress = if total_frames == 0 {
        0.0
    } else {
        (frames_written as f64 / total_frames as f64).clamp(0.0, 1.0)
    };
    let eta_secs = if progress > 0.0 {
        (elapsed_secs / progress) - elapsed_secs
    } else {
        0.0
    }
    .max(0.0);

    ExportProgress {
        progress,
        frames_rendered: frames_written,
        total_frames,
        eta_secs,
        stage: ExportStage::Encoding,
    }
}
