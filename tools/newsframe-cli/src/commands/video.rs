//! Render a pan-and-scan video.

use std::io::Write;
use std::path::PathBuf;

use newsframe_common::config::AppConfig;
use newsframe_model::request::{AudioInput, Direction, RenderMode, RenderRequest, VideoOptions};
use newsframe_render_engine::export::{render_video, ExportProgress, FfmpegEncoder, ProgressCallback};
use newsframe_render_engine::probe::Prober;
use newsframe_render_engine::FontSet;

/// Accepted requested durations, in seconds.
const DURATION_RANGE: std::ops::RangeInclusive<f64> = 1.0..=30.0;

pub struct VideoArgs {
    pub image: PathBuf,
    pub headline: String,
    pub highlight: String,
    pub logo: Option<PathBuf>,
    pub direction: String,
    pub duration: f64,
    pub fps: u32,
    pub keep_aspect: bool,
    pub audio: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

pub async fn run(config: AppConfig, args: VideoArgs) -> anyhow::Result<()> {
    let direction: Direction = args.direction.parse()?;
    if !DURATION_RANGE.contains(&args.duration) {
        anyhow::bail!(
            "Duration must be between {} and {} seconds, got {}",
            DURATION_RANGE.start(),
            DURATION_RANGE.end(),
            args.duration
        );
    }
    if args.fps == 0 {
        anyhow::bail!("FPS must be positive");
    }

    // Audio is measured before anything is rendered; its length sets the
    // frame count.
    let audio = match args.audio {
        Some(path) => {
            let duration_secs = Prober::new(config.encoder.ffprobe_bin.clone()).duration(&path)?;
            tracing::info!(audio = %path.display(), duration_secs, "Audio measured");
            Some(AudioInput {
                path,
                duration_secs,
            })
        }
        None => None,
    };

    let source = super::load_rgba(&args.image)?;
    let logo = super::load_logo(args.logo.as_deref())?;
    let output = match args.output {
        Some(path) => path,
        None => super::output_dir(None, &config.output_dir)?.join(format!(
            "{}_{}.mp4",
            super::output_stem(&args.image),
            direction
        )),
    };

    let mut request = RenderRequest::new(args.headline, args.highlight, source, RenderMode::Video)
        .with_video(VideoOptions {
            direction,
            duration_secs: args.duration,
            fps: args.fps,
            keep_aspect: args.keep_aspect,
            audio,
        });
    if let Some(logo) = logo {
        request = request.with_logo(logo);
    }

    eprintln!("Rendering video: {}", output.display());
    eprintln!("  Direction: {direction}");
    eprintln!("  FPS: {}", args.fps);

    // Progress goes to stderr so stdout carries only the JSON summary.
    let progress_cb: ProgressCallback = Box::new(|p: ExportProgress| {
        write_progress(&mut std::io::stderr().lock(), &p).ok();
    });

    let target = output.clone();
    let result = tokio::task::spawn_blocking(move || {
        let fonts = FontSet::resolve(&config.fonts);
        let mut encoder = FfmpegEncoder::new(config.encoder.clone());
        render_video(
            &request,
            &fonts,
            &config,
            &mut encoder,
            &target,
            Some(progress_cb),
        )
    })
    .await?;
    eprintln!();

    let result = result?;
    super::print_summary(&result.summary(), &output)?;
    Ok(())
}

/// Redraw the single progress line on `out`.
fn write_progress(out: &mut impl Write, p: &ExportProgress) -> std::io::Result<()> {
    write!(
        out,
        "\r  Progress: {:.1}% ({}/{} frames, ETA: {:.0}s)  ",
        p.progress * 100.0,
        p.frames_rendered,
        p.total_frames,
        p.eta_secs,
    )?;
    out.flush()
}
