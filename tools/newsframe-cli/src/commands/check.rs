//! Check encoder and font setup.

use std::path::Path;

use newsframe_common::config::{config_file_path, AppConfig};
use newsframe_render_engine::export::{EncodeBackend, FfmpegEncoder};
use newsframe_render_engine::probe::Prober;
use newsframe_render_engine::FontSet;

pub fn run(config: &AppConfig, config_path: Option<&Path>, init: bool) -> anyhow::Result<()> {
    println!("Newsframe System Check");
    println!("{}", "=".repeat(50));

    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(config_file_path);
    if path.exists() {
        println!("[OK] Config: {}", path.display());
    } else if init {
        config.save_to(&path)?;
        println!("[OK] Config: wrote defaults to {}", path.display());
    } else {
        println!("[--] Config: defaults ({} not found)", path.display());
    }

    let encoder = FfmpegEncoder::new(config.encoder.clone());
    let ffmpeg_ok = encoder.is_available();
    let ffprobe_ok = Prober::new(config.encoder.ffprobe_bin.clone()).is_available();
    println!(
        "[{}] Encoder: {}",
        if ffmpeg_ok { "OK" } else { "MISSING" },
        config.encoder.ffmpeg_bin
    );
    println!(
        "[{}] Probe: {}",
        if ffprobe_ok { "OK" } else { "MISSING" },
        config.encoder.ffprobe_bin
    );

    let fonts = FontSet::resolve(&config.fonts);
    let font_status = if fonts.is_builtin() { "WARN" } else { "OK" };
    println!("[{font_status}] Regular font: {}", fonts.regular_source());
    println!("[{font_status}] Bold font: {}", fonts.bold_source());

    println!();
    if ffmpeg_ok && ffprobe_ok {
        println!("Images and videos can be rendered.");
    } else {
        println!("Images can be rendered; install ffmpeg to render videos.");
    }

    Ok(())
}
