//! Show media information.

use std::path::PathBuf;

use newsframe_common::config::AppConfig;
use newsframe_render_engine::probe::Prober;

pub fn run(config: &AppConfig, media: PathBuf) -> anyhow::Result<()> {
    let info = Prober::new(config.encoder.ffprobe_bin.clone()).probe(&media)?;
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}
