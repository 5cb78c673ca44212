pub mod check;
pub mod probe;
pub mod still;
pub mod video;

use std::path::{Path, PathBuf};

use image::RgbaImage;
use newsframe_model::result::RenderSummary;

/// Decode an image file into RGBA pixels.
pub(crate) fn load_rgba(path: &Path) -> anyhow::Result<RgbaImage> {
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }
    let decoded = image::open(path)
        .map_err(|e| anyhow::anyhow!("Failed to decode {}: {e}", path.display()))?;
    Ok(decoded.to_rgba8())
}

pub(crate) fn load_logo(path: Option<&Path>) -> anyhow::Result<Option<RgbaImage>> {
    path.map(load_rgba).transpose()
}

/// File stem used to name outputs.
pub(crate) fn output_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "newsframe".to_string())
}

pub(crate) fn output_dir(explicit: Option<PathBuf>, default: &Path) -> anyhow::Result<PathBuf> {
    let dir = explicit.unwrap_or_else(|| default.to_path_buf());
    std::fs::create_dir_all(&dir)
        .map_err(|e| anyhow::anyhow!("Failed to create {}: {e}", dir.display()))?;
    Ok(dir)
}

/// Print a render summary as one JSON object with a timestamp.
pub(crate) fn print_summary(summary: &RenderSummary, path: &Path) -> anyhow::Result<()> {
    let mut value = serde_json::to_value(summary)?;
    if let Some(object) = value.as_object_mut() {
        object.insert("success".into(), true.into());
        object.insert("path".into(), path.display().to_string().into());
        object.insert("timestamp".into(), chrono::Utc::now().to_rfc3339().into());
    }
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
