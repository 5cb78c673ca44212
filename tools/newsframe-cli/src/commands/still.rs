//! Render still images.

use std::path::PathBuf;

use newsframe_common::config::AppConfig;
use newsframe_model::geometry::NormalizedRoi;
use newsframe_model::request::{RenderMode, RenderRequest};
use newsframe_render_engine::{FontSet, ImageCompositor};

pub struct StillArgs {
    pub image: PathBuf,
    pub headline: String,
    pub highlight: String,
    pub logo: Option<PathBuf>,
    pub roi: Option<String>,
    pub formats: Vec<String>,
    pub output: Option<PathBuf>,
}

pub async fn run(config: AppConfig, args: StillArgs) -> anyhow::Result<()> {
    let modes = args
        .formats
        .iter()
        .map(|format| format.parse::<RenderMode>())
        .collect::<Result<Vec<_>, _>>()?;
    if let Some(mode) = modes.iter().find(|mode| !mode.is_image()) {
        anyhow::bail!("{mode} is not an image format; use `newsframe video`");
    }
    if modes.is_empty() {
        anyhow::bail!("No output format given");
    }
    let roi = args.roi.as_deref().map(str::parse::<NormalizedRoi>).transpose()?;

    let source = super::load_rgba(&args.image)?;
    let logo = super::load_logo(args.logo.as_deref())?;
    let dir = super::output_dir(args.output, &config.output_dir)?;
    let stem = super::output_stem(&args.image);

    let mut request = RenderRequest::new(args.headline, args.highlight, source, modes[0]);
    if let Some(logo) = logo {
        request = request.with_logo(logo);
    }
    if let Some(roi) = roi {
        request = request.with_roi(roi);
    }

    tracing::info!(
        image = %args.image.display(),
        modes = ?modes,
        "Rendering still images"
    );

    let results = tokio::task::spawn_blocking(move || {
        let fonts = FontSet::resolve(&config.fonts);
        ImageCompositor::new(&fonts, &config).compose_all(&request, &modes)
    })
    .await??;

    for result in results {
        let Some(image) = result.as_image() else {
            continue;
        };
        let suffix = match result.mode {
            RenderMode::Horizontal => "horizontal",
            RenderMode::Instagram => "instagram",
            RenderMode::Video => continue,
        };
        let path = dir.join(format!("{stem}_{suffix}.png"));
        image
            .save(&path)
            .map_err(|e| anyhow::anyhow!("Failed to write {}: {e}", path.display()))?;
        super::print_summary(&result.summary(), &path)?;
    }

    Ok(())
}
