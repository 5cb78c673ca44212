//! Still-image composition: mode canvas plus overlay.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use newsframe_common::config::AppConfig;
use newsframe_common::error::{NewsframeError, NewsframeResult};
use newsframe_model::geometry::{CropAnchor, Size};
use newsframe_model::request::{RenderMode, RenderRequest};
use newsframe_model::result::RenderResult;
use newsframe_model::style::Color;
use newsframe_processing_core::roi;

use crate::fonts::FontSet;
use crate::overlay::OverlayRenderer;

/// Composes still images for the image render modes.
pub struct ImageCompositor<'a> {
    fonts: &'a FontSet,
    config: &'a AppConfig,
}

impl<'a> ImageCompositor<'a> {
    pub fn new(fonts: &'a FontSet, config: &'a AppConfig) -> Self {
        Self { fonts, config }
    }

    /// Render `request` in its own mode.
    pub fn compose(&self, request: &RenderRequest) -> NewsframeResult<RenderResult> {
        self.compose_as(request, request.mode)
    }

    /// Render one request in several image modes.
    pub fn compose_all(
        &self,
        request: &RenderRequest,
        modes: &[RenderMode],
    ) -> NewsframeResult<Vec<RenderResult>> {
        modes
            .iter()
            .map(|mode| self.compose_as(request, *mode))
            .collect()
    }

    fn compose_as(&self, request: &RenderRequest, mode: RenderMode) -> NewsframeResult<RenderResult> {
        let started = std::time::Instant::now();
        let mut canvas = self.base_canvas(request, mode)?;
        let size = Size::new(canvas.width(), canvas.height());

        let overlay = OverlayRenderer::new(self.fonts, &self.config.brand).render(
            size,
            mode,
            &request.headline,
            &request.highlight,
            request.logo.as_ref(),
        )?;
        overlay.apply(&mut canvas);

        tracing::info!(
            mode = %mode,
            size = %size,
            lines = overlay.layout.lines.len(),
            elapsed_ms = started.elapsed().as_millis(),
            "Image composed"
        );
        Ok(RenderResult::image(mode, canvas))
    }

    /// The mode canvas before any overlay.
    pub fn base_canvas(&self, request: &RenderRequest, mode: RenderMode) -> NewsframeResult<RgbaImage> {
        let source = request.image_size();
        if source.is_empty() {
            return Err(NewsframeError::degenerate_image(format!(
                "source image {source} has no pixels"
            )));
        }
        let settings = &self.config.render;
        let fill: Rgba<u8> = Color::from(settings.letterbox_color).into();

        match mode {
            RenderMode::Horizontal => Ok(pad_to_min(
                &request.image,
                Size::new(settings.min_canvas_width, settings.min_canvas_height),
                fill,
            )),
            RenderMode::Instagram => {
                let target = Size::new(settings.instagram_width, settings.instagram_height);
                let window = roi::crop(source, target.aspect(), request.roi)?;
                // An explicit region of any shape still yields an exact crop.
                let window = roi::fit_aspect_within(window, target.aspect(), CropAnchor::Center);
                let rect = window.to_pixel_rect(source);
                let cropped =
                    imageops::crop_imm(&request.image, rect.x, rect.y, rect.width, rect.height)
                        .to_image();
                Ok(imageops::resize(
                    &cropped,
                    target.width,
                    target.height,
                    FilterType::Lanczos3,
                ))
            }
            RenderMode::Video => Err(NewsframeError::unsupported(
                "video-9:16 renders through the video assembler, not the image compositor",
            )),
        }
    }
}

/// Center `image` on a `canvas` filled with `fill`, scaled to fit with its
/// aspect ratio preserved.
pub fn letterbox(image: &RgbaImage, canvas: Size, fill: Rgba<u8>) -> RgbaImage {
    let (w, h) = (image.width().max(1) as f64, image.height().max(1) as f64);
    let scale = letterbox_scale(Size::new(image.width(), image.height()), canvas);
    let fit_w = ((w * scale).round() as u32).clamp(1, canvas.width.max(1));
    let fit_h = ((h * scale).round() as u32).clamp(1, canvas.height.max(1));

    let resized = if (fit_w, fit_h) == image.dimensions() {
        image.clone()
    } else {
        imageops::resize(image, fit_w, fit_h, FilterType::Lanczos3)
    };

    let mut out = RgbaImage::from_pixel(canvas.width, canvas.height, fill);
    let x = (canvas.width - fit_w) / 2;
    let y = (canvas.height - fit_h) / 2;
    imageops::overlay(&mut out, &resized, x as i64, y as i64);
    out
}

/// Scale factor `letterbox` applies to fit `image` inside `canvas`.
pub fn letterbox_scale(image: Size, canvas: Size) -> f64 {
    let (w, h) = (image.width.max(1) as f64, image.height.max(1) as f64);
    (canvas.width as f64 / w).min(canvas.height as f64 / h)
}

/// Pad `image` with `fill` up to at least `min` without scaling it.
pub fn pad_to_min(image: &RgbaImage, min: Size, fill: Rgba<u8>) -> RgbaImage {
    let width = image.width().max(min.width);
    let height = image.height().max(min.height);
    if (width, height) == image.dimensions() {
        return image.clone();
    }

    let mut out = RgbaImage::from_pixel(width, height, fill);
    let x = (width - image.width()) / 2;
    let y = (height - image.height()) / 2;
    imageops::overlay(&mut out, image, x as i64, y as i64);
    out
}
