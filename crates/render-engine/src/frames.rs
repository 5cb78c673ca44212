//! Pan-&-scan frame production.
//!
//! The working image and the overlay are prepared once; each frame is then a
//! pure function of its index: sample the eased crop window onto the output
//! canvas with a projective warp (sub-pixel accurate, bilinear) and composite
//! the overlay. Frames are rendered in parallel batches and always yielded in
//! ascending index order.

use std::collections::VecDeque;

use image::{Rgba, RgbaImage};
use imageproc::geometric_transformations::{warp_into, Interpolation, Projection};
use newsframe_common::config::AppConfig;
use newsframe_common::error::{NewsframeError, NewsframeResult};
use newsframe_model::geometry::{CropWindow, Size};
use newsframe_model::request::{RenderMode, RenderRequest};
use newsframe_model::style::Color;
use newsframe_processing_core::pan_scan::{MotionPlan, PanScanConfig};
use rayon::prelude::*;

use crate::compositor::{letterbox, letterbox_scale};
use crate::fonts::FontSet;
use crate::overlay::{Overlay, OverlayRenderer};

/// One rendered video frame.
#[derive(Debug, Clone)]
pub struct Frame {
    pub index: u64,
    pub window: CropWindow,
    pub image: RgbaImage,
}

/// Renders the frames of one pan-&-scan clip.
pub struct PanScanRenderer {
    working: RgbaImage,
    overlay: Overlay,
    plan: MotionPlan,
    output: Size,
    batch_size: usize,
}

impl PanScanRenderer {
    /// Prepare a renderer for `frame_count` frames of `request`.
    pub fn new(
        request: &RenderRequest,
        fonts: &FontSet,
        config: &AppConfig,
        frame_count: u64,
    ) -> NewsframeResult<Self> {
        let source = request.image_size();
        if source.is_empty() {
            return Err(NewsframeError::degenerate_image(format!(
                "source image {source} has no pixels"
            )));
        }
        let settings = &config.render;
        let pan_config = PanScanConfig::from(settings);
        let output = pan_config.output;

        let keep_aspect = request.video.keep_aspect;
        // A letterboxed canvas always has the output size.
        let working_size = if keep_aspect { output } else { source };
        let plan = MotionPlan::new(working_size, request.video.direction, frame_count, &pan_config)?;

        if keep_aspect {
            let upscale = letterbox_scale(source, output) * plan.max_upscale_required(output);
            if upscale > pan_config.max_upscale {
                return Err(NewsframeError::degenerate_image(format!(
                    "source {source} needs {upscale:.2}x upscaling to fill {output} (limit {:.2}x)",
                    pan_config.max_upscale
                )));
            }
        }

        let working = if keep_aspect {
            let fill: Rgba<u8> = Color::from(settings.letterbox_color).into();
            letterbox(&request.image, output, fill)
        } else {
            request.image.clone()
        };

        let overlay = OverlayRenderer::new(fonts, &config.brand).render(
            output,
            RenderMode::Video,
            &request.headline,
            &request.highlight,
            request.logo.as_ref(),
        )?;

        tracing::debug!(
            working = %working_size,
            keep_aspect,
            frames = plan.frame_count,
            "Pan-scan renderer ready"
        );

        Ok(Self {
            working,
            overlay,
            plan,
            output,
            batch_size: settings.frame_batch_size.max(1),
        })
    }

    pub fn plan(&self) -> &MotionPlan {
        &self.plan
    }

    pub fn output_size(&self) -> Size {
        self.output
    }

    pub fn frame_count(&self) -> u64 {
        self.plan.frame_count
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    /// Render frame `index`.
    pub fn render_frame(&self, index: u64) -> Frame {
        let window = self.plan.window_at(index);
        let sx = self.output.width as f32 / window.width as f32;
        let sy = self.output.height as f32 / window.height as f32;
        let projection = Projection::scale(sx, sy)
            * Projection::translate(-window.x as f32, -window.y as f32);

        let mut image = RgbaImage::new(self.output.width, self.output.height);
        warp_into(
            &self.working,
            &projection,
            Interpolation::Bilinear,
            Rgba([0, 0, 0, 255]),
            &mut image,
        );
        self.overlay.apply(&mut image);

        Frame {
            index,
            window,
            image,
        }
    }

    /// Render frames `start..end` in parallel, in index order.
    pub fn render_batch(&self, start: u64, end: u64) -> Vec<Frame> {
        let end = end.min(self.plan.frame_count).max(start);
        (start as usize..end as usize)
            .into_par_iter()
            .map(|index| self.render_frame(index as u64))
            .collect()
    }

    /// Lazy, one-shot iterator over every frame.
    pub fn frames(&self) -> Frames<'_> {
        Frames {
            renderer: self,
            next: 0,
            buffer: VecDeque::new(),
        }
    }
}

/// Frame iterator that fills itself one parallel batch at a time.
pub struct Frames<'a> {
    renderer: &'a PanScanRenderer,
    next: u64,
    buffer: VecDeque<Frame>,
}

impl Iterator for Frames<'_> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        if self.buffer.is_empty() {
            let total = self.renderer.plan.frame_count;
            if self.next >= total {
                return None;
            }
            let end = (self.next + self.renderer.batch_size as u64).min(total);
            self.buffer.extend(self.renderer.render_batch(self.next, end));
            self.next = end;
        }
        self.buffer.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.renderer.plan.frame_count - self.next) as usize + self.buffer.len();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Frames<'_> {}
