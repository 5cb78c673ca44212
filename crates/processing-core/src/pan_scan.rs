//! Pan-&-scan motion planning for vertical videos.
//!
//! A motion plan is a start and an end crop window over the working image,
//! interpolated with smoothstep easing across the clip. Every window keeps
//! the output aspect, so frames are produced by a plain resample of the
//! window to the output canvas.
//!
//! # Windows per direction
//!
//! - **Axis pans:** a fixed-size window slides across the whole available
//!   range of its axis. When the image offers too little travel (the source
//!   already has the output aspect) the window is shrunk by the pan margin
//!   first so the motion stays visible.
//! - **Zoom:** the full-fit window and the same window shrunk about its
//!   center by the zoom factor.
//! - **Diagonals:** a window shrunk by the diagonal margin travels between
//!   opposite corners.

use newsframe_common::config::RenderSettings;
use newsframe_common::error::{NewsframeError, NewsframeResult};
use newsframe_model::geometry::{CropWindow, Size};
use newsframe_model::request::Direction;
use serde::{Deserialize, Serialize};

use crate::easing::{frame_progress, smoothstep};
use crate::roi::max_centered;

/// Motion tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanScanConfig {
    /// Output canvas; the window aspect follows it.
    pub output: Size,

    /// Linear magnification reached by zoom motions.
    pub zoom_factor: f64,

    /// Window shrink for horizontal and vertical pans that lack travel.
    pub axis_pan_margin: f64,

    /// Window shrink for diagonal pans.
    pub diagonal_pan_margin: f64,

    /// Largest output-pixels-per-source-pixel ratio accepted.
    pub max_upscale: f64,
}

impl Default for PanScanConfig {
    fn default() -> Self {
        Self {
            output: Size::new(1080, 1920),
            zoom_factor: 1.2,
            axis_pan_margin: 1.25,
            diagonal_pan_margin: 1.20,
            max_upscale: 4.0,
        }
    }
}

impl From<&RenderSettings> for PanScanConfig {
    fn from(settings: &RenderSettings) -> Self {
        Self {
            output: Size::new(settings.video_width, settings.video_height),
            zoom_factor: settings.zoom_factor,
            axis_pan_margin: settings.axis_pan_margin,
            diagonal_pan_margin: settings.diagonal_pan_margin,
            max_upscale: settings.max_upscale,
        }
    }
}

/// Number of frames for a clip: `round(duration * fps)`, at least one.
pub fn frame_count(duration_secs: f64, fps: u32) -> u64 {
    let frames = (duration_secs * fps as f64).round();
    if frames.is_finite() && frames >= 1.0 {
        frames as u64
    } else {
        1
    }
}

/// Start and end windows for one clip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionPlan {
    pub direction: Direction,
    pub working: Size,
    pub start: CropWindow,
    pub end: CropWindow,
    pub frame_count: u64,
}

impl MotionPlan {
    /// Plan `direction` over a `working` image.
    pub fn new(
        working: Size,
        direction: Direction,
        frame_count: u64,
        config: &PanScanConfig,
    ) -> NewsframeResult<Self> {
        if working.is_empty() {
            return Err(NewsframeError::degenerate_image(format!(
                "working image {working} has no pixels"
            )));
        }
        if config.output.is_empty() {
            return Err(NewsframeError::config(format!(
                "output canvas {} has no pixels",
                config.output
            )));
        }

        let full = max_centered(working, config.output.aspect());
        let (start, end) = match direction {
            Direction::ZoomIn => (full, full.shrunk_about_center(config.zoom_factor)),
            Direction::ZoomOut => (full.shrunk_about_center(config.zoom_factor), full),
            Direction::LeftToRight | Direction::RightToLeft => {
                let travel = working.width as f64 - full.width;
                let window = shrink_if_static(full, travel, full.width, config.axis_pan_margin);
                let y = (working.height as f64 - window.height) / 2.0;
                let right = working.width as f64 - window.width;
                let left_edge = CropWindow::new(0.0, y, window.width, window.height);
                let right_edge = CropWindow::new(right, y, window.width, window.height);
                if direction == Direction::LeftToRight {
                    (left_edge, right_edge)
                } else {
                    (right_edge, left_edge)
                }
            }
            Direction::TopToBottom | Direction::BottomToTop => {
                let travel = working.height as f64 - full.height;
                let window = shrink_if_static(full, travel, full.height, config.axis_pan_margin);
                let x = (working.width as f64 - window.width) / 2.0;
                let bottom = working.height as f64 - window.height;
                let top_edge = CropWindow::new(x, 0.0, window.width, window.height);
                let bottom_edge = CropWindow::new(x, bottom, window.width, window.height);
                if direction == Direction::TopToBottom {
                    (top_edge, bottom_edge)
                } else {
                    (bottom_edge, top_edge)
                }
            }
            Direction::DiagonalTlBr | Direction::DiagonalTrBl => {
                // The full-fit window spans one axis entirely, so a diagonal
                // always needs the smaller window.
                let window = full.shrunk_about_center(config.diagonal_pan_margin);
                let right = working.width as f64 - window.width;
                let bottom = working.height as f64 - window.height;
                let (w, h) = (window.width, window.height);
                if direction == Direction::DiagonalTlBr {
                    (
                        CropWindow::new(0.0, 0.0, w, h),
                        CropWindow::new(right, bottom, w, h),
                    )
                } else {
                    (
                        CropWindow::new(right, 0.0, w, h),
                        CropWindow::new(0.0, bottom, w, h),
                    )
                }
            }
        };

        let plan = Self {
            direction,
            working,
            start,
            end,
            frame_count: frame_count.max(1),
        };

        let upscale = plan.max_upscale_required(config.output);
        if upscale > config.max_upscale {
            return Err(NewsframeError::degenerate_image(format!(
                "{direction} over a {working} image needs {upscale:.1}x upscaling to fill {} (limit {:.1}x)",
                config.output, config.max_upscale
            )));
        }

        tracing::debug!(
            direction = %direction,
            working = %working,
            frames = plan.frame_count,
            start_w = plan.start.width,
            end_w = plan.end.width,
            "Motion planned"
        );
        Ok(plan)
    }

    /// Eased interpolation parameter for frame `index`.
    pub fn progress(&self, index: u64) -> f64 {
        smoothstep(frame_progress(index, self.frame_count))
    }

    /// The crop window of frame `index`.
    pub fn window_at(&self, index: u64) -> CropWindow {
        CropWindow::lerp(&self.start, &self.end, self.progress(index))
    }

    /// Every window in frame order.
    pub fn windows(&self) -> impl ExactSizeIterator<Item = CropWindow> + '_ {
        (0..self.frame_count as usize).map(move |index| self.window_at(index as u64))
    }

    /// Output pixels per source pixel at the smallest window.
    pub fn max_upscale_required(&self, output: Size) -> f64 {
        let smallest = self.start.width.min(self.end.width);
        if smallest <= 0.0 {
            return f64::INFINITY;
        }
        output.width as f64 / smallest
    }
}

/// Shrink `window` by `margin` when the available `travel` is less than the
/// shrunk window would offer.
fn shrink_if_static(window: CropWindow, travel: f64, extent: f64, margin: f64) -> CropWindow {
    let min_travel = extent - extent / margin;
    if travel >= min_travel {
        window
    } else {
        window.shrunk_about_center(margin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn plan(working: Size, direction: Direction) -> MotionPlan {
        MotionPlan::new(working, direction, 150, &PanScanConfig::default()).unwrap()
    }

    #[test]
    fn test_frame_count() {
        assert_eq!(frame_count(5.0, 30), 150);
        assert_eq!(frame_count(23.11, 30), 693);
        assert_eq!(frame_count(0.001, 30), 1);
        assert_eq!(frame_count(f64::NAN, 30), 1);
    }

    #[test]
    fn test_zoom_in_shrinks_monotonically() {
        let plan = plan(Size::new(1080, 1920), Direction::ZoomIn);
        assert_eq!(plan.window_at(0), CropWindow::full(Size::new(1080, 1920)));
        assert!((plan.window_at(149).width - 900.0).abs() < 1e-9);

        let widths: Vec<f64> = plan.windows().map(|w| w.width).collect();
        assert_eq!(widths.len(), 150);
        assert!(widths.windows(2).all(|pair| pair[1] < pair[0]));

        // Zoom is about the center.
        let (cx, cy) = plan.window_at(75).center();
        assert!((cx - 540.0).abs() < 1e-9 && (cy - 960.0).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_out_is_reverse_of_zoom_in() {
        let size = Size::new(1600, 1200);
        let zin = plan(size, Direction::ZoomIn);
        let zout = plan(size, Direction::ZoomOut);
        assert_eq!(zin.start, zout.end);
        assert_eq!(zin.end, zout.start);
    }

    #[test]
    fn test_horizontal_pan_on_landscape_uses_full_range() {
        let size = Size::new(1920, 1080);
        let plan = plan(size, Direction::LeftToRight);
        assert!((plan.start.height - 1080.0).abs() < 1e-9);
        assert_eq!(plan.start.x, 0.0);
        assert!((plan.end.right() - 1920.0).abs() < 1e-9);
        for window in plan.windows() {
            assert_eq!(window.width, plan.start.width);
            assert_eq!(window.y, plan.start.y);
        }

        let back = MotionPlan::new(size, Direction::RightToLeft, 150, &PanScanConfig::default())
            .unwrap();
        assert_eq!(back.start, plan.end);
        assert_eq!(back.end, plan.start);
    }

    #[test]
    fn test_pan_without_travel_shrinks_window() {
        // Already 9:16: no horizontal slack at full fit.
        let size = Size::new(1080, 1920);
        let plan = plan(size, Direction::LeftToRight);
        assert!((plan.start.width - 1080.0 / 1.25).abs() < 1e-9);
        assert!(plan.end.x > plan.start.x);
        assert!((plan.end.right() - 1080.0).abs() < 1e-9);
    }

    #[test]
    fn test_vertical_pan_directions() {
        let size = Size::new(1080, 1920);
        let down = plan(size, Direction::TopToBottom);
        assert_eq!(down.start.y, 0.0);
        assert!((down.end.bottom() - 1920.0).abs() < 1e-9);
        assert_eq!(down.start.x, down.end.x);

        let up = plan(size, Direction::BottomToTop);
        assert_eq!(up.start, down.end);
    }

    #[test]
    fn test_diagonals_travel_between_corners() {
        let size = Size::new(1920, 1080);
        let tlbr = plan(size, Direction::DiagonalTlBr);
        assert_eq!((tlbr.start.x, tlbr.start.y), (0.0, 0.0));
        assert!((tlbr.end.right() - 1920.0).abs() < 1e-9);
        assert!((tlbr.end.bottom() - 1080.0).abs() < 1e-9);

        let trbl = plan(size, Direction::DiagonalTrBl);
        assert!((trbl.start.right() - 1920.0).abs() < 1e-9);
        assert_eq!(trbl.start.y, 0.0);
        assert_eq!(trbl.end.x, 0.0);
    }

    #[test]
    fn test_eased_motion_is_slow_at_the_ends() {
        let plan = plan(Size::new(1920, 1080), Direction::LeftToRight);
        let first_step = plan.window_at(1).x - plan.window_at(0).x;
        let mid_step = plan.window_at(75).x - plan.window_at(74).x;
        assert!(first_step < mid_step / 10.0);
    }

    #[test]
    fn test_single_frame_uses_start() {
        let plan =
            MotionPlan::new(Size::new(800, 600), Direction::ZoomIn, 1, &PanScanConfig::default())
                .unwrap();
        assert_eq!(plan.window_at(0), plan.start);
        assert_eq!(plan.windows().len(), 1);
    }

    #[test]
    fn test_tiny_image_is_degenerate() {
        let err = MotionPlan::new(
            Size::new(64, 64),
            Direction::ZoomIn,
            30,
            &PanScanConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, NewsframeError::DegenerateImage { .. }));

        let err = MotionPlan::new(Size::new(0, 64), Direction::ZoomIn, 30, &PanScanConfig::default())
            .unwrap_err();
        assert!(matches!(err, NewsframeError::DegenerateImage { .. }));
    }

    proptest! {
        #[test]
        fn prop_every_window_in_bounds(
            w in 300u32..4000,
            h in 300u32..4000,
            direction_index in 0usize..8,
            frames in 1u64..90,
        ) {
            let size = Size::new(w, h);
            let config = PanScanConfig { max_upscale: f64::INFINITY, ..Default::default() };
            let plan = MotionPlan::new(size, Direction::ALL[direction_index], frames, &config).unwrap();
            let aspect = config.output.aspect();
            for window in plan.windows() {
                prop_assert!(window.is_within(size), "{:?} outside {}", window, size);
                prop_assert!((window.aspect() - aspect).abs() < 1e-6);
            }
        }
    }
}
