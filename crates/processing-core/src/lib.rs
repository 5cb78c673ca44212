//! Newsframe Processing Core
//!
//! The geometry and typography behind every render:
//! - **Text Layout:** wrap a headline into centered lines without splitting
//!   words, styling the highlighted run in bold and accent color
//! - **ROI Cropping:** derive aspect-correct crop windows from an image
//! - **Pan & Scan:** plan eased crop-window motion for vertical videos
//!
//! This crate is pure computation: no I/O and no pixel buffers.
//! All inputs are data; all outputs are data.

pub mod easing;
pub mod pan_scan;
pub mod roi;
pub mod text_layout;

pub use pan_scan::{frame_count, MotionPlan, PanScanConfig};
pub use text_layout::{FontMetrics, TextLayout, TextLayoutEngine};
