//! Newsframe Render Model
//!
//! Defines the data contracts between the caller and the rendering core:
//! - **Geometry:** image sizes, pixel-space crop windows, normalized ROIs
//! - **Style:** RGBA colors
//! - **Request:** what to render (mode, headline, highlight, video options)
//! - **Result:** what was rendered (buffer or file, dimensions, duration)
//!
//! Crop windows live in source-pixel space with sub-pixel precision so
//! pan-&-scan motion can be interpolated smoothly between frames.

pub mod geometry;
pub mod request;
pub mod result;
pub mod style;

pub use geometry::*;
pub use request::*;
pub use result::*;
pub use style::*;
