//! Newsframe Render Engine
//!
//! Turns a render request into pixels and, for videos, an encoded file.
//!
//! # Pipeline Architecture
//!
//! ```text
//! source image ──┐
//!                ├── Crop / Letterbox (mode canvas)
//! ROI ───────────┘          │
//!                           ├── Overlay (watermark, logo, headline panels)
//! headline + fonts ─────────┘          │
//!                                      ├── image modes ──▶ RGBA buffer
//!                                      │
//!                                      └── Pan & Scan (eased windows)
//!                                                 │
//!                                                 ▼
//!                                       Encode (H.264 + AAC)
//!                                                 │
//!                                                 ▼
//!                                            output.mp4
//! ```

pub mod compositor;
pub mod export;
pub mod fonts;
pub mod frames;
pub mod overlay;
pub mod probe;

pub use compositor::ImageCompositor;
pub use export::*;
pub use fonts::{FontFace, FontPair, FontSet};
pub use frames::{Frame, PanScanRenderer};
