//! Crop windows for a target aspect ratio.
//!
//! Without an explicit region the window is the largest centered box of the
//! target aspect that fits in the image; an image is never upsampled here.
//! An explicit normalized region is taken as-is, converted to whole pixels.

use newsframe_common::error::{NewsframeError, NewsframeResult};
use newsframe_model::geometry::{CropAnchor, CropWindow, NormalizedRoi, Size};

/// The crop window for `image` at `target_aspect` (width / height).
pub fn crop(
    image: Size,
    target_aspect: f64,
    explicit: Option<NormalizedRoi>,
) -> NewsframeResult<CropWindow> {
    if image.is_empty() {
        return Err(NewsframeError::degenerate_image(format!(
            "cannot crop an empty {image} image"
        )));
    }
    match explicit {
        Some(roi) => roi_to_pixels(image, roi),
        None => {
            if !(target_aspect.is_finite() && target_aspect > 0.0) {
                return Err(NewsframeError::invalid_roi(format!(
                    "target aspect must be positive, got {target_aspect}"
                )));
            }
            Ok(max_centered(image, target_aspect))
        }
    }
}

/// Largest centered window of `aspect` inside `image`.
pub fn max_centered(image: Size, aspect: f64) -> CropWindow {
    fit_aspect_within(CropWindow::full(image), aspect, CropAnchor::Center)
}

/// Largest box of `aspect` inside `window`, positioned by `anchor`.
pub fn fit_aspect_within(window: CropWindow, aspect: f64, anchor: CropAnchor) -> CropWindow {
    let (width, height) = if window.aspect() > aspect {
        (window.height * aspect, window.height)
    } else {
        (window.width, window.width / aspect)
    };

    let centered_x = window.x + (window.width - width) / 2.0;
    let (x, y) = match anchor {
        CropAnchor::Center => (centered_x, window.y + (window.height - height) / 2.0),
        CropAnchor::Top => (centered_x, window.y),
        CropAnchor::TopLeft => (window.x, window.y),
    };
    CropWindow::new(x, y, width, height)
}

/// Convert a normalized region to a whole-pixel window inside `image`.
pub fn roi_to_pixels(image: Size, roi: NormalizedRoi) -> NewsframeResult<CropWindow> {
    let components = [("x", roi.x), ("y", roi.y), ("w", roi.w), ("h", roi.h)];
    for (name, value) in components {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(NewsframeError::invalid_roi(format!(
                "{name} = {value} is outside [0, 1]"
            )));
        }
    }

    if roi.x + roi.w > 1.0 + 1e-9 || roi.y + roi.h > 1.0 + 1e-9 {
        return Err(NewsframeError::invalid_roi(format!(
            "region ({}, {}, {}, {}) extends past the image edge",
            roi.x, roi.y, roi.w, roi.h
        )));
    }

    // Round edges rather than extents so adjacent rounding cannot overflow.
    let (w, h) = (image.width as f64, image.height as f64);
    let left = (roi.x * w).round();
    let top = (roi.y * h).round();
    let right = ((roi.x + roi.w) * w).round().min(w);
    let bottom = ((roi.y + roi.h) * h).round().min(h);
    let window = CropWindow::new(left, top, right - left, bottom - top);

    if window.width <= 0.0 || window.height <= 0.0 {
        return Err(NewsframeError::invalid_roi(format!(
            "region {:.0}x{:.0} px has no area",
            window.width, window.height
        )));
    }
    if !window.is_within(image) {
        return Err(NewsframeError::invalid_roi(format!(
            "region ({:.0}, {:.0}, {:.0}, {:.0}) exceeds the {image} image",
            window.x, window.y, window.width, window.height
        )));
    }
    Ok(window)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const FOUR_FIVE: f64 = 4.0 / 5.0;

    #[test]
    fn test_full_roi_is_whole_image() {
        let size = Size::new(1280, 720);
        let window = crop(size, FOUR_FIVE, Some(NormalizedRoi::FULL)).unwrap();
        assert_eq!(window, CropWindow::full(size));
    }

    #[test]
    fn test_landscape_auto_crop() {
        let window = crop(Size::new(1920, 1080), FOUR_FIVE, None).unwrap();
        assert!((window.height - 1080.0).abs() < 1e-9);
        assert!((window.width - 864.0).abs() < 1e-9);
        assert!((window.x - 528.0).abs() < 1e-9);
        assert_eq!(window.y, 0.0);
    }

    #[test]
    fn test_portrait_auto_crop() {
        let window = crop(Size::new(1000, 2000), FOUR_FIVE, None).unwrap();
        assert_eq!(window.width, 1000.0);
        assert!((window.height - 1250.0).abs() < 1e-9);
        assert!((window.y - 375.0).abs() < 1e-9);
    }

    #[test]
    fn test_explicit_roi_in_pixels() {
        let window = crop(
            Size::new(1000, 500),
            FOUR_FIVE,
            Some(NormalizedRoi::new(0.1, 0.2, 0.5, 0.6)),
        )
        .unwrap();
        assert_eq!(window, CropWindow::new(100.0, 100.0, 500.0, 300.0));
    }

    #[test]
    fn test_invalid_rois() {
        let size = Size::new(100, 100);
        let cases = [
            NormalizedRoi::new(-0.1, 0.0, 0.5, 0.5),
            NormalizedRoi::new(0.0, 0.0, 1.2, 0.5),
            NormalizedRoi::new(0.6, 0.0, 0.5, 0.5),
            NormalizedRoi::new(0.0, 0.0, 0.0, 0.5),
            NormalizedRoi::new(0.0, 0.0, f64::NAN, 0.5),
        ];
        for roi in cases {
            let err = crop(size, FOUR_FIVE, Some(roi)).unwrap_err();
            assert!(matches!(err, NewsframeError::InvalidRoi { .. }), "{roi:?}");
        }
    }

    #[test]
    fn test_empty_image_rejected() {
        assert!(crop(Size::new(0, 10), FOUR_FIVE, None).is_err());
    }

    #[test]
    fn test_fit_within_anchors() {
        let window = CropWindow::new(10.0, 20.0, 400.0, 300.0);
        let center = fit_aspect_within(window, 1.0, CropAnchor::Center);
        assert_eq!(center, CropWindow::new(60.0, 20.0, 300.0, 300.0));

        let tall = CropWindow::new(0.0, 0.0, 100.0, 400.0);
        let top = fit_aspect_within(tall, 1.0, CropAnchor::Top);
        assert_eq!(top, CropWindow::new(0.0, 0.0, 100.0, 100.0));
        let center = fit_aspect_within(tall, 1.0, CropAnchor::Center);
        assert_eq!(center.y, 150.0);

        let top_left = fit_aspect_within(window, 1.0, CropAnchor::TopLeft);
        assert_eq!(top_left, CropWindow::new(10.0, 20.0, 300.0, 300.0));
    }

    proptest! {
        #[test]
        fn prop_auto_crop_fits_and_matches_aspect(
            w in 1u32..5000, h in 1u32..5000, aspect in 0.2f64..5.0,
        ) {
            let size = Size::new(w, h);
            let window = crop(size, aspect, None).unwrap();
            prop_assert!(window.is_within(size));
            prop_assert!((window.aspect() - aspect).abs() < 1e-6 * aspect.max(1.0));
            // One dimension is always fully used.
            prop_assert!(
                (window.width - w as f64).abs() < 1e-6 || (window.height - h as f64).abs() < 1e-6
            );
        }

        #[test]
        fn prop_valid_explicit_roi_is_in_bounds(
            w in 1u32..4000, h in 1u32..4000,
            x in 0.0f64..1.0, y in 0.0f64..1.0, fw in 0.0f64..1.0, fh in 0.0f64..1.0,
        ) {
            let size = Size::new(w, h);
            let roi = NormalizedRoi::new(x, y, fw * (1.0 - x), fh * (1.0 - y));
            if let Ok(window) = crop(size, FOUR_FIVE, Some(roi)) {
                prop_assert!(window.is_within(size));
            }
        }
    }
}
