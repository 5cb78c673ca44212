use newsframe_model::geometry::{CropWindow, Size};
use newsframe_model::request::Direction;
use newsframe_processing_core::pan_scan::{frame_count, MotionPlan, PanScanConfig};

/// Sampled windows of a five-second, 30 fps clip over a 1920x1080 source.
const GOLDEN: &[(Direction, u64, [f64; 4])] = &[
    (Direction::LeftToRight, 0, [0.0, 0.0, 607.5, 1080.0]),
    (Direction::LeftToRight, 37, [202.6062, 0.0, 607.5, 1080.0]),
    (Direction::LeftToRight, 75, [662.8564, 0.0, 607.5, 1080.0]),
    (Direction::LeftToRight, 149, [1312.5, 0.0, 607.5, 1080.0]),
    (Direction::ZoomIn, 0, [656.25, 0.0, 607.5, 1080.0]),
    (Direction::ZoomIn, 37, [664.0648, 13.893, 591.8704, 1052.214]),
    (Direction::ZoomIn, 75, [681.8173, 45.453, 556.3654, 989.094]),
    (Direction::ZoomIn, 149, [706.875, 90.0, 506.25, 900.0]),
    (Direction::DiagonalTlBr, 0, [0.0, 0.0, 506.25, 900.0]),
    (Direction::DiagonalTlBr, 37, [218.2358, 27.786, 506.25, 900.0]),
    (Direction::DiagonalTlBr, 75, [713.9911, 90.906, 506.25, 900.0]),
    (Direction::DiagonalTlBr, 149, [1413.75, 180.0, 506.25, 900.0]),
];

fn assert_close(actual: CropWindow, expected: [f64; 4], context: &str) {
    let actual = [actual.x, actual.y, actual.width, actual.height];
    for (a, e) in actual.iter().zip(expected) {
        assert!((a - e).abs() < 1e-3, "{context}: got {actual:?}, want {expected:?}");
    }
}

#[test]
fn default_motion_plans_match_golden_windows() {
    let source = Size::new(1920, 1080);
    let frames = frame_count(5.0, 30);
    assert_eq!(frames, 150);

    for (direction, index, expected) in GOLDEN {
        let plan = MotionPlan::new(source, *direction, frames, &PanScanConfig::default())
            .expect("plan should build");
        assert_close(
            plan.window_at(*index),
            *expected,
            &format!("{direction} frame {index}"),
        );
    }
}

#[test]
fn every_direction_stays_inside_a_letterboxed_canvas() {
    // A 16:9 photo letterboxed into the 9:16 canvas.
    let canvas = Size::new(1080, 1920);
    for direction in Direction::ALL {
        let plan = MotionPlan::new(canvas, direction, 150, &PanScanConfig::default())
            .expect("plan should build");
        assert!(
            plan.windows().all(|window| window.is_within(canvas)),
            "{direction} leaves the canvas"
        );
        assert_ne!(plan.start, plan.end, "{direction} does not move");
    }
}
