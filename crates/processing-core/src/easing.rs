//! Easing curves for camera motion.

/// Cubic smoothstep: zero velocity at both ends.
pub fn smoothstep(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Linear progress of frame `index` in a clip of `count` frames, in `[0, 1]`.
///
/// The first frame is 0 and the last is 1. A single-frame clip stays at 0.
pub fn frame_progress(index: u64, count: u64) -> f64 {
    if count <= 1 {
        return 0.0;
    }
    (index.min(count - 1) as f64) / ((count - 1) as f64)
}
