//! Rotation to segment mapping.
//!
//! Angles follow screen conventions: y grows downward, so increasing angles
//! run clockwise and the pointer at 12 o'clock sits at `-PI/2`.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Angular width of one wedge on a wheel with `count` items
#[inline]
pub fn segment_angle(count: usize) -> f64 {
    TAU / count as f64
}

/// Reduce any rotation into `[0, 2PI)`.
#[inline]
pub fn normalize(rotation: f64) -> f64 {
    let n = ((rotation % TAU) + TAU) % TAU;
    // (-tiny % TAU) + TAU can round up to exactly TAU
    if n >= TAU {
        0.0
    } else {
        n
    }
}

/// Index of the item under the fixed top pointer after the wheel has turned
/// by `rotation` radians. Always in `[0, count)`; `count` must be non-zero.
pub fn select_index(rotation: f64, count: usize) -> usize {
    debug_assert!(count > 0);
    let normalized = normalize(rotation);
    let pointer = ((PI * 3.0 / 2.0 - normalized) + TAU) % TAU;
    let index = (pointer / segment_angle(count)).floor();
    if index.is_finite() && index >= 0.0 {
        index as usize % count
    } else {
        0
    }
}

/// Item under the pointer, `None` for an empty wheel.
pub fn selected_item<T>(rotation: f64, items: &[T]) -> Option<&T> {
    if items.is_empty() {
        return None;
    }
    items.get(select_index(rotation, items.len()))
}

/// Index of the wedge drawn at screen angle `screen_angle` for a wheel turned
/// by `rotation`.
///
/// Derived from [`select_index`] by treating the queried direction as the
/// pointer, so the wedge painted under the pointer is always the item that
/// gets selected.
pub fn segment_at(screen_angle: f64, rotation: f64, count: usize) -> usize {
    select_index(rotation - (screen_angle + FRAC_PI_2), count)
}

/// Screen angle where wedge `index` starts when the wheel is at rest at
/// `rotation`. The wedge spans `[start, start + segment_angle)` clockwise.
pub fn segment_start(index: usize, rotation: f64, count: usize) -> f64 {
    index as f64 * segment_angle(count) + rotation
}

/// Screen angle through the middle of wedge `index`, used to place labels.
pub fn segment_mid(index: usize, rotation: f64, count: usize) -> f64 {
    segment_start(index, rotation, count) + segment_angle(count) / 2.0
}

/// Zero-based boundary counter used for tick detection.
#[inline]
pub fn crossed_segment(rotation: f64, count: usize) -> i64 {
    (rotation / segment_angle(count)).floor() as i64
}
