/// Width/height of a terminal character cell, roughly
pub const CELL_ASPECT: f64 = 2.0;

/// Convert polar coordinates to cartesian grid coordinates.
/// `cx`, `cy`: center point; `angle`: radians; `radius`: distance from center.
/// `aspect` stretches x so circles stay round on non-square cells.
#[inline]
pub fn polar_to_grid(cx: f64, cy: f64, angle: f64, radius: f64, aspect: f64) -> (f64, f64) {
    (cx + angle.cos() * radius * aspect, cy + angle.sin() * radius)
}

/// Inverse of [`polar_to_grid`]: (angle, radius) of a grid point.
/// The angle grows clockwise since grid y points down.
#[inline]
pub fn grid_to_polar(cx: f64, cy: f64, x: f64, y: f64, aspect: f64) -> (f64, f64) {
    let dx = (x - cx) / aspect;
    let dy = y - cy;
    (dy.atan2(dx), dx.hypot(dy))
}

/// Compute a circle that fits within the given area, accounting for aspect ratio.
/// Returns (center_x, center_y, max_radius) with the radius in rows.
pub fn fit_circle(area_w: usize, area_h: usize, aspect: f64) -> (f64, f64, f64) {
    let cx = area_w as f64 / 2.0;
    let cy = area_h as f64 / 2.0;
    // Chars are taller than wide, so the visual width is area_w / aspect
    let effective_w = area_w as f64 / aspect;
    let max_radius = (effective_w.min(area_h as f64) / 2.0) * 0.95;
    (cx, cy, max_radius)
}
