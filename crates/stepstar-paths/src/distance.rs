use std::f64::consts::SQRT_2;

use stepstar_core::Point;

/// Manhattan (L1) distance between two points.
#[inline]
pub fn manhattan(a: Point, b: Point) -> f64 {
    let (dx, dy) = a.delta(b);
    f64::from(dx) + f64::from(dy)
}

/// Octile distance: diagonal steps cost √2, straight steps cost 1.
#[inline]
pub fn octile(a: Point, b: Point) -> f64 {
    let (dx, dy) = a.delta(b);
    let (lo, hi) = if dx < dy { (dx, dy) } else { (dy, dx) };
    f64::from(lo) * SQRT_2 + f64::from(hi - lo)
}
