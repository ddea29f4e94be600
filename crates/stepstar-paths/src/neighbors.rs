use stepstar_core::Point;

/// Straight steps, clockwise from north.
const STRAIGHT: [Point; 4] = [
    Point::new(0, -1),
    Point::new(1, 0),
    Point::new(0, 1),
    Point::new(-1, 0),
];

/// All eight steps in row-major order around the origin.
const ALL: [Point; 8] = [
    Point::new(-1, -1),
    Point::new(0, -1),
    Point::new(1, -1),
    Point::new(-1, 0),
    Point::new(1, 0),
    Point::new(-1, 1),
    Point::new(0, 1),
    Point::new(1, 1),
];

/// Reusable neighbor enumeration.
///
/// The order of the returned points is fixed, which keeps open-list tie
/// breaking reproducible between runs.
#[derive(Debug, Clone)]
pub struct Neighbors {
    buf: Vec<Point>,
}

impl Default for Neighbors {
    fn default() -> Self {
        Self::new()
    }
}

impl Neighbors {
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(8),
        }
    }

    /// 4-connected neighbors of `p` for which `keep` returns `true`.
    pub fn cardinal(&mut self, p: Point, keep: impl Fn(Point) -> bool) -> &[Point] {
        self.collect(p, &STRAIGHT, keep)
    }

    /// 8-connected neighbors of `p` for which `keep` returns `true`.
    pub fn all(&mut self, p: Point, keep: impl Fn(Point) -> bool) -> &[Point] {
        self.collect(p, &ALL, keep)
    }

    /// [`all`](Self::all) when `diagonal` is set, otherwise
    /// [`cardinal`](Self::cardinal).
    pub fn around(&mut self, p: Point, diagonal: bool, keep: impl Fn(Point) -> bool) -> &[Point] {
        if diagonal {
            self.all(p, keep)
        } else {
            self.cardinal(p, keep)
        }
    }

    fn collect(&mut self, p: Point, dirs: &[Point], keep: impl Fn(Point) -> bool) -> &[Point] {
        self.buf.clear();
        self.buf
            .extend(dirs.iter().map(|&d| p + d).filter(|&n| keep(n)));
        &self.buf
    }
}
