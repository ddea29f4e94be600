//! Geometry primitives: [`Point`], [`Area`] and [`AreaGroup`].
//!
//! `Area` is an *inclusive* rectangle, unlike a half-open range: it names
//! exactly the coordinates a resize adds or removes. `AreaGroup` unions
//! several of them without visiting any coordinate twice.

use std::fmt;
use std::ops::Add;

// ---------------------------------------------------------------------------
// Point
// ---------------------------------------------------------------------------

/// A 2D integer grid coordinate. X grows right, Y grows down.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// Create a new point.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Absolute per-axis distance to `other` as `(dx, dy)`.
    #[inline]
    pub fn delta(self, other: Point) -> (u32, u32) {
        (self.x.abs_diff(other.x), self.y.abs_diff(other.y))
    }

    /// Whether `other` differs from `self` on both axes.
    #[inline]
    pub fn is_diagonal_to(self, other: Point) -> bool {
        self.x != other.x && self.y != other.y
    }
}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Point {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.y.cmp(&other.y).then(self.x.cmp(&other.x))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl Add for Point {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

// ---------------------------------------------------------------------------
// Area
// ---------------------------------------------------------------------------

/// A closed rectangle `[x1, x2] × [y1, y2]`. Both corners are inclusive.
///
/// Construction canonicalizes the corners so that iteration always runs
/// low-to-high on both axes. An `Area` therefore always holds at least one
/// coordinate.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Area {
    pub min: Point,
    pub max: Point,
}

impl Area {
    /// Create an area from the two x bounds and the two y bounds, in any
    /// order.
    #[inline]
    pub fn new(x1: i32, x2: i32, y1: i32, y2: i32) -> Self {
        Self {
            min: Point::new(x1.min(x2), y1.min(y2)),
            max: Point::new(x1.max(x2), y1.max(y2)),
        }
    }

    /// Area spanning the half-open column range `[x0, x1)` and row range
    /// `[y0, y1)`, or `None` when either range is empty.
    pub fn from_half_open(x0: i32, x1: i32, y0: i32, y1: i32) -> Option<Self> {
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some(Self::new(x0, x1 - 1, y0, y1 - 1))
    }

    /// Number of columns.
    #[inline]
    pub fn width(self) -> u32 {
        self.max.x.abs_diff(self.min.x) + 1
    }

    /// Number of rows.
    #[inline]
    pub fn height(self) -> u32 {
        self.max.y.abs_diff(self.min.y) + 1
    }

    /// Total number of coordinates in the area.
    #[inline]
    pub fn len(self) -> usize {
        self.width() as usize * self.height() as usize
    }

    /// Always `false`; present for symmetry with [`len`](Area::len).
    #[inline]
    pub fn is_empty(self) -> bool {
        false
    }

    /// Inclusive bounds check.
    #[inline]
    pub fn contains(self, x: i32, y: i32) -> bool {
        x >= self.min.x && x <= self.max.x && y >= self.min.y && y <= self.max.y
    }

    /// Inclusive bounds check for a [`Point`].
    #[inline]
    pub fn contains_point(self, p: Point) -> bool {
        self.contains(p.x, p.y)
    }

    /// Row-major iterator over every coordinate in the area. Each call
    /// starts from the first coordinate again.
    #[inline]
    pub fn iter(self) -> AreaIter {
        AreaIter {
            area: self,
            cur: Some(self.min),
        }
    }
}

impl IntoIterator for Area {
    type Item = Point;
    type IntoIter = AreaIter;
    #[inline]
    fn into_iter(self) -> AreaIter {
        self.iter()
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}-{}]", self.min, self.max)
    }
}

/// Row-major iterator over the points in an [`Area`].
#[derive(Clone, Debug)]
pub struct AreaIter {
    area: Area,
    cur: Option<Point>,
}

impl Iterator for AreaIter {
    type Item = Point;

    #[inline]
    fn next(&mut self) -> Option<Point> {
        let p = self.cur?;
        self.cur = if p.x < self.area.max.x {
            Some(Point::new(p.x + 1, p.y))
        } else if p.y < self.area.max.y {
            Some(Point::new(self.area.min.x, p.y + 1))
        } else {
            None
        };
        Some(p)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let Some(cur) = self.cur else {
            return (0, Some(0));
        };
        let w = self.area.width() as usize;
        let remaining_in_row = self.area.max.x.abs_diff(cur.x) as usize + 1;
        let remaining_rows = self.area.max.y.abs_diff(cur.y) as usize;
        let total = remaining_in_row + remaining_rows * w;
        (total, Some(total))
    }
}

impl ExactSizeIterator for AreaIter {}

// ---------------------------------------------------------------------------
// AreaGroup
// ---------------------------------------------------------------------------

/// A union of [`Area`]s.
///
/// Iteration visits the member areas in order and yields a coordinate only
/// from the first area that covers it, so every distinct coordinate comes
/// out exactly once in first-encountered order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AreaGroup {
    areas: Vec<Area>,
}

impl AreaGroup {
    /// Create a group from its member areas.
    pub fn new(areas: impl IntoIterator<Item = Area>) -> Self {
        Self {
            areas: areas.into_iter().collect(),
        }
    }

    /// Add another member area.
    pub fn push(&mut self, area: Area) {
        self.areas.push(area);
    }

    /// The member areas.
    #[inline]
    pub fn areas(&self) -> &[Area] {
        &self.areas
    }

    /// Whether the group has no member areas.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    /// Whether any member area covers `(x, y)`.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.areas.iter().any(|a| a.contains(x, y))
    }

    /// Deduplicated iterator over the union of all member areas.
    pub fn iter(&self) -> AreaGroupIter<'_> {
        AreaGroupIter {
            areas: &self.areas,
            idx: 0,
            inner: self.areas.first().map(|a| a.iter()),
        }
    }
}

impl<'a> IntoIterator for &'a AreaGroup {
    type Item = Point;
    type IntoIter = AreaGroupIter<'a>;
    fn into_iter(self) -> AreaGroupIter<'a> {
        self.iter()
    }
}

/// Iterator over the distinct coordinates of an [`AreaGroup`].
#[derive(Clone, Debug)]
pub struct AreaGroupIter<'a> {
    areas: &'a [Area],
    idx: usize,
    inner: Option<AreaIter>,
}

impl Iterator for AreaGroupIter<'_> {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        loop {
            let inner = self.inner.as_mut()?;
            match inner.next() {
                Some(p) => {
                    // Earlier members already yielded this coordinate.
                    if self.areas[..self.idx].iter().any(|a| a.contains_point(p)) {
                        continue;
                    }
                    return Some(p);
                }
                None => {
                    self.idx += 1;
                    self.inner = self.areas.get(self.idx).map(|a| a.iter());
                }
            }
        }
    }
}
