//! Geometry primitives for toolpath generation.
//!
//! Points are always in machine coordinate space by the time they reach the
//! cutters; transforms are applied once, while flattening.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 2D affine transform used to map document coordinates to machine space.
pub type Transform = lyon::geom::Transform<f64>;

/// A point in the XY plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        segment_length(*self, *other)
    }

    /// Point at `fraction` of the way from `self` to `other`.
    pub fn lerp(&self, other: &Point, fraction: f64) -> Point {
        Point::new(
            self.x + fraction * (other.x - self.x),
            self.y + fraction * (other.y - self.y),
        )
    }

    /// Maps the point through an affine transform.
    pub fn transformed(&self, transform: &Transform) -> Point {
        transform
            .transform_point(lyon::geom::point(self.x, self.y))
            .into()
    }
}

impl From<lyon::geom::Point<f64>> for Point {
    fn from(p: lyon::geom::Point<f64>) -> Self {
        Self::new(p.x, p.y)
    }
}

impl From<Point> for lyon::geom::Point<f64> {
    fn from(p: Point) -> Self {
        lyon::geom::point(p.x, p.y)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Euclidean length of the segment `p0 -> p1`.
pub fn segment_length(p0: Point, p1: Point) -> f64 {
    let a = p1.x - p0.x;
    let b = p1.y - p0.y;
    (a * a + b * b).sqrt()
}

/// Running axis-aligned bounds.
///
/// Always constructed fresh by the caller and passed explicitly to whatever
/// accumulates into it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Bounds {
    /// Empty bounds; the first `update` defines both corners.
    pub fn new() -> Self {
        Self {
            x0: f64::INFINITY,
            y0: f64::INFINITY,
            x1: f64::NEG_INFINITY,
            y1: f64::NEG_INFINITY,
        }
    }

    pub fn update(&mut self, point: Point) {
        self.x0 = self.x0.min(point.x);
        self.x1 = self.x1.max(point.x);
        self.y0 = self.y0.min(point.y);
        self.y1 = self.y1.max(point.y);
    }

    /// True until at least one point has been accumulated.
    pub fn is_empty(&self) -> bool {
        self.x0 > self.x1 || self.y0 > self.y1
    }

    pub fn width(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.x1 - self.x0
        }
    }

    pub fn height(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.y1 - self.y0
        }
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "empty")
        } else {
            write!(
                f,
                "x0:{} y0:{} x1:{} y1:{}",
                self.x0, self.y0, self.x1, self.y1
            )
        }
    }
}

/// An ordered run of points. Traversal order is the cut order.
///
/// A closed polyline repeats its first point as its last point and bounds a
/// fillable region.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Polyline {
    pub points: Vec<Point>,
    pub closed: bool,
}

impl Polyline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_points(points: Vec<Point>, closed: bool) -> Self {
        Self { points, closed }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<Point> {
        self.points.first().copied()
    }

    pub fn last(&self) -> Option<Point> {
        self.points.last().copied()
    }

    /// Consecutive `(start, end)` pairs.
    pub fn segments(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        self.points.windows(2).map(|w| (w[0], w[1]))
    }

    /// Total arc length; zero for fewer than two points.
    pub fn length(&self) -> f64 {
        self.segments().map(|(p0, p1)| segment_length(p0, p1)).sum()
    }

    /// Accumulates every point into `bounds`.
    pub fn accumulate_bounds(&self, bounds: &mut Bounds) {
        for point in &self.points {
            bounds.update(*point);
        }
    }

    pub fn bounds(&self) -> Bounds {
        let mut bounds = Bounds::new();
        self.accumulate_bounds(&mut bounds);
        bounds
    }
}

impl fmt::Display for Polyline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} polyline, {} points, length {:.5}",
            if self.closed { "closed" } else { "open" },
            self.points.len(),
            self.length()
        )
    }
}

/// All polylines flattened from one source path.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Zones {
    pub polylines: Vec<Polyline>,
}

impl Zones {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, polyline: Polyline) {
        self.polylines.push(polyline);
    }

    pub fn len(&self) -> usize {
        self.polylines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polylines.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Polyline> {
        self.polylines.iter()
    }

    /// Only the closed polylines; these are the ones that bound area.
    pub fn closed(&self) -> impl Iterator<Item = &Polyline> {
        self.polylines.iter().filter(|p| p.closed)
    }

    pub fn length(&self) -> f64 {
        self.polylines.iter().map(Polyline::length).sum()
    }

    pub fn bounds(&self) -> Bounds {
        let mut bounds = Bounds::new();
        for polyline in &self.polylines {
            polyline.accumulate_bounds(&mut bounds);
        }
        bounds
    }
}

impl<'a> IntoIterator for &'a Zones {
    type Item = &'a Polyline;
    type IntoIter = std::slice::Iter<'a, Polyline>;

    fn into_iter(self) -> Self::IntoIter {
        self.polylines.iter()
    }
}

impl fmt::Display for Zones {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} polylines ({} closed), length {:.5}",
            self.polylines.len(),
            self.closed().count(),
            self.length()
        )
    }
}
