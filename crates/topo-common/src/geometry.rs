//! Pixel-space geometry produced by contour extraction.

use serde::{Deserialize, Serialize};

/// A point in 2D space (pixel coordinates)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Linear interpolation towards `other` by `t`.
    #[inline]
    pub fn lerp(&self, other: &Point, t: f64) -> Point {
        Point::new(
            self.x + t * (other.x - self.x),
            self.y + t * (other.y - self.y),
        )
    }
}

/// A line segment between two points.
///
/// Orientation carries no meaning: a segment only records that the
/// iso-level crosses one grid cell between these two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }
}

/// An ordered chain of points, optionally closed.
///
/// A closed polyline produced by the extractor repeats its first point as
/// its last point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    pub points: Vec<Point>,
    pub closed: bool,
}

impl Polyline {
    pub fn new(points: Vec<Point>, closed: bool) -> Self {
        Self { points, closed }
    }

    pub fn open(points: Vec<Point>) -> Self {
        Self::new(points, false)
    }

    pub fn closed(points: Vec<Point>) -> Self {
        Self::new(points, true)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&Point> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&Point> {
        self.points.last()
    }

    /// Total length along the chain (the closing edge is included for
    /// closed polylines that do not repeat their first point).
    pub fn length(&self) -> f64 {
        let mut length: f64 = self
            .points
            .windows(2)
            .map(|pair| pair[0].distance(&pair[1]))
            .sum();
        if self.closed && self.points.len() > 2 {
            if let (Some(first), Some(last)) = (self.points.first(), self.points.last()) {
                length += last.distance(first);
            }
        }
        length
    }

    /// Mean of the vertices.
    pub fn centroid(&self) -> Option<Point> {
        if self.points.is_empty() {
            return None;
        }
        let n = self.points.len() as f64;
        let (sx, sy) = self
            .points
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Some(Point::new(sx / n, sy / n))
    }
}

/// A polyline tagged with the contour level it traces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contour {
    /// Index in `0..=num_contours`
    pub level_index: usize,
    /// Iso-value, `level_index / num_contours`
    pub level: f64,
    pub polyline: Polyline,
}
