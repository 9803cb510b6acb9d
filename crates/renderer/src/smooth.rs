//! Chaikin corner-cutting for contour polylines.

use topo_common::{Point, Polyline};

/// Number of subdivision rounds applied when the caller has no preference.
pub const DEFAULT_SMOOTHING_ITERATIONS: u32 = 2;

/// Smooth a polyline, honouring its closed flag.
pub fn smooth(polyline: &Polyline, iterations: u32) -> Polyline {
    Polyline {
        points: chaikin(&polyline.points, iterations, polyline.closed),
        closed: polyline.closed,
    }
}

/// Apply Chaikin's corner cutting algorithm for `iterations` rounds.
///
/// Every adjacent pair (p0, p1) is replaced by the points at 25% and 75%
/// along it. Closed input wraps from last to first; a repeated closing point
/// is dropped first. Open input keeps its first and last points fixed, so a
/// two-point line comes back unchanged. Fewer than two points are returned
/// as given.
pub fn chaikin(points: &[Point], iterations: u32, closed: bool) -> Vec<Point> {
    let mut current: Vec<Point> = if closed && points.len() > 2 && points.first() == points.last() {
        points[..points.len() - 1].to_vec()
    } else {
        points.to_vec()
    };

    if iterations == 0 || current.len() < 2 {
        return points.to_vec();
    }

    for _ in 0..iterations {
        current = if closed {
            cut_closed(&current)
        } else {
            cut_open(&current)
        };
    }

    current
}

#[inline]
fn cut(p0: Point, p1: Point) -> (Point, Point) {
    let q = Point::new(0.75 * p0.x + 0.25 * p1.x, 0.75 * p0.y + 0.25 * p1.y);
    let r = Point::new(0.25 * p0.x + 0.75 * p1.x, 0.25 * p0.y + 0.75 * p1.y);
    (q, r)
}

fn cut_closed(points: &[Point]) -> Vec<Point> {
    let n = points.len();
    let mut out = Vec::with_capacity(n * 2);
    for i in 0..n {
        let (q, r) = cut(points[i], points[(i + 1) % n]);
        out.push(q);
        out.push(r);
    }
    out
}

/// Open variant: the first pair's Q and the last pair's R give way to the
/// pinned endpoints.
fn cut_open(points: &[Point]) -> Vec<Point> {
    let n = points.len();
    let mut out = Vec::with_capacity(n * 2);
    out.push(points[0]);
    for i in 0..n - 1 {
        let (q, r) = cut(points[i], points[i + 1]);
        if i > 0 {
            out.push(q);
        }
        if i + 2 < n {
            out.push(r);
        }
    }
    out.push(points[n - 1]);
    out
}
