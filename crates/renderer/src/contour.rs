//! Contour line (isoline) extraction using the marching squares algorithm.
//!
//! Each grid cell is classified against the iso-level, crossing points are
//! interpolated along the cell edges, saddle cells are resolved with the
//! asymptotic decider, and the resulting segments are stitched into
//! polylines through a hash map keyed by quantized endpoint.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use topo_common::{Contour, HeightGrid, Point, Polyline, Segment, TopoError, TopoResult};

use crate::smooth::{smooth, DEFAULT_SMOOTHING_ITERATIONS};

/// Endpoint snapping grid in pixels.
pub const DEFAULT_QUANTUM: f64 = 0.01;

/// Maximum gap, in pixels, between the end of a walk and its start for the
/// chain to be treated as a closed loop.
pub const DEFAULT_CLOSE_TOLERANCE: f64 = 0.75;

/// Quantized point used as a stitching key.
type PointKey = (i64, i64);

/// Cell edge, named from the top-left corner clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

/// Marching squares extractor for one grid geometry.
///
/// Grid cell `(col, row)` maps to pixel `(col * cell_width, row * cell_height)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContourExtractor {
    pub cell_width: f64,
    pub cell_height: f64,
    /// Endpoint snapping grid in pixels
    pub quantum: f64,
    /// Loop closing distance in pixels
    pub close_tolerance: f64,
}

impl Default for ContourExtractor {
    fn default() -> Self {
        Self {
            cell_width: 1.0,
            cell_height: 1.0,
            quantum: DEFAULT_QUANTUM,
            close_tolerance: DEFAULT_CLOSE_TOLERANCE,
        }
    }
}

impl ContourExtractor {
    pub fn new(cell_width: f64, cell_height: f64) -> Self {
        Self {
            cell_width,
            cell_height,
            ..Self::default()
        }
    }

    /// Extractor whose cells stretch a `grid_width` x `grid_height` grid over
    /// a `canvas_width` x `canvas_height` pixel canvas.
    pub fn for_canvas(
        grid_width: usize,
        grid_height: usize,
        canvas_width: usize,
        canvas_height: usize,
    ) -> Self {
        Self::new(
            canvas_width as f64 / grid_width.max(1) as f64,
            canvas_height as f64 / grid_height.max(1) as f64,
        )
    }

    /// Extract all polylines tracing `level` through `grid`.
    pub fn extract(&self, grid: &HeightGrid, level: f64) -> Vec<Polyline> {
        let segments = self.march_squares(grid, level);
        self.connect_segments(&segments)
    }

    /// Marching squares pass producing quantized, unordered segments.
    ///
    /// Corners strictly above `level` count as inside. Cells touching a
    /// non-finite value are skipped, as are segments that collapse to a single
    /// point after quantization.
    pub fn march_squares(&self, grid: &HeightGrid, level: f64) -> Vec<Segment> {
        let width = grid.width();
        let height = grid.height();
        if width < 2 || height < 2 {
            return vec![];
        }

        let mut segments = Vec::new();

        for y in 0..(height - 1) {
            for x in 0..(width - 1) {
                let tl = grid.get(y, x);
                let tr = grid.get(y, x + 1);
                let br = grid.get(y + 1, x + 1);
                let bl = grid.get(y + 1, x);

                if !(tl.is_finite() && tr.is_finite() && br.is_finite() && bl.is_finite()) {
                    continue;
                }

                let mut code = 0u8;
                if tl > level {
                    code |= 1;
                }
                if tr > level {
                    code |= 2;
                }
                if br > level {
                    code |= 4;
                }
                if bl > level {
                    code |= 8;
                }

                if code == 0 || code == 15 {
                    continue;
                }

                let centre_above = (tl + tr + br + bl) / 4.0 > level;
                let corners = CellCorners {
                    x: x as f64,
                    y: y as f64,
                    tl,
                    tr,
                    br,
                    bl,
                };

                for &(a, b) in edge_pairs(code, centre_above) {
                    let (start, start_key) = self.quantize(self.edge_point(&corners, a, level));
                    let (end, end_key) = self.quantize(self.edge_point(&corners, b, level));
                    if start_key != end_key {
                        segments.push(Segment::new(start, end));
                    }
                }
            }
        }

        segments
    }

    /// Stitch unordered segments into polylines.
    ///
    /// Every segment is walked exactly once. A chain whose walk ends within
    /// `close_tolerance` of its start becomes a closed polyline ending on the
    /// exact start point; any other chain is extended in both directions and
    /// emitted as one open polyline.
    pub fn connect_segments(&self, segments: &[Segment]) -> Vec<Polyline> {
        if segments.is_empty() {
            return vec![];
        }

        let endpoint_keys: Vec<(PointKey, PointKey)> = segments
            .iter()
            .map(|seg| (self.key(&seg.start), self.key(&seg.end)))
            .collect();

        let mut adjacency: HashMap<PointKey, Vec<usize>> = HashMap::with_capacity(segments.len());
        for (index, &(start_key, end_key)) in endpoint_keys.iter().enumerate() {
            adjacency.entry(start_key).or_default().push(index);
            adjacency.entry(end_key).or_default().push(index);
        }

        let mut chains = ChainWalker {
            segments,
            endpoint_keys: &endpoint_keys,
            adjacency: &adjacency,
            visited: vec![false; segments.len()],
        };

        let mut polylines = Vec::new();

        for first in 0..segments.len() {
            if chains.visited[first] {
                continue;
            }
            chains.visited[first] = true;

            let seg = segments[first];
            let (start_key, end_key) = endpoint_keys[first];

            let mut points = vec![seg.start, seg.end];
            chains.walk(end_key, &mut points);

            let closes = points.len() >= 4
                && points
                    .last()
                    .is_some_and(|last| last.distance(&seg.start) <= self.close_tolerance);

            if closes {
                if let Some(last) = points.last_mut() {
                    *last = seg.start;
                }
                polylines.push(Polyline::closed(points));
                continue;
            }

            let mut backward = Vec::new();
            chains.walk(start_key, &mut backward);
            if !backward.is_empty() {
                backward.reverse();
                backward.extend(points);
                points = backward;
            }

            polylines.push(Polyline::open(points));
        }

        polylines
    }

    /// Crossing point on one cell edge, in pixel space.
    fn edge_point(&self, c: &CellCorners, edge: Edge, level: f64) -> Point {
        let (x1, y1, v1, x2, y2, v2) = match edge {
            Edge::Top => (c.x, c.y, c.tl, c.x + 1.0, c.y, c.tr),
            Edge::Right => (c.x + 1.0, c.y, c.tr, c.x + 1.0, c.y + 1.0, c.br),
            Edge::Bottom => (c.x, c.y + 1.0, c.bl, c.x + 1.0, c.y + 1.0, c.br),
            Edge::Left => (c.x, c.y, c.tl, c.x, c.y + 1.0, c.bl),
        };

        // Only crossed edges reach here, so v1 != v2
        let t = (level - v1) / (v2 - v1);

        Point::new(
            (x1 + t * (x2 - x1)) * self.cell_width,
            (y1 + t * (y2 - y1)) * self.cell_height,
        )
    }

    fn quantum(&self) -> f64 {
        if self.quantum > 0.0 {
            self.quantum
        } else {
            DEFAULT_QUANTUM
        }
    }

    fn key(&self, p: &Point) -> PointKey {
        let q = self.quantum();
        ((p.x / q).round() as i64, (p.y / q).round() as i64)
    }

    /// Snap a point onto the quantum grid and return it with its key.
    fn quantize(&self, p: Point) -> (Point, PointKey) {
        let q = self.quantum();
        let key = self.key(&p);
        (Point::new(key.0 as f64 * q, key.1 as f64 * q), key)
    }
}

/// Corner values of one cell plus its top-left grid position.
struct CellCorners {
    x: f64,
    y: f64,
    tl: f64,
    tr: f64,
    br: f64,
    bl: f64,
}

/// Edge pairs joined by the contour for a 4-bit cell code
/// (TL = 1, TR = 2, BR = 4, BL = 8).
///
/// Complementary codes share their segment. For the saddles the centre
/// average decides which diagonal is connected: a centre above the level
/// joins the above corners, cutting off the two below corners, and vice
/// versa.
fn edge_pairs(code: u8, centre_above: bool) -> &'static [(Edge, Edge)] {
    use Edge::*;
    match code {
        1 | 14 => &[(Left, Top)],
        2 | 13 => &[(Top, Right)],
        3 | 12 => &[(Left, Right)],
        4 | 11 => &[(Right, Bottom)],
        6 | 9 => &[(Top, Bottom)],
        7 | 8 => &[(Left, Bottom)],
        // TL and BR above
        5 if centre_above => &[(Top, Right), (Left, Bottom)],
        5 => &[(Left, Top), (Right, Bottom)],
        // TR and BL above
        10 if centre_above => &[(Left, Top), (Right, Bottom)],
        10 => &[(Top, Right), (Left, Bottom)],
        _ => &[],
    }
}

/// Walks unvisited segments through the endpoint adjacency map.
struct ChainWalker<'a> {
    segments: &'a [Segment],
    endpoint_keys: &'a [(PointKey, PointKey)],
    adjacency: &'a HashMap<PointKey, Vec<usize>>,
    visited: Vec<bool>,
}

impl ChainWalker<'_> {
    /// Follow unvisited segments from `from`, appending each far endpoint.
    fn walk(&mut self, from: PointKey, out: &mut Vec<Point>) {
        let mut current = from;
        loop {
            let next = self.adjacency.get(&current).and_then(|incident| {
                incident.iter().copied().find(|&index| !self.visited[index])
            });
            let Some(index) = next else {
                break;
            };
            self.visited[index] = true;

            let seg = &self.segments[index];
            let (start_key, end_key) = self.endpoint_keys[index];
            if start_key == current {
                out.push(seg.end);
                current = end_key;
            } else {
                out.push(seg.start);
                current = start_key;
            }
        }
    }
}

/// Iso-values for `num_contours` bands: `i / num_contours` for `i` in
/// `0..=num_contours`. Zero bands evaluates level 0 only.
pub fn contour_levels(num_contours: usize) -> Vec<f64> {
    if num_contours == 0 {
        return vec![0.0];
    }
    (0..=num_contours)
        .map(|i| i as f64 / num_contours as f64)
        .collect()
}

/// Configuration for multi-level contour generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContourConfig {
    /// Number of bands; levels are `i / num_contours` for `i` in `0..=num_contours`
    pub num_contours: usize,
    /// Number of Chaikin passes (0 = no smoothing)
    pub smoothing_passes: u32,
    pub extractor: ContourExtractor,
    /// Extract levels on the rayon pool
    pub parallel: bool,
}

impl Default for ContourConfig {
    fn default() -> Self {
        Self {
            num_contours: 20,
            smoothing_passes: DEFAULT_SMOOTHING_ITERATIONS,
            extractor: ContourExtractor::default(),
            parallel: false,
        }
    }
}

/// Cooperative cancellation flag, checked between contour levels.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Extract and smooth the contours of a single level.
pub fn extract_level(
    grid: &HeightGrid,
    level_index: usize,
    level: f64,
    config: &ContourConfig,
) -> Vec<Contour> {
    config
        .extractor
        .extract(grid, level)
        .into_iter()
        .map(|polyline| {
            let polyline = if config.smoothing_passes > 0 {
                smooth(&polyline, config.smoothing_passes)
            } else {
                polyline
            };
            Contour {
                level_index,
                level,
                polyline,
            }
        })
        .collect()
}

/// Generate all contours for every level.
///
/// Output is ordered by level index, then by extraction order, whether or not
/// the levels ran in parallel.
pub fn generate_all_contours(grid: &HeightGrid, config: &ContourConfig) -> Vec<Contour> {
    // Without a flag nothing can cancel the run
    run_levels(grid, config, None).unwrap_or_default()
}

/// Like [`generate_all_contours`], stopping with [`TopoError::Cancelled`]
/// at the first level boundary after `cancel` is set.
pub fn generate_all_contours_cancellable(
    grid: &HeightGrid,
    config: &ContourConfig,
    cancel: &CancelFlag,
) -> TopoResult<Vec<Contour>> {
    run_levels(grid, config, Some(cancel))
}

fn run_levels(
    grid: &HeightGrid,
    config: &ContourConfig,
    cancel: Option<&CancelFlag>,
) -> TopoResult<Vec<Contour>> {
    let levels = contour_levels(config.num_contours);

    tracing::debug!(
        grid_width = grid.width(),
        grid_height = grid.height(),
        num_levels = levels.len(),
        smoothing_passes = config.smoothing_passes,
        parallel = config.parallel,
        "generate_all_contours input"
    );

    let run_level = |(level_index, &level): (usize, &f64)| -> TopoResult<Vec<Contour>> {
        if cancel.is_some_and(CancelFlag::is_cancelled) {
            return Err(TopoError::Cancelled);
        }
        Ok(extract_level(grid, level_index, level, config))
    };

    let per_level: Vec<Vec<Contour>> = if config.parallel {
        levels.par_iter().enumerate().map(run_level).collect::<TopoResult<_>>()?
    } else {
        levels.iter().enumerate().map(run_level).collect::<TopoResult<_>>()?
    };

    let contours: Vec<Contour> = per_level.into_iter().flatten().collect();

    tracing::debug!(
        num_contours = contours.len(),
        closed = contours.iter().filter(|c| c.polyline.closed).count(),
        total_points = contours.iter().map(|c| c.polyline.len()).sum::<usize>(),
        "Generated contours"
    );

    Ok(contours)
}
