//! Tests for contour line (isoline) extraction.

use renderer::contour::{
    contour_levels, generate_all_contours, generate_all_contours_cancellable, CancelFlag,
    ContourConfig, ContourExtractor,
};
use renderer::smooth::smooth;
use terrain::{generate_height_grid, NoiseField, TerrainParams};
use test_utils::{
    assert_approx_eq, assert_point_approx_eq, create_constant_grid, create_hills_grid,
    create_peak_grid, create_ramp_grid, create_ramp_with_nans, create_saddle_grid,
    create_vertical_ramp_grid, seeds, sizes,
};
use topo_common::{HeightGrid, Point, TopoError};

fn extractor() -> ContourExtractor {
    ContourExtractor::default()
}

// ============================================================================
// Degenerate grids
// ============================================================================

#[test]
fn test_constant_grid_has_no_contours() {
    let grid = create_constant_grid(20, 20, 0.5);
    for level in contour_levels(10) {
        assert!(
            extractor().extract(&grid, level).is_empty(),
            "level {} produced output",
            level
        );
    }
}

#[test]
fn test_flat_grid_at_its_own_level_is_empty() {
    let grid = create_constant_grid(8, 8, 0.3);
    assert!(extractor().march_squares(&grid, 0.3).is_empty());
    assert!(extractor().extract(&grid, 0.3).is_empty());
}

#[test]
fn test_too_small_grids_are_empty() {
    let ramp_1_wide = create_ramp_grid(1, 10);
    let ramp_1_tall = create_ramp_grid(10, 1);
    let empty = HeightGrid::new(0, 0, vec![]).unwrap();

    for grid in [&ramp_1_wide, &ramp_1_tall, &empty] {
        assert!(extractor().extract(grid, 0.5).is_empty());
    }
}

#[test]
fn test_minimum_grid_has_one_cell() {
    let (w, h) = sizes::MIN_GRID;
    let grid = create_ramp_grid(w, h);
    let polylines = extractor().extract(&grid, 0.5);
    assert_eq!(polylines.len(), 1);
    assert_eq!(
        polylines[0].points,
        vec![Point::new(0.5, 0.0), Point::new(0.5, 1.0)]
    );
}

#[test]
fn test_level_outside_range_is_empty() {
    let grid = create_ramp_grid(10, 10);
    assert!(extractor().extract(&grid, 1.0).is_empty());
    assert!(extractor().extract(&grid, 1.5).is_empty());
    assert!(extractor().extract(&grid, -0.1).is_empty());
}

// ============================================================================
// Ramps
// ============================================================================

#[test]
fn test_horizontal_ramp_gives_vertical_line() {
    let grid = create_ramp_grid(60, 60);
    let polylines = extractor().extract(&grid, 0.5);

    assert_eq!(polylines.len(), 1);
    let line = &polylines[0];
    assert!(!line.closed);
    assert_eq!(line.len(), 60);

    for p in &line.points {
        assert_approx_eq!(p.x, 29.5, 1e-9);
    }

    let ys = [line.first().unwrap().y, line.last().unwrap().y];
    assert!(ys.contains(&0.0) && ys.contains(&59.0), "endpoints {:?}", ys);
}

#[test]
fn test_vertical_ramp_gives_horizontal_line() {
    let grid = create_vertical_ramp_grid(40, 21);
    // Row 11 is exactly 0.55 and counts as below, so the line runs along it
    let polylines = extractor().extract(&grid, 0.55);

    assert_eq!(polylines.len(), 1);
    let line = &polylines[0];
    assert_eq!(line.len(), 40);
    for p in &line.points {
        assert_approx_eq!(p.y, 11.0, 1e-9);
    }
}

#[test]
fn test_ramp_line_scales_to_canvas() {
    let grid = create_ramp_grid(60, 60);
    let extractor = ContourExtractor::for_canvas(60, 60, 600, 300);
    let polylines = extractor.extract(&grid, 0.5);

    assert_eq!(polylines.len(), 1);
    for p in &polylines[0].points {
        assert_approx_eq!(p.x, 295.0, 1e-9);
        assert!(p.y >= 0.0 && p.y <= 295.0);
    }
}

#[test]
fn test_level_on_grid_value_is_exclusive() {
    // Columns 0, .25, .5, .75, 1: column 2 equals the level and counts as below
    let grid = create_ramp_grid(5, 4);
    let polylines = extractor().extract(&grid, 0.5);
    assert_eq!(polylines.len(), 1);
    for p in &polylines[0].points {
        assert_approx_eq!(p.x, 2.0, 1e-9);
    }
}

// ============================================================================
// Saddle cells
// ============================================================================

#[test]
fn test_saddle_code_5_centre_above() {
    // TL and BR above, centre average 0.6 > 0.5
    let grid = create_saddle_grid(1.0, 0.2, 0.2, 1.0);
    let segments = extractor().march_squares(&grid, 0.5);
    assert_eq!(segments.len(), 2);

    // The below corners (TR, BL) are cut off
    assert_point_approx_eq!(segments[0].start, Point::new(0.625, 0.0), 0.01);
    assert_point_approx_eq!(segments[0].end, Point::new(1.0, 0.375), 0.01);
    assert_point_approx_eq!(segments[1].start, Point::new(0.0, 0.625), 0.01);
    assert_point_approx_eq!(segments[1].end, Point::new(0.375, 1.0), 0.01);
}

#[test]
fn test_saddle_code_5_centre_below() {
    // TL and BR above, centre average 0.4 < 0.5
    let grid = create_saddle_grid(0.8, 0.0, 0.0, 0.8);
    let segments = extractor().march_squares(&grid, 0.5);
    assert_eq!(segments.len(), 2);

    // The above corners (TL, BR) are cut off
    assert_point_approx_eq!(segments[0].start, Point::new(0.0, 0.375), 0.01);
    assert_point_approx_eq!(segments[0].end, Point::new(0.375, 0.0), 0.01);
    assert_point_approx_eq!(segments[1].start, Point::new(1.0, 0.625), 0.01);
    assert_point_approx_eq!(segments[1].end, Point::new(0.625, 1.0), 0.01);
}

#[test]
fn test_saddle_code_10_centre_above() {
    // TR and BL above, centre average 0.6
    let grid = create_saddle_grid(0.2, 1.0, 1.0, 0.2);
    let segments = extractor().march_squares(&grid, 0.5);
    assert_eq!(segments.len(), 2);

    // TL and BR (below) are cut off: left-top and right-bottom
    assert_approx_eq!(segments[0].start.x, 0.0, 1e-9);
    assert_approx_eq!(segments[0].end.y, 0.0, 1e-9);
    assert_approx_eq!(segments[1].start.x, 1.0, 1e-9);
    assert_approx_eq!(segments[1].end.y, 1.0, 1e-9);
}

#[test]
fn test_saddle_code_10_centre_below() {
    let grid = create_saddle_grid(0.0, 0.8, 0.8, 0.0);
    let segments = extractor().march_squares(&grid, 0.5);
    assert_eq!(segments.len(), 2);

    // TR and BL (above) are cut off: top-right and left-bottom
    assert_approx_eq!(segments[0].start.y, 0.0, 1e-9);
    assert_approx_eq!(segments[0].end.x, 1.0, 1e-9);
    assert_approx_eq!(segments[1].start.x, 0.0, 1e-9);
    assert_approx_eq!(segments[1].end.y, 1.0, 1e-9);
}

#[test]
fn test_saddle_average_equal_to_level_takes_below_branch() {
    // [1, 0; 0, 1] averages exactly 0.5
    let grid = create_saddle_grid(1.0, 0.0, 0.0, 1.0);
    let polylines = extractor().extract(&grid, 0.5);
    assert_eq!(polylines.len(), 2);

    // Each polyline cuts one above corner: it touches the left or right edge
    // together with the top or bottom edge adjacent to that corner.
    let first = &polylines[0].points;
    assert_eq!(first, &vec![Point::new(0.0, 0.5), Point::new(0.5, 0.0)]);
}

#[test]
fn test_saddle_segments_never_cross() {
    for &(tl, tr, bl, br) in &[
        (1.0, 0.2, 0.2, 1.0),
        (0.8, 0.0, 0.0, 0.8),
        (0.2, 1.0, 1.0, 0.2),
        (0.0, 0.8, 0.8, 0.0),
    ] {
        let grid = create_saddle_grid(tl, tr, bl, br);
        let segments = extractor().march_squares(&grid, 0.5);
        assert_eq!(segments.len(), 2);
        let (a, b) = (segments[0], segments[1]);
        assert!(!segments_intersect(a.start, a.end, b.start, b.end));
    }
}

fn segments_intersect(p1: Point, p2: Point, p3: Point, p4: Point) -> bool {
    let cross = |a: Point, b: Point, c: Point| (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x);
    let d1 = cross(p3, p4, p1);
    let d2 = cross(p3, p4, p2);
    let d3 = cross(p1, p2, p3);
    let d4 = cross(p1, p2, p4);
    d1 * d2 < 0.0 && d3 * d4 < 0.0
}

// ============================================================================
// Stitching
// ============================================================================

#[test]
fn test_peak_gives_single_closed_loop() {
    let grid = create_peak_grid(21, 21);
    let polylines = extractor().extract(&grid, 0.55);

    assert_eq!(polylines.len(), 1);
    let ring = &polylines[0];
    assert!(ring.closed);
    assert_eq!(ring.first(), ring.last());

    // Cone radius at 0.55 is 0.45 * sqrt(200)
    let radius = 0.45 * 200f64.sqrt();
    let centre = Point::new(10.0, 10.0);
    for p in &ring.points {
        assert!((p.distance(&centre) - radius).abs() < 0.3, "{:?}", p);
    }
}

#[test]
fn test_each_segment_emitted_once() {
    let grid = create_hills_grid(50, 50, 3.0);
    let level = 0.37;
    let segments = extractor().march_squares(&grid, level);
    let polylines = extractor().extract(&grid, level);

    // n points per open chain carry n - 1 segments; a closed chain repeats
    // its start, so the same count holds
    let emitted: usize = polylines.iter().map(|p| p.len() - 1).sum();
    assert_eq!(emitted, segments.len());
}

#[test]
fn test_closed_polylines_end_on_start() {
    let grid = create_hills_grid(64, 48, 4.0);
    for level in [0.2, 0.37, 0.61, 0.83] {
        for polyline in extractor().extract(&grid, level) {
            assert!(polyline.len() >= 2);
            if polyline.closed {
                assert_eq!(polyline.first(), polyline.last());
                assert!(polyline.len() >= 4);
            }
        }
    }
}

#[test]
fn test_points_stay_inside_grid() {
    let grid = create_hills_grid(30, 20, 2.5);
    for polyline in extractor().extract(&grid, 0.42) {
        for p in &polyline.points {
            assert!((0.0..=29.0).contains(&p.x) && (0.0..=19.0).contains(&p.y));
        }
    }
}

#[test]
fn test_points_are_quantized() {
    let grid = create_hills_grid(30, 30, 2.0);
    for polyline in extractor().extract(&grid, 0.58) {
        for p in &polyline.points {
            assert_approx_eq!(p.x * 100.0, (p.x * 100.0).round(), 1e-6);
            assert_approx_eq!(p.y * 100.0, (p.y * 100.0).round(), 1e-6);
        }
    }
}

#[test]
fn test_nan_cells_are_skipped() {
    let grid = create_ramp_with_nans(60, 60, &[(30, 10)]);
    let polylines = extractor().extract(&grid, 0.5);

    // The cells around the NaN are dropped, splitting the line in two
    assert_eq!(polylines.len(), 2);
    for polyline in &polylines {
        assert!(!polyline.closed);
        for p in &polyline.points {
            assert!(p.x.is_finite() && p.y.is_finite());
            assert_approx_eq!(p.x, 29.5, 1e-9);
        }
    }
}

#[test]
fn test_infinite_values_are_skipped() {
    let mut data = create_ramp_grid(4, 4).into_vec();
    data[5] = f64::INFINITY;
    let grid = HeightGrid::new(4, 4, data).unwrap();
    for polyline in extractor().extract(&grid, 0.5) {
        assert!(polyline.points.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
    }
}

// ============================================================================
// Multi-level generation
// ============================================================================

#[test]
fn test_contour_levels_include_both_ends() {
    assert_eq!(contour_levels(0), vec![0.0]);
    let levels = contour_levels(20);
    assert_eq!(levels.len(), 21);
    assert_eq!(levels[0], 0.0);
    assert_eq!(levels[20], 1.0);
}

#[test]
fn test_zero_contours_evaluates_level_zero_only() {
    let grid = create_hills_grid(30, 30, 2.0);
    let config = ContourConfig {
        num_contours: 0,
        ..ContourConfig::default()
    };
    let contours = generate_all_contours(&grid, &config);
    assert!(contours.iter().all(|c| c.level_index == 0 && c.level == 0.0));
}

#[test]
fn test_contours_ordered_by_level() {
    let grid = create_hills_grid(40, 40, 3.0);
    let config = ContourConfig {
        num_contours: 10,
        ..ContourConfig::default()
    };
    let contours = generate_all_contours(&grid, &config);
    assert!(!contours.is_empty());
    assert!(contours.windows(2).all(|w| w[0].level_index <= w[1].level_index));
    for contour in &contours {
        assert_approx_eq!(contour.level, contour.level_index as f64 / 10.0, 1e-12);
    }
}

#[test]
fn test_smoothing_applied_per_polyline() {
    let grid = create_ramp_grid(20, 20);
    let config = ContourConfig {
        num_contours: 2,
        smoothing_passes: 1,
        ..ContourConfig::default()
    };
    let contours = generate_all_contours(&grid, &config);
    let raw = extractor().extract(&grid, 0.5);

    let mid: Vec<_> = contours.iter().filter(|c| c.level_index == 1).collect();
    assert_eq!(mid.len(), 1);
    assert_eq!(mid[0].polyline, smooth(&raw[0], 1));
}

#[test]
fn test_parallel_matches_sequential() {
    let grid = create_hills_grid(80, 60, 5.0);
    let sequential = ContourConfig {
        num_contours: 15,
        ..ContourConfig::default()
    };
    let parallel = ContourConfig {
        parallel: true,
        ..sequential.clone()
    };
    assert_eq!(
        generate_all_contours(&grid, &sequential),
        generate_all_contours(&grid, &parallel)
    );
}

#[test]
fn test_cancelled_before_start() {
    let grid = create_hills_grid(20, 20, 2.0);
    let cancel = CancelFlag::new();
    cancel.cancel();

    for parallel in [false, true] {
        let config = ContourConfig {
            parallel,
            ..ContourConfig::default()
        };
        let result = generate_all_contours_cancellable(&grid, &config, &cancel);
        assert!(matches!(result, Err(TopoError::Cancelled)));
    }
}

#[test]
fn test_uncancelled_matches_plain() {
    let grid = create_hills_grid(20, 20, 2.0);
    let config = ContourConfig::default();
    let result = generate_all_contours_cancellable(&grid, &config, &CancelFlag::new()).unwrap();
    assert_eq!(result, generate_all_contours(&grid, &config));
}

// ============================================================================
// End-to-end reproducibility
// ============================================================================

#[test]
fn test_round_trip_is_reproducible() {
    let (w, h) = sizes::ROUND_TRIP_GRID;
    let params = TerrainParams::default();

    let run = || {
        let noise = NoiseField::new(seeds::REFERENCE);
        let grid = generate_height_grid(&noise, w, h, &params);
        extractor()
            .extract(&grid, 0.5)
            .iter()
            .map(|polyline| smooth(polyline, 2))
            .collect::<Vec<_>>()
    };

    let first = run();
    let second = run();
    assert!(!first.is_empty());
    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.len(), b.len());
        let (fa, fb) = (a.first().unwrap(), b.first().unwrap());
        let (la, lb) = (a.last().unwrap(), b.last().unwrap());
        assert_eq!(fa.x.to_bits(), fb.x.to_bits());
        assert_eq!(fa.y.to_bits(), fb.y.to_bits());
        assert_eq!(la.x.to_bits(), lb.x.to_bits());
        assert_eq!(la.y.to_bits(), lb.y.to_bits());
    }
}
