//! Test height grid generators.
//!
//! These generators create predictable, verifiable height fields whose
//! contours are known in closed form, so extraction results can be checked
//! against geometry instead of snapshots.

use topo_common::HeightGrid;

/// Creates a grid filled with a constant value.
///
/// No strict crossing exists at any level, so every extraction is empty.
pub fn create_constant_grid(width: usize, height: usize, value: f64) -> HeightGrid {
    HeightGrid::filled(width, height, value)
}

/// Creates a linear ramp from 0 (column 0) to 1 (last column).
///
/// The level-0.5 contour is the vertical line at `x = (width - 1) / 2`.
///
/// # Example
///
/// ```
/// use test_utils::create_ramp_grid;
///
/// let grid = create_ramp_grid(5, 3);
/// assert_eq!(grid.get(0, 0), 0.0);
/// assert_eq!(grid.get(2, 4), 1.0);
/// ```
pub fn create_ramp_grid(width: usize, height: usize) -> HeightGrid {
    let span = width.saturating_sub(1).max(1) as f64;
    HeightGrid::from_fn(width, height, |_, col| col as f64 / span)
}

/// Creates a linear ramp from 0 (row 0) to 1 (last row).
pub fn create_vertical_ramp_grid(width: usize, height: usize) -> HeightGrid {
    let span = height.saturating_sub(1).max(1) as f64;
    HeightGrid::from_fn(width, height, |row, _| row as f64 / span)
}

/// Creates a cone: 1 at the grid centre falling linearly with distance.
///
/// Any level strictly between the rim and the peak yields a single closed
/// loop around the centre.
pub fn create_peak_grid(width: usize, height: usize) -> HeightGrid {
    let cx = (width as f64 - 1.0) / 2.0;
    let cy = (height as f64 - 1.0) / 2.0;
    let max_dist = (cx * cx + cy * cy).sqrt().max(1.0);
    HeightGrid::from_fn(width, height, |row, col| {
        let dx = col as f64 - cx;
        let dy = row as f64 - cy;
        1.0 - (dx * dx + dy * dy).sqrt() / max_dist
    })
}

/// Creates the 2x2 saddle cell `[[tl, tr], [bl, br]]`.
pub fn create_saddle_grid(tl: f64, tr: f64, bl: f64, br: f64) -> HeightGrid {
    HeightGrid::from_rows(vec![vec![tl, tr], vec![bl, br]]).expect("2x2 rows are rectangular")
}

/// Creates overlapping sine hills in [0, 1], giving many nested loops and
/// saddles at every level.
pub fn create_hills_grid(width: usize, height: usize, periods: f64) -> HeightGrid {
    use std::f64::consts::PI;
    HeightGrid::from_fn(width, height, |row, col| {
        let fx = col as f64 / width.max(1) as f64;
        let fy = row as f64 / height.max(1) as f64;
        let v = (fx * PI * periods).sin() * (fy * PI * periods).sin();
        (v + 1.0) / 2.0
    })
}

/// Creates a grid with NaN values at the given (col, row) positions on top of
/// a column ramp.
pub fn create_ramp_with_nans(
    width: usize,
    height: usize,
    nan_positions: &[(usize, usize)],
) -> HeightGrid {
    let ramp = create_ramp_grid(width, height);
    let mut data = ramp.into_vec();
    for &(col, row) in nan_positions {
        if col < width && row < height {
            data[row * width + col] = f64::NAN;
        }
    }
    HeightGrid::new(width, height, data).expect("dimensions unchanged")
}
