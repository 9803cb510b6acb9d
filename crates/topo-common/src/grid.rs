//! Height grid container.

use crate::{TopoError, TopoResult};

/// Rectangular grid of height samples in row-major order.
///
/// Values produced by the terrain synthesizer lie in `[0, 1]`. The grid is
/// immutable once built; every row has the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightGrid {
    width: usize,
    height: usize,
    data: Vec<f64>,
}

impl HeightGrid {
    /// Build a grid from a row-major buffer.
    pub fn new(width: usize, height: usize, data: Vec<f64>) -> TopoResult<Self> {
        if data.len() != width * height {
            return Err(TopoError::InvalidGrid(format!(
                "buffer holds {} values, expected {}x{} = {}",
                data.len(),
                width,
                height,
                width * height
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Build a grid from nested rows, rejecting ragged input.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> TopoResult<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(width * height);
        for (index, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(TopoError::InvalidGrid(format!(
                    "row {} has {} columns, expected {}",
                    index,
                    row.len(),
                    width
                )));
            }
            data.extend(row);
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Grid filled with a single value.
    pub fn filled(width: usize, height: usize, value: f64) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Build a grid by evaluating `f(row, col)` for every cell.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for row in 0..height {
            for col in 0..width {
                data.push(f(row, col));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Value at `[row][col]`. Panics when out of bounds.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.width + col]
    }

    /// Checked access.
    pub fn try_get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.height && col < self.width {
            Some(self.data[row * self.width + col])
        } else {
            None
        }
    }

    pub fn row(&self, row: usize) -> &[f64] {
        let start = row * self.width;
        &self.data[start..start + self.width]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    /// Minimum and maximum over the finite values, `None` if there are none.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.data
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}
