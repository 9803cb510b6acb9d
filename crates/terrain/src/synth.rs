//! Height grid synthesis from layered, domain-warped noise.

use serde::{Deserialize, Serialize};
use topo_common::HeightGrid;
use tracing::debug;

use crate::noise::NoiseField;

/// Octaves used for each domain-warp displacement sample.
const WARP_OCTAVES: u32 = 3;

/// Persistence used for the domain-warp displacement samples.
const WARP_PERSISTENCE: f64 = 0.5;

/// Noise-space offsets that decorrelate the two warp fields from the primary
/// field and from each other.
const WARP_OFFSET_U: (f64, f64) = (5.2, 1.3);
const WARP_OFFSET_V: (f64, f64) = (1.7, 9.2);

/// Parameters for one height grid generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainParams {
    /// Grid-space offset added to every column index
    pub offset_x: f64,
    /// Grid-space offset added to every row index
    pub offset_y: f64,
    /// Grid cell to noise-space scale factor
    pub scale: f64,
    /// Animation clock, drives the domain warp
    pub time: f64,
    /// Displacement strength in noise-space units (0 disables warping)
    pub warp_amplitude: f64,
    /// Frequency multiplier of the warp fields relative to the primary field
    pub warp_frequency: f64,
    /// Rotation of the sampling plane about the grid centre, in radians
    pub rotation: f64,
    /// Added to every normalized value before clamping
    pub bias: f64,
    pub octaves: u32,
    pub persistence: f64,
    /// Apply the 3x3 box blur post-pass. On by default and for all rendered
    /// output; `false` is a diagnostics switch that exposes the raw field.
    pub blur: bool,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            scale: 0.02,
            time: 0.0,
            warp_amplitude: 0.0,
            warp_frequency: 1.0,
            rotation: 0.0,
            bias: 0.0,
            octaves: 5,
            persistence: 0.55,
            blur: true,
        }
    }
}

impl TerrainParams {
    /// Copy of these parameters at a different animation time.
    pub fn at_time(&self, time: f64) -> Self {
        Self {
            time,
            ..self.clone()
        }
    }
}

/// Generate a `width` x `height` grid of heights in [0, 1] from `noise`.
///
/// The noise field is borrowed so an animation can reuse one instance across
/// frames and keep the warp continuous.
pub fn generate_height_grid(
    noise: &NoiseField,
    width: usize,
    height: usize,
    params: &TerrainParams,
) -> HeightGrid {
    let (sin_r, cos_r) = params.rotation.sin_cos();
    let rotate = params.rotation != 0.0;
    // rotation pivot in noise space
    let cx = (width as f64 / 2.0 + params.offset_x) * params.scale;
    let cy = (height as f64 / 2.0 + params.offset_y) * params.scale;

    let raw = HeightGrid::from_fn(width, height, |y, x| {
        let mut nx = (x as f64 + params.offset_x) * params.scale;
        let mut ny = (y as f64 + params.offset_y) * params.scale;

        if rotate {
            let dx = nx - cx;
            let dy = ny - cy;
            nx = cx + dx * cos_r - dy * sin_r;
            ny = cy + dx * sin_r + dy * cos_r;
        }

        let (wx, wy) = if params.warp_amplitude > 0.0 {
            let (u, v) = warp_displacement(noise, nx, ny, params);
            (nx + params.warp_amplitude * u, ny + params.warp_amplitude * v)
        } else {
            (nx, ny)
        };

        let value = noise.octave_noise(wx, wy, params.octaves, params.persistence);
        ((value + 1.0) / 2.0 + params.bias).clamp(0.0, 1.0)
    });

    let grid = if params.blur { box_blur(&raw) } else { raw };

    if let Some((min, max)) = grid.value_range() {
        debug!(
            width,
            height,
            min,
            max,
            time = params.time,
            warp = params.warp_amplitude,
            "Generated height grid"
        );
    }

    grid
}

/// Stateless generation: a fresh noise field per call, seeded when a seed is
/// given and from entropy otherwise.
pub fn generate_still(
    seed: Option<u64>,
    width: usize,
    height: usize,
    params: &TerrainParams,
) -> HeightGrid {
    let noise = match seed {
        Some(seed) => NoiseField::new(seed),
        None => NoiseField::random(),
    };
    generate_height_grid(&noise, width, height, params)
}

/// Two time-shifted fbm samples used as the (u, v) warp displacement.
fn warp_displacement(noise: &NoiseField, nx: f64, ny: f64, params: &TerrainParams) -> (f64, f64) {
    let fx = nx * params.warp_frequency;
    let fy = ny * params.warp_frequency;
    let t = params.time;

    let u = noise.octave_noise(
        fx + WARP_OFFSET_U.0 + t,
        fy + WARP_OFFSET_U.1,
        WARP_OCTAVES,
        WARP_PERSISTENCE,
    );
    let v = noise.octave_noise(
        fx + WARP_OFFSET_V.0,
        fy + WARP_OFFSET_V.1 + t,
        WARP_OCTAVES,
        WARP_PERSISTENCE,
    );
    (u, v)
}

/// 3x3 box blur; edge cells average only their in-bounds neighbours.
pub fn box_blur(grid: &HeightGrid) -> HeightGrid {
    let width = grid.width();
    let height = grid.height();

    HeightGrid::from_fn(width, height, |y, x| {
        let y_lo = y.saturating_sub(1);
        let y_hi = (y + 1).min(height - 1);
        let x_lo = x.saturating_sub(1);
        let x_hi = (x + 1).min(width - 1);

        let mut sum = 0.0;
        let mut count = 0usize;
        for yy in y_lo..=y_hi {
            for xx in x_lo..=x_hi {
                sum += grid.get(yy, xx);
                count += 1;
            }
        }
        sum / count as f64
    })
}
