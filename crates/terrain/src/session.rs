//! Animation session state.
//!
//! One session owns one noise field for its whole lifetime, so consecutive
//! frames sample the same field and the domain warp evolves without jumps.
//! Start a new session (or `reset`) for an unrelated still image.

use topo_common::HeightGrid;
use tracing::debug;

use crate::noise::NoiseField;
use crate::synth::{generate_height_grid, TerrainParams};

/// Clock advance per frame.
pub const DEFAULT_TIME_STEP: f64 = 0.02;

/// Radius, in grid cells, of the circular offset drift.
pub const DEFAULT_DRIFT_RADIUS: f64 = 10.0;

#[derive(Debug, Clone)]
pub struct AnimationSession {
    noise: NoiseField,
    base: TerrainParams,
    time: f64,
    time_step: f64,
    drift_radius: f64,
    frame: u64,
}

impl AnimationSession {
    pub fn new(noise: NoiseField, base: TerrainParams) -> Self {
        Self {
            noise,
            base,
            time: 0.0,
            time_step: DEFAULT_TIME_STEP,
            drift_radius: DEFAULT_DRIFT_RADIUS,
            frame: 0,
        }
    }

    pub fn with_seed(seed: u64, base: TerrainParams) -> Self {
        Self::new(NoiseField::new(seed), base)
    }

    pub fn with_time_step(mut self, time_step: f64) -> Self {
        self.time_step = time_step;
        self
    }

    pub fn with_drift_radius(mut self, drift_radius: f64) -> Self {
        self.drift_radius = drift_radius;
        self
    }

    pub fn noise(&self) -> &NoiseField {
        &self.noise
    }

    pub fn base_params(&self) -> &TerrainParams {
        &self.base
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    /// Number of frames produced since the session started or was reset.
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Parameters for the current clock value: the base offsets drift around a
    /// circle and the clock feeds the domain warp.
    pub fn current_params(&self) -> TerrainParams {
        let (sin_t, cos_t) = self.time.sin_cos();
        TerrainParams {
            offset_x: self.base.offset_x + sin_t * self.drift_radius,
            offset_y: self.base.offset_y + cos_t * self.drift_radius,
            time: self.base.time + self.time,
            ..self.base.clone()
        }
    }

    /// Advance the clock by one step and return the new frame's parameters.
    pub fn advance(&mut self) -> TerrainParams {
        self.time += self.time_step;
        self.frame += 1;
        self.current_params()
    }

    /// Advance one frame and synthesize its height grid.
    pub fn next_grid(&mut self, width: usize, height: usize) -> HeightGrid {
        let params = self.advance();
        debug!(frame = self.frame, time = self.time, "Synthesizing animation frame");
        generate_height_grid(&self.noise, width, height, &params)
    }

    /// Replace the noise field and rewind the clock.
    pub fn reset(&mut self, noise: NoiseField) {
        self.noise = noise;
        self.time = 0.0;
        self.frame = 0;
    }
}
