//! Renderer configuration.
//!
//! Settings come from three layers, later ones winning:
//! - built-in defaults
//! - an optional YAML file (`--config`), every section optional
//! - command-line flags and their environment variables
//!
//! All clamping of numeric parameters happens here, before anything reaches
//! the terrain or contour crates.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use renderer::contour::{ContourConfig, ContourExtractor};
use renderer::export::DEFAULT_FRAME_DELAY_MS;
use renderer::style::RenderStyle;
use serde::{Deserialize, Serialize};
use terrain::session::{DEFAULT_DRIFT_RADIUS, DEFAULT_TIME_STEP};
use terrain::TerrainParams;

/// Largest accepted grid edge, in cells.
pub const MAX_GRID_SIZE: usize = 2048;

/// Largest accepted canvas edge, in pixels.
pub const MAX_CANVAS_SIZE: usize = 8192;

/// Largest accepted octave count.
pub const MAX_OCTAVES: u32 = 8;

/// Largest accepted number of smoothing passes (each pass doubles the points).
pub const MAX_SMOOTHING_PASSES: u32 = 6;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopoConfig {
    /// Noise seed; a fresh random seed is drawn when absent
    pub seed: Option<u64>,
    pub grid: GridConfig,
    pub canvas: CanvasConfig,
    pub terrain: TerrainParams,
    pub contours: ContourSettings,
    pub style: RenderStyle,
    pub animation: AnimationConfig,
    pub logging: LoggingConfig,
}

/// Height grid resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub width: usize,
    pub height: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 150,
            height: 150,
        }
    }
}

/// Output image size in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: usize,
    pub height: usize,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 600,
            height: 600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContourSettings {
    /// Number of bands; levels are i / count for i in 0..=count
    pub count: usize,
    pub smoothing_passes: u32,
    /// Extract levels in parallel
    pub parallel: bool,
}

impl Default for ContourSettings {
    fn default() -> Self {
        let defaults = ContourConfig::default();
        Self {
            count: defaults.num_contours,
            smoothing_passes: defaults.smoothing_passes,
            parallel: defaults.parallel,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub frames: usize,
    /// Clock advance per frame
    pub time_step: f64,
    /// Radius of the circular offset drift, in grid cells
    pub drift_radius: f64,
    /// Display time of each GIF frame
    pub frame_delay_ms: u32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            frames: 120,
            time_step: DEFAULT_TIME_STEP,
            drift_radius: DEFAULT_DRIFT_RADIUS,
            frame_delay_ms: DEFAULT_FRAME_DELAY_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Load a YAML configuration file. Missing sections take their defaults.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<TopoConfig> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read config from {:?}", path.as_ref()))?;

    parse_config(&content)
        .with_context(|| format!("Failed to parse config from {:?}", path.as_ref()))
}

/// Parse YAML configuration text. Empty text yields the defaults.
pub fn parse_config(content: &str) -> Result<TopoConfig> {
    if content.trim().is_empty() {
        return Ok(TopoConfig::default());
    }
    let config: TopoConfig = serde_yaml::from_str(content)?;
    Ok(config)
}

impl TopoConfig {
    /// Contour pipeline configuration mapping the grid onto the canvas.
    pub fn contour_config(&self) -> ContourConfig {
        ContourConfig {
            num_contours: self.contours.count,
            smoothing_passes: self.contours.smoothing_passes,
            extractor: ContourExtractor::for_canvas(
                self.grid.width,
                self.grid.height,
                self.canvas.width,
                self.canvas.height,
            ),
            parallel: self.contours.parallel,
        }
    }

    /// Reject settings that cannot be repaired by clamping.
    pub fn validate(&self) -> Result<()> {
        self.style
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid style: {}", e))?;

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        anyhow::ensure!(
            valid_levels.contains(&self.logging.level.to_lowercase().as_str()),
            "Invalid log level: {}. Must be one of: {:?}",
            self.logging.level,
            valid_levels
        );

        Ok(())
    }

    /// Clamp numeric settings into their working ranges.
    ///
    /// Returns one message per adjusted value, for the caller to log.
    pub fn clamp(&mut self) -> Vec<String> {
        let mut notes = Vec::new();

        clamp_usize(&mut notes, "grid.width", &mut self.grid.width, 2, MAX_GRID_SIZE);
        clamp_usize(&mut notes, "grid.height", &mut self.grid.height, 2, MAX_GRID_SIZE);
        clamp_usize(&mut notes, "canvas.width", &mut self.canvas.width, 1, MAX_CANVAS_SIZE);
        clamp_usize(&mut notes, "canvas.height", &mut self.canvas.height, 1, MAX_CANVAS_SIZE);

        let defaults = TerrainParams::default();
        let t = &mut self.terrain;
        replace_unless(&mut notes, "terrain.offset_x", &mut t.offset_x, 0.0, |v| v.is_finite());
        replace_unless(&mut notes, "terrain.offset_y", &mut t.offset_y, 0.0, |v| v.is_finite());
        replace_unless(&mut notes, "terrain.scale", &mut t.scale, defaults.scale, |v| {
            v.is_finite() && v > 0.0
        });
        replace_unless(&mut notes, "terrain.time", &mut t.time, 0.0, |v| v.is_finite());
        replace_unless(&mut notes, "terrain.warp_amplitude", &mut t.warp_amplitude, 0.0, |v| {
            v.is_finite() && v >= 0.0
        });
        replace_unless(
            &mut notes,
            "terrain.warp_frequency",
            &mut t.warp_frequency,
            defaults.warp_frequency,
            |v| v.is_finite() && v > 0.0,
        );
        replace_unless(&mut notes, "terrain.rotation", &mut t.rotation, 0.0, |v| v.is_finite());
        replace_unless(&mut notes, "terrain.bias", &mut t.bias, 0.0, |v| v.is_finite());
        replace_unless(
            &mut notes,
            "terrain.persistence",
            &mut t.persistence,
            defaults.persistence,
            |v| v.is_finite() && v > 0.0 && v <= 1.0,
        );
        if t.octaves == 0 || t.octaves > MAX_OCTAVES {
            let clamped = t.octaves.clamp(1, MAX_OCTAVES);
            notes.push(format!("terrain.octaves {} clamped to {}", t.octaves, clamped));
            t.octaves = clamped;
        }

        if self.contours.smoothing_passes > MAX_SMOOTHING_PASSES {
            notes.push(format!(
                "contours.smoothing_passes {} clamped to {}",
                self.contours.smoothing_passes, MAX_SMOOTHING_PASSES
            ));
            self.contours.smoothing_passes = MAX_SMOOTHING_PASSES;
        }

        let a = &mut self.animation;
        if a.frames == 0 {
            notes.push("animation.frames 0 raised to 1".to_string());
            a.frames = 1;
        }
        replace_unless(
            &mut notes,
            "animation.time_step",
            &mut a.time_step,
            DEFAULT_TIME_STEP,
            |v| v.is_finite(),
        );
        replace_unless(
            &mut notes,
            "animation.drift_radius",
            &mut a.drift_radius,
            DEFAULT_DRIFT_RADIUS,
            |v| v.is_finite() && v >= 0.0,
        );
        if a.frame_delay_ms == 0 {
            notes.push(format!(
                "animation.frame_delay_ms 0 raised to {}",
                DEFAULT_FRAME_DELAY_MS
            ));
            a.frame_delay_ms = DEFAULT_FRAME_DELAY_MS;
        }

        notes
    }
}

fn clamp_usize(notes: &mut Vec<String>, name: &str, value: &mut usize, min: usize, max: usize) {
    let clamped = (*value).clamp(min, max);
    if clamped != *value {
        notes.push(format!("{} {} clamped to {}", name, value, clamped));
        *value = clamped;
    }
}

fn replace_unless(
    notes: &mut Vec<String>,
    name: &str,
    value: &mut f64,
    fallback: f64,
    valid: impl Fn(f64) -> bool,
) {
    if !valid(*value) {
        notes.push(format!("{} {} replaced with {}", name, value, fallback));
        *value = fallback;
    }
}
