//! Rendering commands: still image, animation and contour dump.
//!
//! Every command runs the same synchronous pass (synthesize the height grid,
//! extract and smooth every contour level, hand the result to a sink) and
//! finishes it before the next one starts.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use renderer::canvas::render_contours_to_canvas;
use renderer::contour::generate_all_contours;
use renderer::export::{contours_to_json, FrameSink, GifSink, PngSequenceSink};
use renderer::png::create_png_auto;
use renderer::svg::render_svg;
use terrain::{generate_height_grid, AnimationSession, NoiseField};
use topo_common::{Contour, HeightGrid};
use tracing::{debug, info};

use crate::config::TopoConfig;

/// Output format of a still image, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StillFormat {
    Png,
    Svg,
}

impl StillFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        match extension(path).as_deref() {
            Some("png") => Ok(StillFormat::Png),
            Some("svg") => Ok(StillFormat::Svg),
            other => bail!(
                "Unsupported still image extension {:?} for {:?} (expected .png or .svg)",
                other,
                path
            ),
        }
    }
}

/// Destination of an animation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnimationTarget {
    /// One animated GIF file
    Gif(PathBuf),
    /// A directory of numbered PNG frames
    PngSequence(PathBuf),
}

impl AnimationTarget {
    /// `.gif` paths become a GIF; anything else is treated as a directory.
    pub fn from_path(path: &Path) -> Self {
        match extension(path).as_deref() {
            Some("gif") => AnimationTarget::Gif(path.to_path_buf()),
            _ => AnimationTarget::PngSequence(path.to_path_buf()),
        }
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Noise field for a still image: seeded when the config carries a seed,
/// fresh entropy otherwise.
pub fn still_noise(config: &TopoConfig) -> NoiseField {
    match config.seed {
        Some(seed) => NoiseField::new(seed),
        None => NoiseField::random(),
    }
}

/// Synthesize the still height grid and extract its contours.
pub fn still_contours(config: &TopoConfig, noise: &NoiseField) -> (HeightGrid, Vec<Contour>) {
    let grid = generate_height_grid(noise, config.grid.width, config.grid.height, &config.terrain);
    let contours = generate_all_contours(&grid, &config.contour_config());
    (grid, contours)
}

/// Render one frame to `output` as PNG or SVG.
pub fn render_still(config: &TopoConfig, output: &Path) -> Result<()> {
    let format = StillFormat::from_path(output)?;
    let started = Instant::now();

    let noise = still_noise(config);
    let (_, contours) = still_contours(config, &noise);
    let (width, height) = (config.canvas.width, config.canvas.height);

    let bytes = match format {
        StillFormat::Png => {
            let rgba = render_contours_to_canvas(&contours, width, height, &config.style)?;
            create_png_auto(&rgba, width, height)?
        }
        StillFormat::Svg => render_svg(&contours, width, height, &config.style).into_bytes(),
    };

    write_output(output, &bytes)?;

    info!(
        path = %output.display(),
        seed = ?noise.seed(),
        contours = contours.len(),
        bytes = bytes.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Rendered still image"
    );
    Ok(())
}

/// Write the contour polylines of one still frame as JSON.
pub fn dump_contours(config: &TopoConfig, output: &Path) -> Result<()> {
    let noise = still_noise(config);
    let (_, contours) = still_contours(config, &noise);
    let json = contours_to_json(&contours)?;
    write_output(output, json.as_bytes())?;

    info!(
        path = %output.display(),
        seed = ?noise.seed(),
        contours = contours.len(),
        "Wrote contour polylines"
    );
    Ok(())
}

/// Render `config.animation.frames` frames into the target.
pub fn render_animation(config: &TopoConfig, output: &Path) -> Result<usize> {
    let mut sink: Box<dyn FrameSink> = match AnimationTarget::from_path(output) {
        AnimationTarget::Gif(path) => {
            create_parent_dir(&path)?;
            Box::new(
                GifSink::create(&path, config.animation.frame_delay_ms)
                    .with_context(|| format!("Failed to create GIF {:?}", path))?,
            )
        }
        AnimationTarget::PngSequence(dir) => Box::new(
            PngSequenceSink::create(&dir, "frame")
                .with_context(|| format!("Failed to create frame directory {:?}", dir))?,
        ),
    };

    let frames = animate(config, sink.as_mut())?;
    sink.finish()?;

    info!(path = %output.display(), frames, "Rendered animation");
    Ok(frames)
}

/// Drive one animation session into `sink`, frame by frame.
///
/// One noise field is shared by the whole session so consecutive frames
/// evolve continuously.
pub fn animate(config: &TopoConfig, sink: &mut dyn FrameSink) -> Result<usize> {
    let noise = still_noise(config);
    let seed = noise.seed();
    let mut session = AnimationSession::new(noise, config.terrain.clone())
        .with_time_step(config.animation.time_step)
        .with_drift_radius(config.animation.drift_radius);

    let contour_config = config.contour_config();
    let (width, height) = (config.canvas.width, config.canvas.height);
    let started = Instant::now();

    info!(seed = ?seed, frames = config.animation.frames, "Starting animation");

    for frame in 0..config.animation.frames {
        let grid = session.next_grid(config.grid.width, config.grid.height);
        let contours = generate_all_contours(&grid, &contour_config);
        let rgba = render_contours_to_canvas(&contours, width, height, &config.style)?;
        sink.push_frame(&rgba, width, height)
            .with_context(|| format!("Failed to write frame {}", frame))?;

        debug!(frame, time = session.time(), contours = contours.len(), "Frame done");
    }

    let frames = sink.frames_written();
    debug!(
        frames,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Animation pass complete"
    );
    Ok(frames)
}

fn create_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {:?}", parent))?;
    }
    Ok(())
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    create_parent_dir(path)?;
    fs::write(path, bytes).with_context(|| format!("Failed to write {:?}", path))
}
