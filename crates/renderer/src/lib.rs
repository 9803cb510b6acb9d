//! Contour extraction and rendering for topographic maps.
//!
//! Implements:
//! - Contour lines (marching squares with saddle disambiguation)
//! - Chaikin smoothing
//! - Raster drawing (tiny-skia) and PNG encoding
//! - SVG export
//! - Animation frame sinks (PNG sequence, GIF)

pub mod canvas;
pub mod contour;
pub mod export;
pub mod png;
pub mod smooth;
pub mod style;
pub mod svg;

pub use canvas::{render_contours_to_canvas, render_height_grid};
pub use contour::{
    contour_levels, generate_all_contours, generate_all_contours_cancellable, CancelFlag,
    ContourConfig, ContourExtractor,
};
pub use export::{FrameSink, GifSink, PngSequenceSink};
pub use smooth::{chaikin, smooth};
pub use style::{Color, RenderStyle};
