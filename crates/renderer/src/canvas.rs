//! Raster drawing of contour polylines with tiny-skia.

use tiny_skia::{LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};
use topo_common::{Contour, HeightGrid, TopoError, TopoResult};

use crate::contour::{generate_all_contours, ContourConfig, ContourExtractor};
use crate::style::RenderStyle;

/// Render contours to an RGBA canvas using tiny-skia.
///
/// The canvas is filled with the style background, then every polyline is
/// stroked as its own path. Closed polylines are closed in the path so the
/// stroke joins cleanly where the loop meets itself. The returned buffer is
/// straight (non-premultiplied) RGBA, ready for the PNG encoder.
pub fn render_contours_to_canvas(
    contours: &[Contour],
    width: usize,
    height: usize,
    style: &RenderStyle,
) -> TopoResult<Vec<u8>> {
    let mut pixmap = Pixmap::new(width as u32, height as u32).ok_or_else(|| {
        TopoError::RenderError(format!("cannot allocate a {}x{} canvas", width, height))
    })?;

    let (br, bg, bb, ba) = style.background.to_rgba();
    pixmap.fill(tiny_skia::Color::from_rgba8(br, bg, bb, ba));

    let (r, g, b, a) = style.line_color.to_rgba();
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = style.anti_alias;

    let stroke = Stroke {
        width: style.line_width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    };

    let mut stroked = 0usize;
    for contour in contours {
        let points = &contour.polyline.points;
        if points.len() < 2 {
            continue;
        }

        let mut pb = PathBuilder::new();
        pb.move_to(points[0].x as f32, points[0].y as f32);
        for point in &points[1..] {
            pb.line_to(point.x as f32, point.y as f32);
        }
        if contour.polyline.closed {
            pb.close();
        }

        if let Some(path) = pb.finish() {
            pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
            stroked += 1;
        }
    }

    tracing::debug!(width, height, stroked, "Rendered contours to canvas");

    // tiny-skia stores premultiplied pixels
    let mut rgba = Vec::with_capacity(width * height * 4);
    for pixel in pixmap.pixels() {
        let c = pixel.demultiply();
        rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    Ok(rgba)
}

/// High-level entry point: contour a height grid and draw it on a
/// `width` x `height` canvas.
///
/// The grid is stretched over the whole canvas, one grid cell per
/// `width / grid_width` pixels. The extractor geometry in `config` is
/// replaced by the canvas mapping.
pub fn render_height_grid(
    grid: &HeightGrid,
    width: usize,
    height: usize,
    config: &ContourConfig,
    style: &RenderStyle,
) -> TopoResult<Vec<u8>> {
    let contours = generate_all_contours(grid, &canvas_config(grid, width, height, config));
    render_contours_to_canvas(&contours, width, height, style)
}

/// Copy of `config` whose extractor maps `grid` onto a `width` x `height`
/// canvas, keeping its quantum and closing tolerance.
pub fn canvas_config(
    grid: &HeightGrid,
    width: usize,
    height: usize,
    config: &ContourConfig,
) -> ContourConfig {
    let mapping = ContourExtractor::for_canvas(grid.width(), grid.height(), width, height);
    ContourConfig {
        extractor: ContourExtractor {
            cell_width: mapping.cell_width,
            cell_height: mapping.cell_height,
            ..config.extractor
        },
        ..config.clone()
    }
}
