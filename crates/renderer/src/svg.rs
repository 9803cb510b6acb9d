//! SVG export of contour polylines.
//!
//! Each contour level becomes one `<path>` element built from move/line/close
//! commands, drawn over a full-size background rectangle.

use std::fmt::Write;

use topo_common::{Contour, Polyline};

use crate::style::RenderStyle;

/// Render contours as a standalone SVG document.
pub fn render_svg(contours: &[Contour], width: usize, height: usize, style: &RenderStyle) -> String {
    let mut svg = String::with_capacity(256 + contours.len() * 64);

    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = width,
        h = height
    );
    let _ = writeln!(
        svg,
        r#"  <rect width="{}" height="{}" fill="{}" fill-opacity="{}"/>"#,
        width,
        height,
        style.background.to_hex_rgb(),
        format_number(style.background.opacity())
    );

    let stroke = style.line_color.to_hex_rgb();
    let opacity = format_number(style.line_color.opacity());

    let mut start = 0;
    while start < contours.len() {
        let level_index = contours[start].level_index;
        let end = contours[start..]
            .iter()
            .position(|c| c.level_index != level_index)
            .map_or(contours.len(), |offset| start + offset);

        let mut data = String::new();
        for contour in &contours[start..end] {
            append_path_data(&mut data, &contour.polyline);
        }

        if !data.is_empty() {
            let _ = writeln!(
                svg,
                r#"  <path data-level="{}" fill="none" stroke="{}" stroke-width="{}" stroke-opacity="{}" stroke-linecap="round" stroke-linejoin="round" d="{}"/>"#,
                level_index,
                stroke,
                format_number(style.line_width as f64),
                opacity,
                data.trim_start()
            );
        }

        start = end;
    }

    svg.push_str("</svg>\n");
    svg
}

/// Append `M x y L x y ... [Z]` for one polyline.
///
/// Polylines with fewer than two points draw nothing and are skipped.
pub fn append_path_data(data: &mut String, polyline: &Polyline) {
    let points = &polyline.points;
    if points.len() < 2 {
        return;
    }

    let _ = write!(
        data,
        " M{} {}",
        format_number(points[0].x),
        format_number(points[0].y)
    );
    for p in &points[1..] {
        let _ = write!(data, " L{} {}", format_number(p.x), format_number(p.y));
    }
    if polyline.closed {
        data.push_str(" Z");
    }
}

/// Two decimals with trailing zeros dropped.
fn format_number(value: f64) -> String {
    let s = format!("{:.2}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}
