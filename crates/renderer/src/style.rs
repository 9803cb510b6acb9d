//! Style configuration for contour map rendering.

use serde::{Deserialize, Serialize};

/// Color representation supporting multiple formats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Color {
    /// Hex string: "#RRGGBB" or "#RRGGBBAA"
    Hex(String),

    /// RGB array: [r, g, b] or [r, g, b, a]
    Array(Vec<u8>),

    /// Explicit RGBA
    Rgba { r: u8, g: u8, b: u8, a: u8 },
}

impl Color {
    pub fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color::Rgba { r, g, b, a }
    }

    /// Convert to RGBA tuple. Malformed hex strings fall back to opaque black.
    pub fn to_rgba(&self) -> (u8, u8, u8, u8) {
        match self {
            Color::Hex(s) => parse_hex_color(s).unwrap_or((0, 0, 0, 255)),
            Color::Array(arr) => {
                let r = arr.first().copied().unwrap_or(0);
                let g = arr.get(1).copied().unwrap_or(0);
                let b = arr.get(2).copied().unwrap_or(0);
                let a = arr.get(3).copied().unwrap_or(255);
                (r, g, b, a)
            }
            Color::Rgba { r, g, b, a } => (*r, *g, *b, *a),
        }
    }

    /// Whether the color parses to a concrete value.
    pub fn is_valid(&self) -> bool {
        match self {
            Color::Hex(s) => parse_hex_color(s).is_some(),
            Color::Array(arr) => (3..=4).contains(&arr.len()),
            Color::Rgba { .. } => true,
        }
    }

    /// `#rrggbb` form, dropping alpha.
    pub fn to_hex_rgb(&self) -> String {
        let (r, g, b, _) = self.to_rgba();
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }

    /// Alpha as a 0..1 opacity.
    pub fn opacity(&self) -> f64 {
        self.to_rgba().3 as f64 / 255.0
    }
}

fn parse_hex_color(s: &str) -> Option<(u8, u8, u8, u8)> {
    let s = s.trim_start_matches('#');
    if !s.is_ascii() {
        return None;
    }

    let channel = |i: usize| u8::from_str_radix(&s[i..i + 2], 16).ok();

    match s.len() {
        6 => Some((channel(0)?, channel(2)?, channel(4)?, 255)),
        8 => Some((channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
        _ => None,
    }
}

/// How contour lines are painted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderStyle {
    pub background: Color,
    pub line_color: Color,
    /// Stroke width in pixels
    pub line_width: f32,
    pub anti_alias: bool,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            background: Color::Hex("#222222".to_string()),
            // rgba(204, 204, 204, 0.6)
            line_color: Color::rgba(204, 204, 204, 153),
            line_width: 1.0,
            anti_alias: true,
        }
    }
}

impl RenderStyle {
    pub fn validate(&self) -> Result<(), String> {
        if !self.background.is_valid() {
            return Err(format!("invalid background color {:?}", self.background));
        }
        if !self.line_color.is_valid() {
            return Err(format!("invalid line color {:?}", self.line_color));
        }
        if !(self.line_width.is_finite() && self.line_width > 0.0) {
            return Err(format!("line width must be positive, got {}", self.line_width));
        }
        Ok(())
    }
}
