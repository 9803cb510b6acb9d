//! Tests for PNG encoding functionality.
//!
//! Tests the indexed PNG and RGBA PNG encoders, including:
//! - PNG format selection (auto mode)
//! - Decoding our output back with the image crate
//! - Contour-map-like frames (background plus anti-aliased strokes)

use renderer::png::{create_png, create_png_auto, create_png_indexed, PNG_SIGNATURE};
use topo_common::TopoError;

// ============================================================================
// Helper functions
// ============================================================================

/// A dark frame crossed by a few grey diagonal lines with soft edges.
fn generate_contour_like_pixels(width: usize, height: usize) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(width * height * 4);
    for y in 0..height {
        for x in 0..width {
            let d = (x + y) % 16;
            let px = match d {
                0 => [204, 204, 204, 255],
                1 | 15 => [136, 136, 136, 255],
                _ => [34, 34, 34, 255],
            };
            pixels.extend_from_slice(&px);
        }
    }
    pixels
}

/// Color type byte from the IHDR chunk.
fn color_type(png: &[u8]) -> u8 {
    // signature (8) + length (4) + "IHDR" (4) + width (4) + height (4) + depth (1)
    png[25]
}

fn decode(png: &[u8]) -> image::RgbaImage {
    image::load_from_memory(png)
        .expect("our PNG should decode")
        .to_rgba8()
}

// ============================================================================
// Encoding
// ============================================================================

#[test]
fn test_signature_and_ihdr() {
    let pixels = generate_contour_like_pixels(10, 6);
    let png = create_png(&pixels, 10, 6).unwrap();

    assert_eq!(&png[0..8], &PNG_SIGNATURE);
    assert_eq!(&png[12..16], b"IHDR");
    assert_eq!(u32::from_be_bytes([png[16], png[17], png[18], png[19]]), 10);
    assert_eq!(u32::from_be_bytes([png[20], png[21], png[22], png[23]]), 6);
    assert_eq!(color_type(&png), 6);
    assert_eq!(&png[png.len() - 8..png.len() - 4], b"IEND");
}

#[test]
fn test_rgba_round_trip() {
    let pixels = generate_contour_like_pixels(33, 17);
    let png = create_png(&pixels, 33, 17).unwrap();
    let decoded = decode(&png);
    assert_eq!(decoded.dimensions(), (33, 17));
    assert_eq!(decoded.into_raw(), pixels);
}

#[test]
fn test_auto_selects_indexed_for_few_colors() {
    let pixels = generate_contour_like_pixels(128, 128);
    let png = create_png_auto(&pixels, 128, 128).unwrap();
    assert_eq!(color_type(&png), 3);
    assert_eq!(decode(&png).into_raw(), pixels);
}

#[test]
fn test_auto_indexed_smaller_than_rgba() {
    let pixels = generate_contour_like_pixels(256, 256);
    let indexed = create_png_auto(&pixels, 256, 256).unwrap();
    let rgba = create_png(&pixels, 256, 256).unwrap();
    assert!(indexed.len() < rgba.len());
}

#[test]
fn test_auto_falls_back_to_rgba() {
    // 512 distinct colors
    let mut pixels = Vec::with_capacity(32 * 16 * 4);
    for i in 0..(32 * 16) as u32 {
        pixels.extend_from_slice(&[(i % 256) as u8, (i / 256) as u8, 7, 255]);
    }
    let png = create_png_auto(&pixels, 32, 16).unwrap();
    assert_eq!(color_type(&png), 6);
    assert_eq!(decode(&png).into_raw(), pixels);
}

#[test]
fn test_translucent_palette_has_trns() {
    let pixels = [34, 34, 34, 255, 204, 204, 204, 153];
    let png = create_png_auto(&pixels, 2, 1).unwrap();
    assert!(png.windows(4).any(|w| w == b"tRNS"));
    assert_eq!(decode(&png).into_raw(), pixels.to_vec());
}

#[test]
fn test_opaque_palette_has_no_trns() {
    let pixels = generate_contour_like_pixels(8, 8);
    let png = create_png_auto(&pixels, 8, 8).unwrap();
    assert!(!png.windows(4).any(|w| w == b"tRNS"));
}

#[test]
fn test_single_pixel() {
    let png = create_png_auto(&[1, 2, 3, 255], 1, 1).unwrap();
    assert_eq!(decode(&png).into_raw(), vec![1, 2, 3, 255]);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_zero_dimensions_rejected() {
    assert!(matches!(
        create_png(&[], 0, 0),
        Err(TopoError::EncodeError(_))
    ));
    assert!(create_png_auto(&[], 0, 5).is_err());
}

#[test]
fn test_buffer_size_mismatch_rejected() {
    assert!(create_png(&[0; 15], 2, 2).is_err());
    assert!(create_png_indexed(2, 2, &[(0, 0, 0, 255)], &[0; 3]).is_err());
}
