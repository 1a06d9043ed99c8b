//! Minimal raster painting for the strip canvas.
//!
//! Fractional coordinates are snapped by rounding each edge, so adjacent
//! rectangles share edges exactly and the output is fully deterministic.

use crate::Rgb;

use ab_glyph::{Font, FontArc, GlyphId, ScaleFont, point};
use image::{Rgba, RgbaImage};

/// Rounds `[start, start + len)` to pixel edges clamped to `0..=limit`.
fn span(start: f32, len: f32, limit: u32) -> (u32, u32) {
    let lo = start.round().clamp(0.0, limit as f32) as u32;
    let hi = (start + len).round().clamp(0.0, limit as f32) as u32;
    (lo, hi.max(lo))
}

/// Pixel bounds `(x, y, width, height)` of a fractional rectangle.
pub(crate) fn pixel_rect(canvas: &RgbaImage, x: f32, y: f32, w: f32, h: f32) -> (u32, u32, u32, u32) {
    let (x0, x1) = span(x, w, canvas.width());
    let (y0, y1) = span(y, h, canvas.height());
    (x0, y0, x1 - x0, y1 - y0)
}

pub(crate) fn fill_rect(canvas: &mut RgbaImage, x: f32, y: f32, w: f32, h: f32, color: Rgb) {
    let (x0, y0, pw, ph) = pixel_rect(canvas, x, y, w, h);
    let px = Rgba([color.0, color.1, color.2, 255]);
    for yy in y0..y0 + ph {
        for xx in x0..x0 + pw {
            canvas.put_pixel(xx, yy, px);
        }
    }
}

/// Source-over blend of `color` at `alpha` (0..=1) onto an opaque canvas.
fn blend(canvas: &mut RgbaImage, x: i64, y: i64, color: Rgb, alpha: f32) {
    if x < 0 || y < 0 || x >= i64::from(canvas.width()) || y >= i64::from(canvas.height()) {
        return;
    }
    let alpha = alpha.clamp(0.0, 1.0);
    if alpha <= 0.0 {
        return;
    }
    let dst = canvas.get_pixel_mut(x as u32, y as u32);
    let mix = |d: u8, s: u8| (f32::from(s) * alpha + f32::from(d) * (1.0 - alpha)).round() as u8;
    dst.0 = [mix(dst.0[0], color.0), mix(dst.0[1], color.1), mix(dst.0[2], color.2), 255];
}

/// Paints a small filled heart inside the `size`-sided box at `(x, y)`.
///
/// Coverage is sampled on a 4x4 grid per pixel against the implicit heart
/// curve `(u² + v² - 1)³ - u²v³ <= 0`.
pub(crate) fn fill_heart(canvas: &mut RgbaImage, x: f32, y: f32, size: f32, color: Rgb) {
    if size < 1.0 {
        return;
    }
    const SAMPLES: usize = 4;
    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;
    let x1 = (x + size).ceil() as i64;
    let y1 = (y + size).ceil() as i64;

    for py in y0..y1 {
        for px in x0..x1 {
            let mut hits = 0usize;
            for sy in 0..SAMPLES {
                for sx in 0..SAMPLES {
                    let fx = px as f32 + (sx as f32 + 0.5) / SAMPLES as f32;
                    let fy = py as f32 + (sy as f32 + 0.5) / SAMPLES as f32;
                    // Map the box onto u in [-1.25, 1.25], v in [1.25, -1.1].
                    let u = ((fx - x) / size) * 2.5 - 1.25;
                    let v = 1.25 - ((fy - y) / size) * 2.35;
                    let a = u * u + v * v - 1.0;
                    if a * a * a - u * u * v * v * v <= 0.0 {
                        hits += 1;
                    }
                }
            }
            if hits > 0 {
                blend(canvas, px, py, color, hits as f32 / (SAMPLES * SAMPLES) as f32);
            }
        }
    }
}

/// Size, color and opacity of a text line.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TextStyle {
    pub(crate) size: f32,
    pub(crate) color: Rgb,
    pub(crate) opacity: f32,
}

/// Draws one line of text horizontally centered on `center_x` with its
/// baseline at `baseline_y`.
pub(crate) fn draw_text_centered(
    canvas: &mut RgbaImage,
    font: &FontArc,
    text: &str,
    style: TextStyle,
    center_x: f32,
    baseline_y: f32,
) {
    let TextStyle {
        size: font_size,
        color,
        opacity,
    } = style;
    if text.is_empty() || font_size <= 0.0 {
        return;
    }
    let scaled = font.as_scaled(font_size);

    let mut glyphs: Vec<(GlyphId, f32)> = Vec::with_capacity(text.len());
    let mut cursor = 0.0f32;
    let mut previous: Option<GlyphId> = None;
    for ch in text.chars() {
        let id = font.glyph_id(ch);
        if let Some(prev) = previous {
            cursor += scaled.kern(prev, id);
        }
        glyphs.push((id, cursor));
        cursor += scaled.h_advance(id);
        previous = Some(id);
    }

    let origin_x = center_x - cursor * 0.5;
    for (id, offset) in glyphs {
        let glyph = id.with_scale_and_position(font_size, point(origin_x + offset, baseline_y));
        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                blend(
                    canvas,
                    bounds.min.x as i64 + i64::from(gx),
                    bounds.min.y as i64 + i64::from(gy),
                    color,
                    coverage * opacity,
                );
            });
        }
    }
}
