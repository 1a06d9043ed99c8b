use crate::{
    BoothError, CoreResult, EncodedImage, FrameDesign, PHOTO_COUNT, Rgb, StripGeometry,
    strip::paint::{self, TextStyle},
};

use std::panic::Location;

use ab_glyph::FontArc;
use error_location::ErrorLocation;
use image::{
    Rgba, RgbaImage,
    imageops::{self, FilterType},
};
use rayon::prelude::*;
use time::Date;
use tracing::{debug, instrument, warn};

/// Fill behind each photo.
const LETTERBOX: Rgb = Rgb::hex(0x111111);
/// Opacity of the tagline and date lines.
const SECONDARY_OPACITY: f32 = 0.7;
const TITLE_SIZE: f32 = 14.0;
const TAGLINE_SIZE: f32 = 10.0;
const DATE_SIZE: f32 = 11.0;
const GLYPH_SIZE: f32 = 10.0;
const GLYPH_INSET: f32 = 5.0;

/// Formats a capture date as `MM-DD-YYYY`.
pub fn format_strip_date(date: Date) -> String {
    format!(
        "{:02}-{:02}-{:04}",
        u8::from(date.month()),
        date.day(),
        date.year()
    )
}

/// Composes four captured photos into one decorated strip.
///
/// Text is drawn only when a font is supplied; without one the strip is
/// rendered with empty header and footer bands.
#[derive(Clone, Default)]
pub struct StripRenderer {
    font: Option<FontArc>,
}

impl std::fmt::Debug for StripRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripRenderer")
            .field("has_font", &self.font.is_some())
            .finish()
    }
}

impl StripRenderer {
    /// Creates a renderer using `font` for header and footer text.
    pub fn new(font: Option<FontArc>) -> Self {
        if font.is_none() {
            warn!("No strip font available, strips will carry no text");
        }
        Self { font }
    }

    /// Renders `photos` through `design` at `output_width` pixels, stamping
    /// `date` in the footer.
    ///
    /// All photos are decoded (in parallel) before anything is drawn; a
    /// single decode failure fails the whole render. Identical inputs give
    /// byte-identical output.
    ///
    /// # Errors
    ///
    /// [`BoothError::WrongPhotoCount`] unless exactly four photos are given,
    /// [`BoothError::InvalidOutputWidth`] for a zero width, and
    /// [`BoothError::PhotoDecode`] if any photo cannot be decoded.
    #[track_caller]
    #[instrument(skip(self, photos, design), fields(design = design.id))]
    pub fn render(
        &self,
        photos: &[EncodedImage],
        design: &FrameDesign,
        output_width: u32,
        date: Date,
    ) -> CoreResult<EncodedImage> {
        if photos.len() != PHOTO_COUNT {
            return Err(BoothError::WrongPhotoCount {
                expected: PHOTO_COUNT,
                actual: photos.len(),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        if output_width == 0 {
            return Err(BoothError::InvalidOutputWidth {
                width: output_width,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        // Phase 1: decode everything.
        let decoded = photos
            .par_iter()
            .enumerate()
            .map(|(slot, photo)| photo.decode(slot))
            .collect::<CoreResult<Vec<RgbaImage>>>()?;

        // Phase 2: draw.
        let geometry = StripGeometry::new(design.layout, output_width);
        let (width, height) = geometry.canvas_size();
        let bg = design.background;
        let mut canvas = RgbaImage::from_pixel(width, height, Rgba([bg.0, bg.1, bg.2, 255]));

        self.draw_header(&mut canvas, &geometry, design);
        for (slot, photo) in geometry.slots.iter().zip(&decoded) {
            draw_slot(&mut canvas, &geometry, slot, photo, design);
        }
        self.draw_footer(&mut canvas, &geometry, design, date);

        let encoded = EncodedImage::encode(&canvas)?;
        debug!(width, height, bytes = encoded.len(), "Strip rendered");
        Ok(encoded)
    }

    fn draw_header(&self, canvas: &mut RgbaImage, geometry: &StripGeometry, design: &FrameDesign) {
        let Some(font) = &self.font else {
            return;
        };
        let scale = geometry.scale;
        let center_x = geometry.width / 2.0;
        let mut baseline = geometry.padding + geometry.header / 2.0 + 4.0 * scale;
        if design.tagline.is_some() {
            baseline -= 6.0 * scale;
        }

        paint::draw_text_centered(
            canvas,
            font,
            &design.title,
            TextStyle {
                size: (TITLE_SIZE * scale).round(),
                color: design.accent,
                opacity: 1.0,
            },
            center_x,
            baseline,
        );

        if let Some(tagline) = &design.tagline {
            paint::draw_text_centered(
                canvas,
                font,
                tagline,
                TextStyle {
                    size: (TAGLINE_SIZE * scale).round(),
                    color: design.accent,
                    opacity: SECONDARY_OPACITY,
                },
                center_x,
                baseline + 12.0 * scale,
            );
        }
    }

    fn draw_footer(
        &self,
        canvas: &mut RgbaImage,
        geometry: &StripGeometry,
        design: &FrameDesign,
        date: Date,
    ) {
        let Some(font) = &self.font else {
            return;
        };
        let scale = geometry.scale;
        paint::draw_text_centered(
            canvas,
            font,
            &format_strip_date(date),
            TextStyle {
                size: (DATE_SIZE * scale).round(),
                color: design.accent,
                opacity: SECONDARY_OPACITY,
            },
            geometry.width / 2.0,
            geometry.height - geometry.padding - geometry.footer / 2.0 + 4.0 * scale,
        );
    }
}

fn draw_slot(
    canvas: &mut RgbaImage,
    geometry: &StripGeometry,
    slot: &crate::SlotRect,
    photo: &RgbaImage,
    design: &FrameDesign,
) {
    paint::fill_rect(
        canvas,
        slot.x,
        slot.y,
        slot.outer_width(),
        slot.outer_height(),
        design.border,
    );

    let (ix, iy, iw, ih) = (
        slot.inner_x(),
        slot.inner_y(),
        slot.inner_width,
        slot.inner_height,
    );
    paint::fill_rect(canvas, ix, iy, iw, ih, LETTERBOX);

    let (px, py, pw, ph) = paint::pixel_rect(canvas, ix, iy, iw, ih);
    if pw > 0 && ph > 0 {
        let fitted = if photo.dimensions() == (pw, ph) {
            photo.clone()
        } else {
            imageops::resize(photo, pw, ph, FilterType::Triangle)
        };
        imageops::replace(canvas, &fitted, i64::from(px), i64::from(py));
    }

    let scale = geometry.scale;
    let size = GLYPH_SIZE * scale;
    let inset = GLYPH_INSET * scale;
    let corners = [
        (ix + inset, iy + inset),
        (ix + iw - inset - size, iy + inset),
        (ix + inset, iy + ih - inset - size),
        (ix + iw - inset - size, iy + ih - inset - size),
    ];
    for (gx, gy) in corners {
        paint::fill_heart(canvas, gx, gy, size, design.accent);
    }
}
