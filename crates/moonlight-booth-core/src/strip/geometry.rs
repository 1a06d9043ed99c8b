use crate::{PHOTO_COUNT, StripLayout};

/// Width, in reference units, every other measurement is expressed against.
pub const REFERENCE_WIDTH: f32 = 400.0;
/// Outer canvas padding.
pub const PADDING: f32 = 12.0;
/// Thickness of each slot's frame.
pub const BORDER: f32 = 4.0;
/// Space between neighbouring slots.
pub const SLOT_GAP: f32 = 8.0;
/// Title band height.
pub const HEADER_HEIGHT: f32 = 44.0;
/// Date band height.
pub const FOOTER_HEIGHT: f32 = 36.0;
/// Slot height of the vertical-stack layout.
pub const VERTICAL_SLOT_HEIGHT: f32 = 300.0;
/// Output width of frame-select thumbnails.
pub const PREVIEW_WIDTH: u32 = 120;

/// One slot's placement: the outer frame rectangle and the photo area
/// inside it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotRect {
    /// Left edge of the frame.
    pub x: f32,
    /// Top edge of the frame.
    pub y: f32,
    /// Photo area width.
    pub inner_width: f32,
    /// Photo area height.
    pub inner_height: f32,
    /// Frame thickness.
    pub border: f32,
}

impl SlotRect {
    /// Left edge of the photo area.
    pub fn inner_x(&self) -> f32 {
        self.x + self.border
    }

    /// Top edge of the photo area.
    pub fn inner_y(&self) -> f32 {
        self.y + self.border
    }

    /// Frame width including both borders.
    pub fn outer_width(&self) -> f32 {
        self.inner_width + self.border * 2.0
    }

    /// Frame height including both borders.
    pub fn outer_height(&self) -> f32 {
        self.inner_height + self.border * 2.0
    }
}

/// Every measurement of a strip at one output width.
///
/// All values derive from the reference constants multiplied by
/// `scale = output_width / REFERENCE_WIDTH`, so thumbnails and full-size
/// exports are proportional.
#[derive(Debug, Clone, PartialEq)]
pub struct StripGeometry {
    /// Output width over reference width.
    pub scale: f32,
    /// Canvas width in (fractional) pixels.
    pub width: f32,
    /// Canvas height in (fractional) pixels.
    pub height: f32,
    /// Scaled padding.
    pub padding: f32,
    /// Scaled header band.
    pub header: f32,
    /// Scaled footer band.
    pub footer: f32,
    /// Slot placements in capture order.
    pub slots: [SlotRect; PHOTO_COUNT],
}

impl StripGeometry {
    /// Lays out `layout` at `output_width` pixels.
    pub fn new(layout: StripLayout, output_width: u32) -> Self {
        let scale = output_width as f32 / REFERENCE_WIDTH;
        let width = REFERENCE_WIDTH * scale;
        let padding = PADDING * scale;
        let border = BORDER * scale;
        let gap = SLOT_GAP * scale;
        let header = HEADER_HEIGHT * scale;
        let footer = FOOTER_HEIGHT * scale;
        let top = padding + header;

        let (slots_height, slots) = match layout {
            StripLayout::Grid2x2 => {
                let side = (width - padding * 2.0 - border * 4.0 - gap) / 2.0;
                let step = side + border * 2.0 + gap;
                let slots = [0usize, 1, 2, 3].map(|i| SlotRect {
                    x: padding + (i % 2) as f32 * step,
                    y: top + (i / 2) as f32 * step,
                    inner_width: side,
                    inner_height: side,
                    border,
                });
                (side * 2.0 + gap + border * 4.0, slots)
            }
            StripLayout::VerticalStack => {
                let slot_height = VERTICAL_SLOT_HEIGHT * scale;
                let slot_width = width - padding * 2.0 - border * 2.0;
                let step = slot_height + border * 2.0 + gap;
                let slots = [0usize, 1, 2, 3].map(|i| SlotRect {
                    x: padding,
                    y: top + i as f32 * step,
                    inner_width: slot_width,
                    inner_height: slot_height,
                    border,
                });
                (slot_height * 4.0 + gap * 3.0 + border * 8.0, slots)
            }
        };
        Self {
            scale,
            width,
            height: padding + header + slots_height + footer + padding,
            padding,
            header,
            footer,
            slots,
        }
    }

    /// Pixel dimensions of the canvas.
    pub fn canvas_size(&self) -> (u32, u32) {
        (self.width.round() as u32, self.height.round() as u32)
    }
}
