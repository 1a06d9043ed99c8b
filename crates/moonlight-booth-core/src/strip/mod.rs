//! Frame-strip rendering: four stills laid out in a decorative template.

mod design;
mod geometry;
mod paint;
mod renderer;

pub use {
    design::{FRAME_DESIGNS, FrameDesign, Rgb, StripLayout, find_design},
    geometry::{
        BORDER, FOOTER_HEIGHT, HEADER_HEIGHT, PADDING, PREVIEW_WIDTH, REFERENCE_WIDTH, SLOT_GAP,
        SlotRect, StripGeometry, VERTICAL_SLOT_HEIGHT,
    },
    renderer::{StripRenderer, format_strip_date},
};
