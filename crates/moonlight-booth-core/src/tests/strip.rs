use crate::{
    BoothError, EncodedImage, FRAME_DESIGNS, PREVIEW_WIDTH, StripGeometry, StripLayout,
    StripRenderer, find_design, format_strip_date, tests::support::four_photos,
};

use time::macros::date;

/// WHAT: The catalog has four grid and four vertical designs
/// WHY: Frame selection shows a fixed set of eight designs
#[test]
fn given_catalog_when_listing_then_eight_designs_with_unique_ids() {
    let grid = FRAME_DESIGNS
        .iter()
        .filter(|d| d.layout == StripLayout::Grid2x2)
        .count();
    let mut ids: Vec<_> = FRAME_DESIGNS.iter().map(|d| d.id).collect();
    ids.sort_unstable();
    ids.dedup();

    assert_eq!(grid, 4);
    assert_eq!(ids.len(), 8);
}

/// WHAT: Designs are found by id, name or the classic alias
/// WHY: Commands refer to designs by any of these
#[test]
#[allow(clippy::unwrap_used)]
fn given_design_names_when_looking_up_then_found() {
    assert_eq!(find_design("classic").unwrap().id, "black");
    assert_eq!(find_design("Light Blue").unwrap().id, "blue");
    assert_eq!(find_design("TEAL").unwrap().id, "teal");
    assert!(find_design("plaid").is_none());
}

/// WHAT: Grid and vertical strips have the reference dimensions
/// WHY: Output size is fixed by the layout constants
#[test]
fn given_reference_width_when_laying_out_then_expected_canvas() {
    assert_eq!(
        StripGeometry::new(StripLayout::Grid2x2, 400).canvas_size(),
        (400, 480)
    );
    assert_eq!(
        StripGeometry::new(StripLayout::VerticalStack, 400).canvas_size(),
        (400, 1360)
    );
}

/// WHAT: Previews are proportional to the full-size strip
/// WHY: Thumbnails must look like the downloaded strip
#[test]
fn given_preview_width_when_laying_out_then_scaled() {
    assert_eq!(
        StripGeometry::new(StripLayout::Grid2x2, PREVIEW_WIDTH).canvas_size(),
        (120, 144)
    );
    assert_eq!(
        StripGeometry::new(StripLayout::VerticalStack, PREVIEW_WIDTH).canvas_size(),
        (120, 408)
    );
}

/// WHAT: Slots stay inside the canvas between header and footer
/// WHY: Photos must not overlap the title or the date
#[test]
fn given_any_layout_when_laying_out_then_slots_between_bands() {
    for layout in [StripLayout::Grid2x2, StripLayout::VerticalStack] {
        let g = StripGeometry::new(layout, 400);
        for slot in &g.slots {
            assert!(slot.y >= g.padding + g.header - 0.01);
            assert!(slot.y + slot.outer_height() <= g.height - g.padding - g.footer + 0.01);
            assert!(slot.x + slot.outer_width() <= g.width - g.padding + 0.01);
        }
    }
}

/// WHAT: Rendering yields a PNG of the layout size, identical across runs
/// WHY: Previews and downloads must be reproducible
#[test]
#[allow(clippy::unwrap_used)]
fn given_four_photos_when_rendering_twice_then_identical_output() {
    // Given: Four photos and the pink grid design
    let photos = four_photos();
    let design = find_design("pink").unwrap();
    let renderer = StripRenderer::default();

    // When: Rendering twice
    let first = renderer.render(&photos, design, 400, date!(2025 - 02 - 14)).unwrap();
    let second = renderer.render(&photos, design, 400, date!(2025 - 02 - 14)).unwrap();

    // Then: Byte-identical, reference-sized strips
    assert_eq!(first, second);
    assert_eq!(first.decode(0).unwrap().dimensions(), (400, 480));
}

/// WHAT: Vertical designs render at the preview width
/// WHY: Frame selection shows small live thumbnails
#[test]
#[allow(clippy::unwrap_used)]
fn given_vertical_design_when_rendering_preview_then_preview_size() {
    let design = find_design("purple").unwrap();

    let strip = StripRenderer::default()
        .render(&four_photos(), design, PREVIEW_WIDTH, date!(2025 - 02 - 14))
        .unwrap();

    assert_eq!(strip.decode(0).unwrap().dimensions(), (120, 408));
}

/// WHAT: Anything other than four photos is rejected
/// WHY: A strip always has four slots
#[test]
fn given_three_or_five_photos_when_rendering_then_wrong_photo_count() {
    // Given: One photo short and one photo over
    let mut short = four_photos();
    short.pop();
    let mut long = four_photos();
    long.push(long[0].clone());

    // When: Rendering either
    let renderer = StripRenderer::default();
    let short_result = renderer.render(&short, &FRAME_DESIGNS[0], 400, date!(2025 - 02 - 14));
    let long_result = renderer.render(&long, &FRAME_DESIGNS[0], 400, date!(2025 - 02 - 14));

    // Then: Both report the count they got
    assert!(matches!(
        short_result,
        Err(BoothError::WrongPhotoCount { expected: 4, actual: 3, .. })
    ));
    assert!(matches!(
        long_result,
        Err(BoothError::WrongPhotoCount { expected: 4, actual: 5, .. })
    ));
}

/// WHAT: Every design renders at full and preview width with the layout height
/// WHY: Each of the eight designs can be chosen and downloaded
#[test]
#[allow(clippy::unwrap_used)]
fn given_every_design_when_rendering_then_layout_size_and_reproducible() {
    let photos = four_photos();
    let renderer = StripRenderer::default();

    for design in &FRAME_DESIGNS {
        for (width, grid_height, vertical_height) in [(400, 480, 1360), (PREVIEW_WIDTH, 144, 408)] {
            // Given/When: Rendering the design twice at this width
            let first = renderer.render(&photos, design, width, date!(2025 - 02 - 14)).unwrap();
            let second = renderer.render(&photos, design, width, date!(2025 - 02 - 14)).unwrap();

            // Then: Height follows the layout and output is byte-identical
            let expected = match design.layout {
                StripLayout::Grid2x2 => grid_height,
                StripLayout::VerticalStack => vertical_height,
            };
            assert_eq!(
                first.decode(0).unwrap().dimensions(),
                (width, expected),
                "{} at {width}",
                design.id
            );
            assert_eq!(first, second, "{} at {width}", design.id);
        }
    }
}

/// WHAT: One undecodable photo fails the whole render
/// WHY: A strip is never drawn with a missing photo
#[test]
fn given_corrupt_photo_when_rendering_then_decode_error() {
    let mut photos = four_photos();
    photos[3] = EncodedImage::from_png_bytes(vec![0u8; 16]);

    let result = StripRenderer::default().render(&photos, &FRAME_DESIGNS[5], 400, date!(2025 - 02 - 14));

    assert!(matches!(result, Err(BoothError::PhotoDecode { slot: 3, .. })));
}

/// WHAT: Zero output width is rejected
/// WHY: An empty canvas cannot be encoded
#[test]
fn given_zero_width_when_rendering_then_invalid_width() {
    let result = StripRenderer::default().render(&four_photos(), &FRAME_DESIGNS[0], 0, date!(2025 - 02 - 14));

    assert!(matches!(result, Err(BoothError::InvalidOutputWidth { width: 0, .. })));
}

/// WHAT: Footer dates use month-day-year
/// WHY: Strips show the capture date
#[test]
fn given_date_when_formatting_then_month_day_year() {
    assert_eq!(format_strip_date(date!(2025 - 02 - 14)), "02-14-2025");
}
