use crate::{Compositor, Overlay, VideoFrame, tests::support::split_frame};

use image::{Rgba, RgbaImage};

/// WHAT: Captured stills are mirrored
/// WHY: The photo must match the mirrored live preview
#[test]
#[allow(clippy::unwrap_used)]
fn given_frame_when_composed_then_mirrored_at_native_size() {
    // Given: A frame red on the left, blue on the right
    let frame = VideoFrame::new(split_frame(16, 8));

    // When: Composing without an overlay
    let photo = Compositor::default().compose(&frame).unwrap().unwrap();

    // Then: Same size, colors swapped sides
    let image = photo.decode(0).unwrap();
    assert_eq!(image.dimensions(), (16, 8));
    assert_eq!(*image.get_pixel(0, 0), Rgba([0, 0, 255, 255]));
    assert_eq!(*image.get_pixel(15, 0), Rgba([255, 0, 0, 255]));
}

/// WHAT: The overlay is stretched to the frame and not mirrored
/// WHY: Overlay text must stay readable
#[test]
#[allow(clippy::unwrap_used)]
fn given_overlay_when_composed_then_drawn_unmirrored() {
    // Given: An overlay with an opaque green left column, transparent elsewhere
    let overlay = RgbaImage::from_fn(16, 8, |x, _| {
        if x == 0 {
            Rgba([0, 255, 0, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    });
    let compositor = Compositor::new(Overlay::from_image(overlay));

    // When: Composing
    let photo = compositor
        .compose(&VideoFrame::new(split_frame(16, 8)))
        .unwrap()
        .unwrap();

    // Then: Green stays on the left; the mirrored frame shows elsewhere
    let image = photo.decode(0).unwrap();
    assert_eq!(*image.get_pixel(0, 3), Rgba([0, 255, 0, 255]));
    assert_eq!(*image.get_pixel(1, 3), Rgba([0, 0, 255, 255]));
}

/// WHAT: A zero-size frame produces nothing
/// WHY: The capture must be dropped rather than store an empty photo
#[test]
#[allow(clippy::unwrap_used)]
fn given_empty_frame_when_composed_then_none() {
    let frame = VideoFrame::new(RgbaImage::new(0, 0));

    assert!(Compositor::default().compose(&frame).unwrap().is_none());
}

/// WHAT: A missing overlay file degrades to no overlay
/// WHY: Capture must continue when the decoration is unavailable
#[test]
fn given_missing_overlay_file_when_loading_then_absent() {
    let overlay = Overlay::load(std::path::Path::new("/nonexistent/overlay.png"));

    assert!(overlay.loaded().is_none());
}
