use crate::{config::Config, load_strip_font, tests::support::four_photos};

use moonlight_booth_core::{StripGeometry, StripRenderer, find_design};

use std::path::Path;

use image::{Rgba, RgbaImage};
use time::macros::date;

/// Pixels in rows `top..bottom` that differ from the background.
fn ink_between(strip: &RgbaImage, top: f32, bottom: f32, background: Rgba<u8>) -> usize {
    let (top, bottom) = (top.round() as u32, bottom.round() as u32);
    strip
        .enumerate_pixels()
        .filter(|(_, y, pixel)| (top..bottom).contains(y) && **pixel != background)
        .count()
}

/// WHAT: Without a configured font the system sans-serif is used
/// WHY: The default config must still print the title and date
#[test]
fn given_no_font_path_when_loading_then_system_font_found() {
    // Given/When: Loading with the default config
    let font = load_strip_font(Config::default().booth.font_path.as_deref());

    // Then: A font is available
    assert!(font.is_some());
}

/// WHAT: A broken font path falls back to the system font
/// WHY: A typo in the config must not strip the text from every strip
#[test]
fn given_missing_font_file_when_loading_then_falls_back() {
    // Given/When: Loading from a path that does not exist
    let font = load_strip_font(Some(Path::new("/nonexistent/strip-font.ttf")));

    // Then: The system font is used instead
    assert!(font.is_some());
}

/// WHAT: Strips rendered with the default config carry header and footer text
/// WHY: Every strip shows the title and the capture date
#[test]
#[allow(clippy::unwrap_used)]
fn given_default_config_when_rendering_then_title_and_date_drawn() {
    // Given: The renderer the app builds from the default config
    let config = Config::default();
    let renderer = StripRenderer::new(load_strip_font(config.booth.font_path.as_deref()));
    let design = config.branded(find_design("pink").unwrap());
    let bg = design.background;
    let background = Rgba([bg.0, bg.1, bg.2, 255]);

    // When: Rendering with and without text
    let strip = renderer
        .render(&four_photos(), &design, 400, date!(2025 - 02 - 14))
        .unwrap()
        .decode(0)
        .unwrap();
    let plain = StripRenderer::default()
        .render(&four_photos(), &design, 400, date!(2025 - 02 - 14))
        .unwrap()
        .decode(0)
        .unwrap();

    // Then: Header and footer bands hold ink only when a font is present
    let g = StripGeometry::new(design.layout, 400);
    let header = (g.padding, g.padding + g.header);
    let footer = (g.height - g.padding - g.footer, g.height - g.padding);
    assert!(ink_between(&strip, header.0, header.1, background) > 0);
    assert!(ink_between(&strip, footer.0, footer.1, background) > 0);
    assert_eq!(ink_between(&plain, header.0, header.1, background), 0);
    assert_eq!(ink_between(&plain, footer.0, footer.1, background), 0);
}

/// WHAT: Text rendering is reproducible
/// WHY: Re-rendering the chosen design must give the same download
#[test]
#[allow(clippy::unwrap_used)]
fn given_font_and_tagline_when_rendering_twice_then_identical() {
    // Given: A branded design with a tagline and the system font
    let mut config = Config::default();
    config.branding.tagline = Some("Ana & Sam".to_owned());
    let renderer = StripRenderer::new(load_strip_font(None));
    let design = config.branded(find_design("red").unwrap());

    // When: Rendering twice
    let first = renderer
        .render(&four_photos(), &design, 400, date!(2025 - 02 - 14))
        .unwrap();
    let second = renderer
        .render(&four_photos(), &design, 400, date!(2025 - 02 - 14))
        .unwrap();

    // Then: Byte-identical output
    assert_eq!(first, second);
}
