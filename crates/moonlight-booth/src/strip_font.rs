//! Font used for strip titles and dates.

use std::{fs, path::Path};

use ab_glyph::FontArc;
use font_kit::{
    family_name::FamilyName,
    properties::{Properties, Weight},
    source::SystemSource,
};
use tracing::{debug, info, warn};

/// Loads the configured font, falling back to the system's bold
/// sans-serif. `None` only when neither can be loaded.
pub fn load_strip_font(path: Option<&Path>) -> Option<FontArc> {
    if let Some(path) = path {
        match fs::read(path).map(FontArc::try_from_vec) {
            Ok(Ok(font)) => {
                info!(path = ?path, "Strip font loaded");
                return Some(font);
            }
            Ok(Err(e)) => warn!(path = ?path, error = %e, "Strip font is not a usable font"),
            Err(e) => warn!(path = ?path, error = %e, "Strip font could not be read"),
        }
    }

    let font = load_system_sans();
    if font.is_none() {
        warn!("No system sans-serif font found");
    }
    font
}

fn load_system_sans() -> Option<FontArc> {
    let mut props = Properties::new();
    props.weight = Weight::BOLD;

    let handle = SystemSource::new()
        .select_best_match(&[FamilyName::SansSerif], &props)
        .ok()?;
    let font = handle.load().ok()?;
    debug!(family = %font.family_name(), "Using system font for strips");

    let data = font.copy_font_data()?;
    FontArc::try_from_vec((*data).clone()).ok()
}
