use crate::{CoreResult, EncodedImage, VideoFrame};

use std::path::Path;

use image::{
    RgbaImage,
    imageops::{self, FilterType},
};
use tracing::{debug, instrument, warn};

/// Static transparent image stamped over every captured frame.
///
/// An overlay that failed to load is simply absent; compositing proceeds
/// without it.
#[derive(Debug, Clone, Default)]
pub struct Overlay {
    image: Option<RgbaImage>,
}

impl Overlay {
    /// No overlay.
    pub fn none() -> Self {
        Self::default()
    }

    /// Uses an already decoded image.
    pub fn from_image(image: RgbaImage) -> Self {
        Self { image: Some(image) }
    }

    /// Loads an overlay from disk, degrading to no overlay on failure.
    #[instrument]
    pub fn load(path: &Path) -> Self {
        match image::open(path) {
            Ok(img) => {
                let image = img.to_rgba8();
                debug!(width = image.width(), height = image.height(), "Overlay loaded");
                Self { image: Some(image) }
            }
            Err(e) => {
                warn!(error = %e, "Overlay not available, capturing without it");
                Self::none()
            }
        }
    }

    /// The overlay if it is fully loaded (non-zero intrinsic size).
    pub fn loaded(&self) -> Option<&RgbaImage> {
        self.image
            .as_ref()
            .filter(|img| img.width() > 0 && img.height() > 0)
    }
}

/// Turns live video frames into captured stills.
#[derive(Debug, Clone, Default)]
pub struct Compositor {
    overlay: Overlay,
}

impl Compositor {
    /// Creates a compositor stamping `overlay` on every still.
    pub fn new(overlay: Overlay) -> Self {
        Self { overlay }
    }

    /// Renders `frame` mirrored at its native resolution, draws the overlay
    /// un-mirrored on top, and encodes the result as PNG.
    ///
    /// Returns `Ok(None)` for a frame with a zero dimension; the caller must
    /// not advance its state in that case.
    #[instrument(skip_all, fields(width = frame.width(), height = frame.height()))]
    pub fn compose(&self, frame: &VideoFrame) -> CoreResult<Option<EncodedImage>> {
        let (width, height) = (frame.width(), frame.height());
        if width == 0 || height == 0 {
            debug!("Frame has no pixels, nothing composed");
            return Ok(None);
        }

        let mut raster = imageops::flip_horizontal(frame.image());

        if let Some(overlay) = self.overlay.loaded() {
            if overlay.dimensions() == (width, height) {
                imageops::overlay(&mut raster, overlay, 0, 0);
            } else {
                let stretched = imageops::resize(overlay, width, height, FilterType::Triangle);
                imageops::overlay(&mut raster, &stretched, 0, 0);
            }
        }

        let encoded = EncodedImage::encode(&raster)?;
        debug!(bytes = encoded.len(), "Frame composed");
        Ok(Some(encoded))
    }
}
