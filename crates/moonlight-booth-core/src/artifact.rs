//! Finished artifacts and the object-URL registry that exposes them.

use crate::{BoothError, CoreResult};

use std::{
    collections::HashMap,
    fmt,
    panic::Location,
    sync::{Arc, Mutex},
};

use error_location::ErrorLocation;
use image::{ExtendedColorType, ImageEncoder, ImageFormat, RgbaImage, codecs::png::PngEncoder};
use tracing::{debug, error};
use uuid::Uuid;

/// An immutable PNG-encoded still image.
///
/// Cloning is cheap: the bytes are shared.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedImage {
    bytes: Arc<[u8]>,
}

impl EncodedImage {
    /// Wraps bytes that are expected to hold a PNG stream.
    ///
    /// The bytes are not validated here; decoding failures surface when the
    /// image is rendered.
    pub fn from_png_bytes(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Encodes a raster as PNG.
    #[track_caller]
    pub fn encode(image: &RgbaImage) -> CoreResult<Self> {
        let mut buf = Vec::new();
        PngEncoder::new(&mut buf)
            .write_image(
                image.as_raw(),
                image.width(),
                image.height(),
                ExtendedColorType::Rgba8,
            )
            .map_err(|source| BoothError::ImageEncode {
                source,
                location: ErrorLocation::from(Location::caller()),
            })?;
        Ok(Self::from_png_bytes(buf))
    }

    /// Decodes the image; `slot` is reported on failure.
    #[track_caller]
    pub fn decode(&self, slot: usize) -> CoreResult<RgbaImage> {
        image::load_from_memory_with_format(&self.bytes, ImageFormat::Png)
            .map(|img| img.to_rgba8())
            .map_err(|source| BoothError::PhotoDecode {
                slot,
                source,
                location: ErrorLocation::from(Location::caller()),
            })
    }

    /// Raw encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Shared handle to the encoded bytes.
    pub fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    /// Encoded size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True when no bytes are held.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for EncodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodedImage")
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// A finished reaction video assembled from recorder chunks.
#[derive(Debug, Clone)]
pub struct RecordingArtifact {
    /// Concatenated recorder output.
    pub bytes: Arc<[u8]>,
    /// Container mime type.
    pub mime_type: String,
    /// Suggested download filename.
    pub filename: String,
    /// Object URL under which the bytes are currently published.
    pub url: ObjectUrl,
}

/// Transient URL naming a published blob.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectUrl(String);

impl ObjectUrl {
    /// The URL text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Registry of live object URLs.
///
/// Every URL handed out by [`ObjectUrls::create`] stays resolvable until it
/// is revoked. Clones share the same registry.
#[derive(Debug, Clone, Default)]
pub struct ObjectUrls {
    live: Arc<Mutex<HashMap<ObjectUrl, Arc<[u8]>>>>,
}

impl ObjectUrls {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes `bytes` under a fresh URL.
    pub fn create(&self, bytes: Arc<[u8]>) -> ObjectUrl {
        let url = ObjectUrl(format!("blob:{}", Uuid::new_v4()));
        let mut live = self.lock();
        live.insert(url.clone(), bytes);
        debug!(url = %url, live = live.len(), "Object URL created");
        url
    }

    /// Releases a URL. Returns false if it was not live.
    pub fn revoke(&self, url: &ObjectUrl) -> bool {
        let mut live = self.lock();
        let removed = live.remove(url).is_some();
        if removed {
            debug!(url = %url, live = live.len(), "Object URL revoked");
        }
        removed
    }

    /// Looks up the bytes behind a live URL.
    pub fn resolve(&self, url: &ObjectUrl) -> Option<Arc<[u8]>> {
        self.lock().get(url).cloned()
    }

    /// Number of URLs not yet revoked.
    pub fn live_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<ObjectUrl, Arc<[u8]>>> {
        self.live.lock().unwrap_or_else(|e| {
            error!("Object URL registry lock poisoned, recovering: {}", e);
            e.into_inner()
        })
    }
}

/// Builds `<product>-<millis>.<extension>`.
pub fn artifact_filename(product_name: &str, unix_millis: i128, extension: &str) -> String {
    format!("{product_name}-{unix_millis}.{extension}")
}

/// Builds the filename offered for a cached artifact from a previous session.
pub fn cached_artifact_filename(product_name: &str, extension: &str) -> String {
    format!("{product_name}-last.{extension}")
}

/// File extension matching a recorder container mime type.
pub fn extension_for_mime(mime_type: &str) -> &'static str {
    let essence = mime_type.split(';').next().unwrap_or_default().trim();
    match essence {
        "video/webm" | "audio/webm" => "webm",
        "video/mp4" => "mp4",
        "video/x-matroska" => "mkv",
        _ => "bin",
    }
}

/// Milliseconds since the Unix epoch, used to stamp download filenames.
pub fn unix_millis_now() -> i128 {
    time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000
}
