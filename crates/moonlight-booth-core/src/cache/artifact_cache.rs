use crate::{EncodedImage, cache::ArtifactStore};

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

/// Store key of the most recent photo.
pub const LAST_PHOTO_KEY: &str = "moonLightRoom_lastPhoto";
/// Store key of the most recent recording.
pub const LAST_VIDEO_KEY: &str = "moonLightRoom_lastVideo";
/// Photos at or above this size are neither cached nor restored.
pub const DEFAULT_MAX_PHOTO_BYTES: usize = 4 * 1024 * 1024;

/// Artifacts left behind by a previous session.
#[derive(Debug, Clone, Default)]
pub struct CachedArtifacts {
    /// Last captured photo or strip.
    pub last_photo: Option<EncodedImage>,
    /// Last finished recording.
    pub last_video: Option<Arc<[u8]>>,
}

impl CachedArtifacts {
    /// True when nothing was restored.
    pub fn is_empty(&self) -> bool {
        self.last_photo.is_none() && self.last_video.is_none()
    }
}

/// Best-effort cache of the last photo and recording.
///
/// Every failure is logged and swallowed: the cache is a convenience for
/// re-downloading a previous result, never a correctness requirement.
#[derive(Clone)]
pub struct ArtifactCache {
    store: Arc<dyn ArtifactStore>,
    max_photo_bytes: usize,
}

impl std::fmt::Debug for ArtifactCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactCache")
            .field("max_photo_bytes", &self.max_photo_bytes)
            .finish()
    }
}

impl ArtifactCache {
    /// Opens `store`. A store that fails to open still yields a cache; its
    /// reads and writes will fail quietly.
    #[instrument(skip(store))]
    pub fn open(store: Arc<dyn ArtifactStore>, max_photo_bytes: usize) -> Self {
        if let Err(e) = store.open() {
            warn!(error = %e, "Artifact store failed to open");
        }
        Self {
            store,
            max_photo_bytes,
        }
    }

    /// Reads both cached artifacts. Oversized or empty blobs are ignored.
    #[instrument(skip(self))]
    pub fn load_last(&self) -> CachedArtifacts {
        let last_photo = self
            .read(LAST_PHOTO_KEY)
            .filter(|b| !b.is_empty() && b.len() < self.max_photo_bytes)
            .map(EncodedImage::from_png_bytes);
        let last_video = self
            .read(LAST_VIDEO_KEY)
            .filter(|b| !b.is_empty())
            .map(Arc::from);

        info!(
            photo = last_photo.is_some(),
            video = last_video.is_some(),
            "Cached artifacts loaded"
        );

        CachedArtifacts {
            last_photo,
            last_video,
        }
    }

    /// Remembers `photo` unless it is over the size cap. Returns whether it
    /// was written.
    pub fn remember_photo(&self, photo: &EncodedImage) -> bool {
        if photo.len() >= self.max_photo_bytes {
            debug!(bytes = photo.len(), cap = self.max_photo_bytes, "Photo too large to cache");
            return false;
        }
        self.write(LAST_PHOTO_KEY, photo.as_bytes())
    }

    /// Remembers a finished recording. Returns whether it was written.
    pub fn remember_video(&self, bytes: &[u8]) -> bool {
        self.write(LAST_VIDEO_KEY, bytes)
    }

    /// Closes the underlying store.
    pub fn close(&self) {
        if let Err(e) = self.store.close() {
            warn!(error = %e, "Artifact store failed to close");
        }
    }

    fn read(&self, key: &str) -> Option<Vec<u8>> {
        match self.store.get(key) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(key, error = %e, "Artifact cache read failed");
                None
            }
        }
    }

    fn write(&self, key: &str, bytes: &[u8]) -> bool {
        match self.store.put(key, bytes) {
            Ok(()) => {
                debug!(key, bytes = bytes.len(), "Artifact cached");
                true
            }
            Err(e) => {
                warn!(key, error = %e, "Artifact cache write failed");
                false
            }
        }
    }
}
