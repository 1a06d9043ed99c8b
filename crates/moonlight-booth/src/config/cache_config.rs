use crate::config::{default_cache_dir, default_max_photo_bytes};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Last-artifact cache configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Whether the last photo and recording are kept between runs.
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,

    /// Directory holding the cached blobs.
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,

    /// Photos at or above this size are not cached.
    #[serde(default = "default_max_photo_bytes")]
    pub max_photo_bytes: usize,
}

fn default_cache_enabled() -> bool {
    true
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            dir: default_cache_dir(),
            max_photo_bytes: default_max_photo_bytes(),
        }
    }
}
