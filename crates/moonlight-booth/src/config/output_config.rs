use crate::config::{
    default_downloads_dir, default_full_width, default_open_downloads, default_preview_width,
};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Strip sizes and download handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory downloads are written to.
    #[serde(default = "default_downloads_dir")]
    pub downloads_dir: PathBuf,

    /// Width of the frame-select thumbnails.
    #[serde(default = "default_preview_width")]
    pub preview_width: u32,

    /// Width of the final strip.
    #[serde(default = "default_full_width")]
    pub full_width: u32,

    /// Open each download with the system viewer.
    #[serde(default = "default_open_downloads")]
    pub open_downloads: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            downloads_dir: default_downloads_dir(),
            preview_width: default_preview_width(),
            full_width: default_full_width(),
            open_downloads: default_open_downloads(),
        }
    }
}
