use crate::config::default_interval_secs;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Capture booth configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoothConfig {
    /// Seconds between timed captures.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u32,

    /// Transparent image stamped on every photo (None = no overlay).
    #[serde(default)]
    pub overlay_path: Option<PathBuf>,

    /// TrueType/OpenType font for strip text (None = no text).
    #[serde(default)]
    pub font_path: Option<PathBuf>,
}

impl Default for BoothConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            overlay_path: None,
            font_path: None,
        }
    }
}
