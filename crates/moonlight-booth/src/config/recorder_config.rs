use crate::config::{
    default_audio_bits_per_second, default_max_duration_secs, default_timeslice_ms,
    default_video_bits_per_second,
};

use moonlight_booth_core::RecordingConfig;

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Reaction recording configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecorderConfig {
    /// Recording stops on its own after this many seconds.
    #[serde(default = "default_max_duration_secs")]
    pub max_duration_secs: u64,

    /// Recorder time slice in milliseconds.
    #[serde(default = "default_timeslice_ms")]
    pub timeslice_ms: u64,

    /// Requested video bitrate.
    #[serde(default = "default_video_bits_per_second")]
    pub video_bits_per_second: u32,

    /// Requested audio bitrate.
    #[serde(default = "default_audio_bits_per_second")]
    pub audio_bits_per_second: u32,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            max_duration_secs: default_max_duration_secs(),
            timeslice_ms: default_timeslice_ms(),
            video_bits_per_second: default_video_bits_per_second(),
            audio_bits_per_second: default_audio_bits_per_second(),
        }
    }
}

impl RecorderConfig {
    /// Recording parameters for artifacts named after `product_name`.
    pub fn session_config(&self, product_name: &str) -> RecordingConfig {
        RecordingConfig {
            max_duration: Duration::from_secs(self.max_duration_secs.max(1)),
            timeslice: Duration::from_millis(self.timeslice_ms.max(1)),
            video_bits_per_second: self.video_bits_per_second,
            audio_bits_per_second: self.audio_bits_per_second,
            product_name: product_name.to_owned(),
        }
    }
}
