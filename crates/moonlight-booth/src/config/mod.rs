mod booth_config;
mod branding_config;
mod cache_config;
#[allow(clippy::module_inception)]
mod config;
mod output_config;
mod recorder_config;

pub(crate) use {
    booth_config::BoothConfig, branding_config::BrandingConfig, cache_config::CacheConfig,
    config::Config, output_config::OutputConfig, recorder_config::RecorderConfig,
};

use moonlight_booth_core::{
    AUDIO_BITS_PER_SECOND, DEFAULT_INTERVAL_SECS, DEFAULT_MAX_DURATION, DEFAULT_MAX_PHOTO_BYTES,
    DEFAULT_TIMESLICE, PREVIEW_WIDTH, REFERENCE_WIDTH, VIDEO_BITS_PER_SECOND,
};

use std::path::PathBuf;

use directories::{ProjectDirs, UserDirs};

pub(crate) const DEFAULT_PRODUCT_NAME: &str = "moon-light-room";
pub(crate) const DEFAULT_TITLE: &str = "HAPPY HAPPY HAPPY";

pub(crate) fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "moonlight-booth", "Moonlight-Booth")
}

pub(crate) fn default_product_name() -> String {
    DEFAULT_PRODUCT_NAME.to_owned()
}

pub(crate) fn default_title() -> String {
    DEFAULT_TITLE.to_owned()
}

pub(crate) fn default_interval_secs() -> u32 {
    DEFAULT_INTERVAL_SECS
}

pub(crate) fn default_max_duration_secs() -> u64 {
    DEFAULT_MAX_DURATION.as_secs()
}

pub(crate) fn default_timeslice_ms() -> u64 {
    DEFAULT_TIMESLICE.as_millis() as u64
}

pub(crate) fn default_video_bits_per_second() -> u32 {
    VIDEO_BITS_PER_SECOND
}

pub(crate) fn default_audio_bits_per_second() -> u32 {
    AUDIO_BITS_PER_SECOND
}

pub(crate) fn default_preview_width() -> u32 {
    PREVIEW_WIDTH
}

pub(crate) fn default_full_width() -> u32 {
    REFERENCE_WIDTH as u32
}

pub(crate) fn default_open_downloads() -> bool {
    false
}

pub(crate) fn default_max_photo_bytes() -> usize {
    DEFAULT_MAX_PHOTO_BYTES
}

pub(crate) fn default_downloads_dir() -> PathBuf {
    UserDirs::new()
        .and_then(|dirs| dirs.download_dir().map(|d| d.join("moonlight-booth")))
        .or_else(|| project_dirs().map(|dirs| dirs.data_dir().join("downloads")))
        .unwrap_or_else(|| PathBuf::from("downloads"))
}

pub(crate) fn default_cache_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".moonlight-cache"))
}
