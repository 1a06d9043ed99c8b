//! Configuration management for moonlight-booth.
//!
//! Handles loading and saving TOML configuration files with cross-platform
//! paths, per-field defaults, and atomic write operations.

use crate::{
    AppError, AppResult,
    config::{
        BoothConfig, BrandingConfig, CacheConfig, OutputConfig, RecorderConfig, project_dirs,
    },
};

use moonlight_booth_core::{FrameDesign, RecordingConfig};

use std::{
    fs,
    io::Write,
    panic::Location,
    path::{Path, PathBuf},
};

use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Main configuration struct.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Product naming and header text.
    #[serde(default)]
    pub branding: BrandingConfig,
    /// Capture booth settings.
    #[serde(default)]
    pub booth: BoothConfig,
    /// Reaction recording settings.
    #[serde(default)]
    pub recording: RecorderConfig,
    /// Strip sizes and downloads.
    #[serde(default)]
    pub output: OutputConfig,
    /// Last-artifact cache.
    #[serde(default)]
    pub cache: CacheConfig,
}

impl Config {
    /// Load configuration from the platform config directory, creating the
    /// default file if none exists.
    #[track_caller]
    #[instrument]
    pub fn load() -> AppResult<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from `path`, writing defaults there if missing.
    #[track_caller]
    #[instrument]
    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            info!("No config found, creating default");
            let config = Config::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let contents = fs::read_to_string(path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to read config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to parse config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        config.validate()?;
        info!(config_path = ?path, "Configuration loaded");

        Ok(config)
    }

    /// Save configuration to `path` using atomic write pattern.
    ///
    /// Writes to a temporary file first, then renames to prevent corruption
    /// if the process crashes during the write.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        let contents = toml::to_string_pretty(self).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to serialize config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
            debug!(config_dir = ?parent, "Created config directory");
        }

        // Atomic write: write to temp file then rename
        let temp_path = path.with_extension("toml.tmp");

        let mut temp_file = fs::File::create(&temp_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to create temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        temp_file
            .write_all(contents.as_bytes())
            .map_err(|e| AppError::ConfigError {
                reason: format!("Failed to write temp config file: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        temp_file.sync_all().map_err(|e| AppError::ConfigError {
            reason: format!("Failed to sync temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        fs::rename(&temp_path, path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to rename temp config to final: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(config_path = ?path, "Configuration saved (atomic write)");

        Ok(())
    }

    /// Reject values the booth cannot work with.
    #[track_caller]
    pub fn validate(&self) -> AppResult<()> {
        let reason = if self.output.full_width == 0 || self.output.preview_width == 0 {
            "Strip widths must be greater than zero"
        } else if self.booth.interval_secs == 0 {
            "Timed capture interval must be at least one second"
        } else if self.recording.max_duration_secs == 0 {
            "Recording duration must be at least one second"
        } else if self.branding.product_name.trim().is_empty() {
            "Product name must not be empty"
        } else {
            return Ok(());
        };

        Err(AppError::ConfigError {
            reason: reason.to_owned(),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    /// `design` with the configured header text.
    pub fn branded(&self, design: &FrameDesign) -> FrameDesign {
        design
            .clone()
            .with_text(self.branding.title.clone(), self.branding.tagline.clone())
    }

    /// Recording parameters derived from this configuration.
    pub fn recording_config(&self) -> RecordingConfig {
        self.recording.session_config(&self.branding.product_name)
    }

    #[track_caller]
    fn config_path() -> AppResult<PathBuf> {
        let proj_dirs = project_dirs().ok_or_else(|| AppError::ConfigError {
            reason: "Failed to get config directory".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

        Ok(proj_dirs.config_dir().join("config.toml"))
    }
}
