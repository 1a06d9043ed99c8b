use moonlight_booth_core::BoothError;

use std::{panic::Location, result::Result as StdResult};

use error_location::ErrorLocation;
use thiserror::Error;

/// Application-level errors for the moonlight-booth binary.
///
/// All variants include `ErrorLocation` for call-site tracking.
#[derive(Error, Debug)]
pub enum AppError {
    /// Booth pipeline error from moonlight-booth-core.
    #[error("Booth error: {source} {location}")]
    Booth {
        /// The underlying booth error.
        #[source]
        source: BoothError,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Nothing is available to download.
    #[error("Nothing to download: {what} {location}")]
    NothingToDownload {
        /// Which artifact was requested.
        what: &'static str,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Failed to send message through async channel.
    #[error("Channel send failed: {message} {location}")]
    ChannelSendFailed {
        /// Human-readable error message.
        message: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Configuration loading or saving error.
    #[error("Configuration error: {reason} {location}")]
    ConfigError {
        /// Human-readable reason for failure.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// IO error from filesystem operations.
    #[error("IO error: {source} {location}")]
    IoError {
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
        /// Location where this error was created.
        location: ErrorLocation,
    },
}

// Manual From<BoothError> with location tracking.
// Cannot use #[from] because it does not support extra fields.
impl From<BoothError> for AppError {
    #[track_caller]
    fn from(source: BoothError) -> Self {
        AppError::Booth {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<std::io::Error> for AppError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        AppError::IoError {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

/// Convenience type alias for Results using `AppError`.
pub type Result<T> = StdResult<T, AppError>;
