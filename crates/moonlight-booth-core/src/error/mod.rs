use crate::CameraErrorKind;

use error_location::ErrorLocation;
use thiserror::Error;

/// Booth pipeline errors with source location tracking.
#[derive(Error, Debug)]
pub enum BoothError {
    /// A strip needs exactly four photos.
    #[error("Expected {expected} photos, got {actual} {location}")]
    WrongPhotoCount {
        /// Number of photos a strip requires.
        expected: usize,
        /// Number of photos supplied.
        actual: usize,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Strip output width must be non-zero.
    #[error("Invalid strip output width: {width} {location}")]
    InvalidOutputWidth {
        /// Requested output width in pixels.
        width: u32,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A captured photo could not be decoded.
    #[error("Photo in slot {slot} could not be decoded: {source} {location}")]
    PhotoDecode {
        /// Slot index of the failing photo.
        slot: usize,
        /// Underlying decoder error.
        #[source]
        source: image::ImageError,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Raster could not be encoded.
    #[error("Image encoding failed: {source} {location}")]
    ImageEncode {
        /// Underlying encoder error.
        #[source]
        source: image::ImageError,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Camera or microphone acquisition failed.
    #[error("Camera error: {kind} {location}")]
    Camera {
        /// Categorized failure.
        kind: CameraErrorKind,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Media recorder failed to start or run.
    #[error("Recorder error: {reason} {location}")]
    Recorder {
        /// Description of the recorder failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Artifact cache read or write failed.
    #[error("Artifact cache error: {reason} {location}")]
    Cache {
        /// Description of the cache failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A background task is no longer accepting commands.
    #[error("{task} task is not running {location}")]
    TaskClosed {
        /// Name of the task.
        task: &'static str,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// IO error from filesystem operations.
    #[error("IO error: {source} {location}")]
    Io {
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

impl From<std::io::Error> for BoothError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        BoothError::Io {
            source,
            location: ErrorLocation::from(std::panic::Location::caller()),
        }
    }
}

/// Result type alias using [`BoothError`].
pub type Result<T> = std::result::Result<T, BoothError>;
