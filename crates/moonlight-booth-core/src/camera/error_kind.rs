use std::fmt;

/// Categorized camera/microphone acquisition failure.
///
/// The `Display` text is the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraErrorKind {
    /// The user or platform refused access.
    PermissionDenied,
    /// No matching capture device exists.
    NotFound,
    /// The device is held by another application.
    InUse,
    /// Anything else; carries the platform message when one was given.
    Other(Option<String>),
}

impl CameraErrorKind {
    /// Classifies a platform error by its name, passing `message` through for
    /// unrecognised names.
    pub fn classify(name: &str, message: Option<&str>) -> Self {
        match name {
            "NotAllowedError" | "PermissionDeniedError" => Self::PermissionDenied,
            "NotFoundError" | "DevicesNotFoundError" => Self::NotFound,
            "NotReadableError" | "TrackStartError" => Self::InUse,
            _ => Self::Other(
                message
                    .map(str::trim)
                    .filter(|m| !m.is_empty())
                    .map(str::to_owned),
            ),
        }
    }
}

impl fmt::Display for CameraErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PermissionDenied => f.write_str("Camera and microphone access was denied."),
            Self::NotFound => f.write_str("No camera or microphone was found."),
            Self::InUse => f.write_str("Camera or microphone is in use by another app."),
            Self::Other(Some(message)) => f.write_str(message),
            Self::Other(None) => f.write_str("Failed to access camera."),
        }
    }
}
