use moonlight_booth_core::CaptureMode;

use std::str::FromStr;

/// Commands sent from the console reader to the main application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// Open the camera and enter the booth.
    Start,
    /// Take one photo (manual mode).
    Shoot,
    /// Switch capture mode.
    Mode(CaptureMode),
    /// Start the timed countdown.
    Countdown,
    /// Stop the timed countdown.
    CancelCountdown,
    /// Select a photo (0-based slot) for retake.
    Select(usize),
    /// Drop the retake selection.
    Deselect,
    /// Retake the selected photo.
    Retake,
    /// Discard all photos in the booth.
    ResetPhotos,
    /// Leave the booth with the captured photos.
    Next,
    /// Confirm a frame design by id or name.
    Choose(String),
    /// Dismiss the interstitial.
    Continue,
    /// Go back one screen.
    Back,
    /// Save the strip (or the cached last photo).
    SaveStrip,
    /// Save the reaction video (or the cached last video).
    SaveVideo,
    /// Close the camera error.
    DismissError,
    /// Tear everything down and return to the start screen.
    Restart,
    /// Print the current state.
    Status,
    /// Request application shutdown.
    Shutdown,
}

impl FromStr for AppCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let verb = words.next().unwrap_or_default().to_ascii_lowercase();
        let rest = words.collect::<Vec<_>>().join(" ");

        let command = match (verb.as_str(), rest.as_str()) {
            ("start", "") => Self::Start,
            ("shoot" | "snap", "") => Self::Shoot,
            ("mode", "manual") => Self::Mode(CaptureMode::Manual),
            ("mode", "timed") => Self::Mode(CaptureMode::Timed),
            ("countdown", "") => Self::Countdown,
            ("cancel", "") => Self::CancelCountdown,
            ("select", slot) => {
                // Slots are shown 1-based.
                let slot: usize = slot
                    .parse()
                    .map_err(|_| format!("'{slot}' is not a photo number"))?;
                Self::Select(slot.checked_sub(1).ok_or("photos are numbered from 1")?)
            }
            ("deselect", "") => Self::Deselect,
            ("retake", "") => Self::Retake,
            ("reset", "") => Self::ResetPhotos,
            ("next", "") => Self::Next,
            ("choose" | "design", id) if !id.is_empty() => Self::Choose(id.to_owned()),
            ("continue", "") => Self::Continue,
            ("back", "") => Self::Back,
            ("save", "strip" | "photo") => Self::SaveStrip,
            ("save", "video") => Self::SaveVideo,
            ("dismiss", "") => Self::DismissError,
            ("restart", "") => Self::Restart,
            ("status", "") => Self::Status,
            ("quit" | "exit", "") => Self::Shutdown,
            _ => return Err(format!("unknown command '{}'", line.trim())),
        };
        Ok(command)
    }
}
