//! Screen sequencing for one booth pass.
//!
//! `start -> booth -> frame-select -> valentine -> end`, with back
//! transitions from frame-select and end. The controller only decides
//! transitions and carries the artifacts between screens; side effects
//! (camera, recording, rendering) are driven by its owner.

use crate::{CameraErrorKind, EncodedImage, PHOTO_COUNT};

use std::fmt;

use tracing::{debug, info};

/// Screen identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowStage {
    /// Welcome screen.
    Start,
    /// Live camera and capture controls.
    Booth,
    /// Frame design picker.
    FrameSelect,
    /// Interstitial shown after the strip is ready.
    Valentine,
    /// Downloads.
    End,
}

impl fmt::Display for FlowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Start => "start",
            Self::Booth => "booth",
            Self::FrameSelect => "frame-select",
            Self::Valentine => "valentine",
            Self::End => "end",
        })
    }
}

/// Current screen with the artifacts it owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowState {
    /// Welcome screen.
    Start,
    /// Capturing.
    Booth,
    /// Choosing a design for the captured photos.
    FrameSelect {
        /// The four captured photos.
        photos: Vec<EncodedImage>,
    },
    /// Strip rendered; waiting for the user to dismiss the interstitial.
    Valentine {
        /// The four captured photos.
        photos: Vec<EncodedImage>,
        /// Full-resolution strip.
        strip: EncodedImage,
    },
    /// Flow finished.
    End {
        /// The four captured photos.
        photos: Vec<EncodedImage>,
        /// Full-resolution strip.
        strip: EncodedImage,
    },
}

impl FlowState {
    /// Screen of this state.
    pub fn stage(&self) -> FlowStage {
        match self {
            Self::Start => FlowStage::Start,
            Self::Booth => FlowStage::Booth,
            Self::FrameSelect { .. } => FlowStage::FrameSelect,
            Self::Valentine { .. } => FlowStage::Valentine,
            Self::End { .. } => FlowStage::End,
        }
    }

    /// The finished strip, once rendered.
    pub fn strip(&self) -> Option<&EncodedImage> {
        match self {
            Self::Valentine { strip, .. } | Self::End { strip, .. } => Some(strip),
            _ => None,
        }
    }

    /// The captured photos, once the booth is done.
    pub fn photos(&self) -> Option<&[EncodedImage]> {
        match self {
            Self::FrameSelect { photos }
            | Self::Valentine { photos, .. }
            | Self::End { photos, .. } => Some(photos),
            _ => None,
        }
    }
}

/// Inputs to the controller.
#[derive(Debug, Clone)]
pub enum FlowEvent {
    /// The camera stream was acquired.
    StreamAcquired,
    /// Camera acquisition failed.
    CameraFailed(CameraErrorKind),
    /// The capture session completed with these photos.
    BoothCompleted(Vec<EncodedImage>),
    /// The chosen design was rendered at full width.
    StripRendered(EncodedImage),
    /// The interstitial was dismissed.
    InterstitialDismissed,
    /// Go back one screen.
    Back,
    /// Close the camera error.
    DismissError,
    /// Abandon the pass and return to the start screen.
    Restart,
}

impl FlowEvent {
    fn name(&self) -> &'static str {
        match self {
            Self::StreamAcquired => "stream-acquired",
            Self::CameraFailed(_) => "camera-failed",
            Self::BoothCompleted(_) => "booth-completed",
            Self::StripRendered(_) => "strip-rendered",
            Self::InterstitialDismissed => "interstitial-dismissed",
            Self::Back => "back",
            Self::DismissError => "dismiss-error",
            Self::Restart => "restart",
        }
    }
}

/// An event that does not apply to the current screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowRejected {
    /// Screen at the time of the event.
    pub stage: FlowStage,
    /// Event name.
    pub event: &'static str,
}

impl fmt::Display for FlowRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not valid on the {} screen", self.event, self.stage)
    }
}

/// Booth flow state machine.
#[derive(Debug, Clone)]
pub struct FlowController {
    state: FlowState,
    acquiring: bool,
    camera_error: Option<CameraErrorKind>,
}

impl Default for FlowController {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowController {
    /// Starts on the welcome screen.
    pub fn new() -> Self {
        Self {
            state: FlowState::Start,
            acquiring: false,
            camera_error: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> &FlowState {
        &self.state
    }

    /// Current screen.
    pub fn stage(&self) -> FlowStage {
        self.state.stage()
    }

    /// True while camera acquisition is pending.
    pub fn is_acquiring(&self) -> bool {
        self.acquiring
    }

    /// Camera error awaiting dismissal.
    pub fn camera_error(&self) -> Option<&CameraErrorKind> {
        self.camera_error.as_ref()
    }

    /// Marks camera acquisition as pending. Returns false (and changes
    /// nothing) if not on the start screen or one is already pending.
    pub fn begin_acquire(&mut self) -> bool {
        if self.stage() != FlowStage::Start || self.acquiring {
            return false;
        }
        self.acquiring = true;
        self.camera_error = None;
        true
    }

    /// Applies `event`. State is only changed when the event is valid for
    /// the current screen.
    pub fn apply(&mut self, event: FlowEvent) -> Result<FlowStage, FlowRejected> {
        let from = self.stage();
        let rejected = FlowRejected {
            stage: from,
            event: event.name(),
        };

        let next = match (&self.state, event) {
            (FlowState::Start, FlowEvent::StreamAcquired) if self.acquiring => {
                self.acquiring = false;
                FlowState::Booth
            }
            (FlowState::Start, FlowEvent::CameraFailed(kind)) if self.acquiring => {
                self.acquiring = false;
                info!(error = %kind, "Camera acquisition failed");
                self.camera_error = Some(kind);
                return Ok(from);
            }
            (_, FlowEvent::DismissError) => {
                self.camera_error = None;
                return Ok(from);
            }
            (FlowState::Booth, FlowEvent::BoothCompleted(photos))
                if photos.len() == PHOTO_COUNT =>
            {
                FlowState::FrameSelect { photos }
            }
            (FlowState::FrameSelect { photos }, FlowEvent::StripRendered(strip)) => {
                FlowState::Valentine {
                    photos: photos.clone(),
                    strip,
                }
            }
            (FlowState::Valentine { photos, strip }, FlowEvent::InterstitialDismissed) => {
                FlowState::End {
                    photos: photos.clone(),
                    strip: strip.clone(),
                }
            }
            (FlowState::FrameSelect { .. }, FlowEvent::Back) => FlowState::Booth,
            (FlowState::End { photos, .. }, FlowEvent::Back) => FlowState::FrameSelect {
                photos: photos.clone(),
            },
            (_, FlowEvent::Restart) => {
                self.acquiring = false;
                FlowState::Start
            }
            _ => {
                debug!(%rejected, "Flow event ignored");
                return Err(rejected);
            }
        };

        self.state = next;
        let to = self.stage();
        info!(from = %from, to = %to, "Flow transition");
        Ok(to)
    }
}
