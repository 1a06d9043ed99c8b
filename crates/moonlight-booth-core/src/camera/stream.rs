use crate::CoreResult;

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use image::RgbaImage;
use tracing::{debug, info};
use uuid::Uuid;

/// How far a video source has progressed towards delivering frames.
///
/// Ordered so that `state >= ReadyState::HaveCurrentData` reads as "a frame
/// can be grabbed".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReadyState {
    /// Nothing is known about the source yet.
    HaveNothing,
    /// Dimensions are known but no frame is decoded.
    HaveMetadata,
    /// The current frame is available.
    HaveCurrentData,
    /// The current and at least the next frame are available.
    HaveFutureData,
    /// Playback can proceed without stalling.
    HaveEnoughData,
}

impl ReadyState {
    /// True once a frame can be grabbed.
    pub fn has_current_frame(self) -> bool {
        self >= ReadyState::HaveCurrentData
    }
}

/// One decoded frame of the live video feed, as the camera delivers it
/// (not mirrored).
#[derive(Debug, Clone)]
pub struct VideoFrame {
    image: RgbaImage,
}

impl VideoFrame {
    /// Wraps a decoded frame.
    pub fn new(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Intrinsic width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Intrinsic height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Frame pixels.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }
}

/// Kind of a media track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    /// Microphone input.
    Audio,
    /// Camera input.
    Video,
}

/// A single live track of a [`MediaStream`].
pub trait MediaTrack: Send + Sync {
    /// Audio or video.
    fn kind(&self) -> TrackKind;

    /// Releases the underlying device.
    fn stop(&self);
}

/// Frame access for the stream's video track.
pub trait VideoSource: Send + Sync {
    /// Current readiness of the feed.
    fn ready_state(&self) -> ReadyState;

    /// The frame currently on screen, if any.
    fn current_frame(&self) -> Option<VideoFrame>;
}

/// Which camera to prefer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacingMode {
    /// Front-facing (selfie) camera.
    User,
    /// Rear camera.
    Environment,
}

/// Constraints passed to [`CameraProvider::acquire`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraConstraints {
    /// Preferred camera.
    pub facing_mode: FacingMode,
    /// Ideal frame width.
    pub ideal_width: u32,
    /// Ideal frame height.
    pub ideal_height: u32,
    /// Whether a microphone track is requested.
    pub audio: bool,
}

impl Default for CameraConstraints {
    fn default() -> Self {
        Self {
            facing_mode: FacingMode::User,
            ideal_width: 1280,
            ideal_height: 720,
            audio: true,
        }
    }
}

/// Acquires live camera+microphone streams.
///
/// Failures are reported as [`crate::BoothError::Camera`] with a categorized
/// [`crate::CameraErrorKind`].
pub trait CameraProvider: Send + Sync {
    /// Opens the devices matching `constraints`. May block.
    fn acquire(&self, constraints: &CameraConstraints) -> CoreResult<Arc<MediaStream>>;
}

/// A live audio+video source shared by preview, capture and recording.
///
/// Only the owner of the stream should call [`MediaStream::stop_all_tracks`];
/// it is idempotent so repeated teardown is harmless.
pub struct MediaStream {
    id: Uuid,
    tracks: Vec<Arc<dyn MediaTrack>>,
    video: Option<Arc<dyn VideoSource>>,
    stopped: AtomicBool,
}

impl MediaStream {
    /// Assembles a stream from its tracks and the frame source of its video
    /// track.
    pub fn new(tracks: Vec<Arc<dyn MediaTrack>>, video: Option<Arc<dyn VideoSource>>) -> Self {
        let stream = Self {
            id: Uuid::new_v4(),
            tracks,
            video,
            stopped: AtomicBool::new(false),
        };
        debug!(
            stream_id = %stream.id,
            video_tracks = stream.video_track_count(),
            audio_tracks = stream.audio_track_count(),
            "Media stream created"
        );
        stream
    }

    /// Stream identifier for log correlation.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Number of video tracks.
    pub fn video_track_count(&self) -> usize {
        self.count(TrackKind::Video)
    }

    /// Number of audio tracks.
    pub fn audio_track_count(&self) -> usize {
        self.count(TrackKind::Audio)
    }

    /// Frame source of the video track.
    pub fn video(&self) -> Option<&Arc<dyn VideoSource>> {
        self.video.as_ref()
    }

    /// Readiness of the video feed; `HaveNothing` without a video track or
    /// after the stream was stopped.
    pub fn ready_state(&self) -> ReadyState {
        if self.is_stopped() {
            return ReadyState::HaveNothing;
        }
        self.video
            .as_ref()
            .map_or(ReadyState::HaveNothing, |v| v.ready_state())
    }

    /// Stops every track. Only the first call has an effect; returns whether
    /// this call performed the stop.
    pub fn stop_all_tracks(&self) -> bool {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return false;
        }
        for track in &self.tracks {
            track.stop();
        }
        info!(stream_id = %self.id, tracks = self.tracks.len(), "Media stream tracks stopped");
        true
    }

    /// True once the tracks were stopped.
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    fn count(&self, kind: TrackKind) -> usize {
        self.tracks.iter().filter(|t| t.kind() == kind).count()
    }
}

impl fmt::Debug for MediaStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaStream")
            .field("id", &self.id)
            .field("tracks", &self.tracks.len())
            .field("stopped", &self.is_stopped())
            .finish()
    }
}
