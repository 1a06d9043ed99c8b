//! Moonlight Booth Core Library
//!
//! Photo-booth engine: camera stream lifecycle, four-shot capture with a
//! timed or manual trigger, overlay compositing, frame-strip rendering,
//! bounded reaction recording and the flow that sequences them.
//!
//! # Example
//!
//! ```no_run
//! use moonlight_booth_core::{CoreResult, EncodedImage, StripRenderer, find_design};
//!
//! fn render(photos: &[EncodedImage]) -> CoreResult<EncodedImage> {
//!     let design = find_design("pink").unwrap_or(&moonlight_booth_core::FRAME_DESIGNS[0]);
//!     let today = time::OffsetDateTime::now_utc().date();
//!     StripRenderer::default().render(photos, design, 400, today)
//! }
//! ```

mod artifact;
mod cache;
mod camera;
mod capture;
mod compositor;
mod error;
mod flow;
mod recording;
mod strip;

pub use {
    artifact::{
        EncodedImage, ObjectUrl, ObjectUrls, RecordingArtifact, artifact_filename,
        cached_artifact_filename, extension_for_mime, unix_millis_now,
    },
    cache::{
        ArtifactCache, ArtifactStore, CachedArtifacts, DEFAULT_MAX_PHOTO_BYTES, LAST_PHOTO_KEY,
        LAST_VIDEO_KEY, MemoryStore,
    },
    camera::{
        CameraConstraints, CameraErrorKind, CameraProvider, FacingMode, MediaStream, MediaTrack,
        ReadyState, TrackKind, VideoFrame, VideoSource,
    },
    capture::{
        BoothCommand, BoothHandle, BoothSnapshot, CaptureKind, CaptureMode, CaptureRejected,
        CaptureSession, CaptureTicket, Countdown, DEFAULT_INTERVAL_SECS, FRAME_DELAY,
        PHOTO_COUNT, TickOutcome,
    },
    compositor::{Compositor, Overlay},
    error::{BoothError, Result as CoreResult},
    flow::{FlowController, FlowEvent, FlowRejected, FlowStage, FlowState},
    recording::{
        AUDIO_BITS_PER_SECOND, DEFAULT_MAX_DURATION, DEFAULT_TIMESLICE, FALLBACK_MIME_TYPE,
        MIME_CANDIDATES, RecorderBackend, RecorderEvent, RecorderOptions, RecordingConfig,
        RecordingHandle, RecordingSession, RecordingStatus, StopCause, VIDEO_BITS_PER_SECOND,
        preferred_mime_type,
    },
    strip::{
        BORDER, FOOTER_HEIGHT, FRAME_DESIGNS, FrameDesign, HEADER_HEIGHT, PADDING, PREVIEW_WIDTH,
        REFERENCE_WIDTH, Rgb, SLOT_GAP, SlotRect, StripGeometry, StripLayout, StripRenderer,
        VERTICAL_SLOT_HEIGHT, find_design, format_strip_date,
    },
};

#[cfg(test)]
mod tests;
