mod backend;
mod session;

pub use {
    backend::{
        AUDIO_BITS_PER_SECOND, FALLBACK_MIME_TYPE, MIME_CANDIDATES, RecorderBackend,
        RecorderEvent, RecorderOptions, VIDEO_BITS_PER_SECOND, preferred_mime_type,
    },
    session::{
        DEFAULT_MAX_DURATION, DEFAULT_TIMESLICE, RecordingConfig, RecordingHandle,
        RecordingSession, RecordingStatus, StopCause,
    },
};
