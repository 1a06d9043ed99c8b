mod error_kind;
mod stream;

pub use {
    error_kind::CameraErrorKind,
    stream::{
        CameraConstraints, CameraProvider, FacingMode, MediaStream, MediaTrack, ReadyState,
        TrackKind, VideoFrame, VideoSource,
    },
};
