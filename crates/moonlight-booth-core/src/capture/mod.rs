mod booth;
mod session;

pub use {
    booth::{BoothCommand, BoothHandle, BoothSnapshot, FRAME_DELAY},
    session::{
        CaptureKind, CaptureMode, CaptureRejected, CaptureSession, CaptureTicket, Countdown,
        DEFAULT_INTERVAL_SECS, PHOTO_COUNT, TickOutcome,
    },
};
