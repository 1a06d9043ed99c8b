use crate::{CoreResult, MediaStream, RecordingConfig};

use std::{sync::Arc, time::Duration};

use tokio::sync::mpsc;

/// Container/codec candidates in order of preference.
pub const MIME_CANDIDATES: [&str; 3] = [
    "video/webm;codecs=vp9,opus",
    "video/webm;codecs=vp8,opus",
    "video/webm",
];

/// Mime type assumed when the recorder reports none.
pub const FALLBACK_MIME_TYPE: &str = "video/webm";

/// Default video bitrate requested alongside an explicit mime type.
pub const VIDEO_BITS_PER_SECOND: u32 = 2_500_000;
/// Default audio bitrate requested alongside an explicit mime type.
pub const AUDIO_BITS_PER_SECOND: u32 = 128_000;

/// Events emitted by a running recorder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecorderEvent {
    /// One time slice of encoded output. May be empty.
    Data(Vec<u8>),
    /// The recorder failed; a `Stopped` follows.
    Error(Option<String>),
    /// The recorder is inactive; no further events follow.
    Stopped,
}

/// Options for [`RecorderBackend::start`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecorderOptions {
    /// Explicit mime type, or `None` for the platform default.
    pub mime_type: Option<String>,
    /// Requested video bitrate.
    pub video_bits_per_second: Option<u32>,
    /// Requested audio bitrate.
    pub audio_bits_per_second: Option<u32>,
    /// Interval at which `Data` events are emitted.
    pub timeslice: Duration,
}

impl RecorderOptions {
    /// Options for `mime_type` as chosen by [`preferred_mime_type`]: the
    /// configured bitrates are only requested together with an explicit type.
    pub fn for_mime(mime_type: Option<&str>, config: &RecordingConfig) -> Self {
        match mime_type {
            Some(mime) => Self {
                mime_type: Some(mime.to_owned()),
                video_bits_per_second: Some(config.video_bits_per_second),
                audio_bits_per_second: Some(config.audio_bits_per_second),
                timeslice: config.timeslice,
            },
            None => Self {
                mime_type: None,
                video_bits_per_second: None,
                audio_bits_per_second: None,
                timeslice: config.timeslice,
            },
        }
    }
}

/// Platform media recorder.
///
/// After `start`, the recorder emits `Data` events every time slice. `stop`
/// makes it flush a final `Data` event and then `Stopped`. Calling `stop` on
/// an inactive recorder does nothing.
pub trait RecorderBackend: Send + 'static {
    /// Whether `mime_type` can be recorded.
    fn is_type_supported(&self, mime_type: &str) -> bool;

    /// Starts recording `stream`.
    fn start(
        &mut self,
        stream: Arc<MediaStream>,
        options: &RecorderOptions,
    ) -> CoreResult<mpsc::UnboundedReceiver<RecorderEvent>>;

    /// Requests the recorder to stop.
    fn stop(&mut self);

    /// Mime type actually in use.
    fn mime_type(&self) -> Option<String>;
}

/// First candidate the backend supports, or `None` to let the platform
/// choose.
pub fn preferred_mime_type(backend: &dyn RecorderBackend) -> Option<&'static str> {
    MIME_CANDIDATES
        .iter()
        .copied()
        .find(|mime| backend.is_type_supported(mime))
}
