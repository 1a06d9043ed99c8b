//! Fakes shared by the core tests.

use crate::{
    BoothError, CoreResult, EncodedImage, MediaStream, MediaTrack, ReadyState, RecorderBackend,
    RecorderEvent, RecorderOptions, TrackKind, VideoFrame, VideoSource,
};

use std::{
    panic::Location,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use error_location::ErrorLocation;
use image::{Rgba, RgbaImage};
use tokio::sync::mpsc;

/// Solid-color PNG of the given size.
#[allow(clippy::unwrap_used)]
pub fn solid_photo(width: u32, height: u32, rgb: [u8; 3]) -> EncodedImage {
    let image = RgbaImage::from_pixel(width, height, Rgba([rgb[0], rgb[1], rgb[2], 255]));
    EncodedImage::encode(&image).unwrap()
}

/// Four distinct small photos.
pub fn four_photos() -> Vec<EncodedImage> {
    vec![
        solid_photo(8, 6, [255, 0, 0]),
        solid_photo(8, 6, [0, 255, 0]),
        solid_photo(8, 6, [0, 0, 255]),
        solid_photo(8, 6, [255, 255, 0]),
    ]
}

/// Frame whose left half is red and right half is blue.
pub fn split_frame(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, _| {
        if x < width / 2 {
            Rgba([255, 0, 0, 255])
        } else {
            Rgba([0, 0, 255, 255])
        }
    })
}

pub struct FakeTrack {
    kind: TrackKind,
    pub stops: AtomicUsize,
}

impl FakeTrack {
    pub fn new(kind: TrackKind) -> Arc<Self> {
        Arc::new(Self {
            kind,
            stops: AtomicUsize::new(0),
        })
    }

    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

impl MediaTrack for FakeTrack {
    fn kind(&self) -> TrackKind {
        self.kind
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct FakeVideo {
    state: Mutex<ReadyState>,
    frame: RgbaImage,
}

impl FakeVideo {
    pub fn new(state: ReadyState, frame: RgbaImage) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(state),
            frame,
        })
    }

    #[allow(clippy::unwrap_used)]
    pub fn set_state(&self, state: ReadyState) {
        *self.state.lock().unwrap() = state;
    }
}

impl VideoSource for FakeVideo {
    #[allow(clippy::unwrap_used)]
    fn ready_state(&self) -> ReadyState {
        *self.state.lock().unwrap()
    }

    fn current_frame(&self) -> Option<VideoFrame> {
        Some(VideoFrame::new(self.frame.clone()))
    }
}

pub struct FakeStream {
    pub stream: Arc<MediaStream>,
    pub video: Arc<FakeVideo>,
    pub video_track: Arc<FakeTrack>,
    pub audio_track: Arc<FakeTrack>,
}

/// Stream with one video and one audio track delivering a 16x8 frame.
pub fn fake_stream(state: ReadyState) -> FakeStream {
    let video = FakeVideo::new(state, split_frame(16, 8));
    let video_track = FakeTrack::new(TrackKind::Video);
    let audio_track = FakeTrack::new(TrackKind::Audio);
    let stream = Arc::new(MediaStream::new(
        vec![
            Arc::clone(&video_track) as Arc<dyn MediaTrack>,
            Arc::clone(&audio_track) as Arc<dyn MediaTrack>,
        ],
        Some(Arc::clone(&video) as Arc<dyn VideoSource>),
    ));
    FakeStream {
        stream,
        video,
        video_track,
        audio_track,
    }
}

/// Test-side control of a [`FakeRecorder`].
#[derive(Clone, Default)]
pub struct RecorderControl {
    events: Arc<Mutex<Option<mpsc::UnboundedSender<RecorderEvent>>>>,
    stops: Arc<AtomicUsize>,
    options: Arc<Mutex<Option<RecorderOptions>>>,
}

impl RecorderControl {
    #[allow(clippy::unwrap_used)]
    pub fn emit(&self, event: RecorderEvent) {
        if let Some(tx) = self.events.lock().unwrap().as_ref() {
            let _ = tx.send(event);
        }
    }

    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    #[allow(clippy::unwrap_used)]
    pub fn options(&self) -> Option<RecorderOptions> {
        self.options.lock().unwrap().clone()
    }
}

/// Recorder that emits whatever the control tells it to and flushes `tail`
/// when stopped.
pub struct FakeRecorder {
    pub supported: Vec<&'static str>,
    pub mime: Option<String>,
    pub tail: Vec<u8>,
    pub fail_start: bool,
    pub control: RecorderControl,
}

impl FakeRecorder {
    pub fn webm(control: &RecorderControl) -> Self {
        Self {
            supported: vec!["video/webm;codecs=vp9,opus", "video/webm"],
            mime: Some("video/webm;codecs=vp9,opus".to_owned()),
            tail: b"tail".to_vec(),
            fail_start: false,
            control: control.clone(),
        }
    }
}

impl RecorderBackend for FakeRecorder {
    fn is_type_supported(&self, mime_type: &str) -> bool {
        self.supported.contains(&mime_type)
    }

    #[allow(clippy::unwrap_used)]
    fn start(
        &mut self,
        _stream: Arc<MediaStream>,
        options: &RecorderOptions,
    ) -> CoreResult<mpsc::UnboundedReceiver<RecorderEvent>> {
        if self.fail_start {
            return Err(BoothError::Recorder {
                reason: "unsupported".to_owned(),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        let (tx, rx) = mpsc::unbounded_channel();
        *self.control.events.lock().unwrap() = Some(tx);
        *self.control.options.lock().unwrap() = Some(options.clone());
        Ok(rx)
    }

    #[allow(clippy::unwrap_used)]
    fn stop(&mut self) {
        self.control.stops.fetch_add(1, Ordering::SeqCst);
        if let Some(tx) = self.control.events.lock().unwrap().take() {
            if !self.tail.is_empty() {
                let _ = tx.send(RecorderEvent::Data(self.tail.clone()));
            }
            let _ = tx.send(RecorderEvent::Stopped);
        }
    }

    fn mime_type(&self) -> Option<String> {
        self.mime.clone()
    }
}
