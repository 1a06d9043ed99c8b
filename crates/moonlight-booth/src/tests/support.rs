//! Fakes shared by the application tests.

use crate::{App, AppCommand, app::RecorderFactory, config::Config};

use moonlight_booth_core::{
    ArtifactCache, BoothError, CameraConstraints, CameraErrorKind, CameraProvider, CoreResult,
    EncodedImage, MediaStream, MediaTrack, MemoryStore, ReadyState, RecorderBackend, RecorderEvent,
    RecorderOptions, TrackKind, VideoFrame, VideoSource,
};

use std::{
    panic::Location,
    path::Path,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use error_location::ErrorLocation;
use image::{Rgba, RgbaImage};
use tokio::sync::mpsc;

pub struct CountingTrack {
    kind: TrackKind,
    stops: AtomicUsize,
}

impl CountingTrack {
    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

impl MediaTrack for CountingTrack {
    fn kind(&self) -> TrackKind {
        self.kind
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

struct StillVideo;

impl VideoSource for StillVideo {
    fn ready_state(&self) -> ReadyState {
        ReadyState::HaveEnoughData
    }

    fn current_frame(&self) -> Option<VideoFrame> {
        Some(VideoFrame::new(RgbaImage::from_fn(32, 24, |x, y| {
            Rgba([(x * 8) as u8, (y * 10) as u8, 128, 255])
        })))
    }
}

/// Camera handing out ready streams, or failing with `fail`.
#[derive(Default)]
pub struct FakeCamera {
    pub fail: Option<CameraErrorKind>,
    tracks: Mutex<Vec<Arc<CountingTrack>>>,
}

impl FakeCamera {
    pub fn denied() -> Self {
        Self {
            fail: Some(CameraErrorKind::PermissionDenied),
            ..Self::default()
        }
    }

    /// Every track handed out so far.
    #[allow(clippy::unwrap_used)]
    pub fn tracks(&self) -> Vec<Arc<CountingTrack>> {
        self.tracks.lock().unwrap().clone()
    }
}

impl CameraProvider for FakeCamera {
    #[allow(clippy::unwrap_used)]
    fn acquire(&self, _constraints: &CameraConstraints) -> CoreResult<Arc<MediaStream>> {
        if let Some(kind) = &self.fail {
            return Err(BoothError::Camera {
                kind: kind.clone(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let tracks: Vec<Arc<CountingTrack>> = [TrackKind::Video, TrackKind::Audio]
            .into_iter()
            .map(|kind| {
                Arc::new(CountingTrack {
                    kind,
                    stops: AtomicUsize::new(0),
                })
            })
            .collect();
        self.tracks.lock().unwrap().extend(tracks.iter().cloned());

        Ok(Arc::new(MediaStream::new(
            tracks
                .into_iter()
                .map(|t| t as Arc<dyn MediaTrack>)
                .collect(),
            Some(Arc::new(StillVideo)),
        )))
    }
}

/// Recorder that produces `b"reaction"` when stopped.
#[derive(Default)]
pub struct FakeRecorder {
    events: Option<mpsc::UnboundedSender<RecorderEvent>>,
}

impl RecorderBackend for FakeRecorder {
    fn is_type_supported(&self, mime_type: &str) -> bool {
        mime_type == "video/webm"
    }

    fn start(
        &mut self,
        _stream: Arc<MediaStream>,
        _options: &RecorderOptions,
    ) -> CoreResult<mpsc::UnboundedReceiver<RecorderEvent>> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.events = Some(tx);
        Ok(rx)
    }

    fn stop(&mut self) {
        if let Some(tx) = self.events.take() {
            let _ = tx.send(RecorderEvent::Data(b"reaction".to_vec()));
            let _ = tx.send(RecorderEvent::Stopped);
        }
    }

    fn mime_type(&self) -> Option<String> {
        Some("video/webm".to_owned())
    }
}

/// Four distinct solid-colour photos.
#[allow(clippy::unwrap_used)]
pub fn four_photos() -> Vec<EncodedImage> {
    [[220, 40, 40], [40, 180, 60], [40, 80, 220], [230, 200, 40]]
        .into_iter()
        .map(|[r, g, b]| EncodedImage::encode(&RgbaImage::from_pixel(16, 12, Rgba([r, g, b, 255]))).unwrap())
        .collect()
}

/// Default config with downloads under `dir`.
pub fn test_config(dir: &Path) -> Config {
    let mut config = Config::default();
    config.output.downloads_dir = dir.join("downloads");
    config
}

/// App wired to `camera`, the fake recorder and an in-memory cache.
pub fn test_app(
    config: Config,
    camera: Arc<FakeCamera>,
) -> (App, mpsc::Sender<AppCommand>, ArtifactCache) {
    let (command_tx, command_rx) = mpsc::channel(8);
    let cache = ArtifactCache::open(Arc::new(MemoryStore::new()), config.cache.max_photo_bytes);
    let recorders: RecorderFactory =
        Arc::new(|| Box::new(FakeRecorder::default()) as Box<dyn RecorderBackend>);
    let app = App::new(config, camera, recorders, Some(cache.clone()), command_rx);
    (app, command_tx, cache)
}
