//! Synthetic camera delivering a moving color-bar pattern.

use moonlight_booth_core::{
    CameraConstraints, CameraProvider, CoreResult, MediaStream, MediaTrack, ReadyState, TrackKind,
    VideoFrame, VideoSource,
};

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

use image::{Rgba, RgbaImage};
use tracing::{debug, info, instrument};

/// Time before the first frame is available.
const WARMUP: Duration = Duration::from_millis(200);

const BARS: [[u8; 3]; 7] = [
    [235, 235, 235],
    [235, 235, 16],
    [16, 235, 235],
    [16, 235, 16],
    [235, 16, 235],
    [235, 16, 16],
    [16, 16, 235],
];

/// [`CameraProvider`] that needs no hardware.
#[derive(Debug, Clone, Default)]
pub struct TestPatternCamera;

impl CameraProvider for TestPatternCamera {
    #[instrument(skip(self))]
    fn acquire(&self, constraints: &CameraConstraints) -> CoreResult<Arc<MediaStream>> {
        let source = Arc::new(PatternSource {
            started: Instant::now(),
            width: constraints.ideal_width,
            height: constraints.ideal_height,
        });

        let mut tracks: Vec<Arc<dyn MediaTrack>> =
            vec![Arc::new(SyntheticTrack::new(TrackKind::Video))];
        if constraints.audio {
            tracks.push(Arc::new(SyntheticTrack::new(TrackKind::Audio)));
        }

        info!(
            width = constraints.ideal_width,
            height = constraints.ideal_height,
            audio = constraints.audio,
            "Test pattern camera opened"
        );

        Ok(Arc::new(MediaStream::new(tracks, Some(source))))
    }
}

struct PatternSource {
    started: Instant,
    width: u32,
    height: u32,
}

impl VideoSource for PatternSource {
    fn ready_state(&self) -> ReadyState {
        if self.started.elapsed() >= WARMUP {
            ReadyState::HaveEnoughData
        } else {
            ReadyState::HaveMetadata
        }
    }

    fn current_frame(&self) -> Option<VideoFrame> {
        if !self.ready_state().has_current_frame() {
            return None;
        }
        Some(VideoFrame::new(pattern(
            self.width,
            self.height,
            self.started.elapsed(),
        )))
    }
}

/// Color bars scrolling right, one bar width per second.
pub(crate) fn pattern(width: u32, height: u32, elapsed: Duration) -> RgbaImage {
    let bar = (width / BARS.len() as u32).max(1);
    let period = u64::from(bar) * BARS.len() as u64;
    // The pattern repeats every `period` pixels.
    let offset = (elapsed.as_millis() * u128::from(bar) / 1000 % u128::from(period)) as u64;
    RgbaImage::from_fn(width, height, |x, y| {
        let index = ((u64::from(x) + offset) / u64::from(bar)) as usize % BARS.len();
        let [r, g, b] = BARS[index];
        // Darken the bottom quarter so orientation is visible.
        if y > height * 3 / 4 {
            Rgba([r / 2, g / 2, b / 2, 255])
        } else {
            Rgba([r, g, b, 255])
        }
    })
}

struct SyntheticTrack {
    kind: TrackKind,
    stopped: AtomicBool,
}

impl SyntheticTrack {
    fn new(kind: TrackKind) -> Self {
        Self {
            kind,
            stopped: AtomicBool::new(false),
        }
    }
}

impl MediaTrack for SyntheticTrack {
    fn kind(&self) -> TrackKind {
        self.kind
    }

    fn stop(&self) {
        if !self.stopped.swap(true, Ordering::AcqRel) {
            debug!(kind = ?self.kind, "Synthetic track stopped");
        }
    }
}
