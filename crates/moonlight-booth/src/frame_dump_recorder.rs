//! Recorder backend that samples the live stream into a sequence of PNG
//! thumbnails, one per time slice.

use moonlight_booth_core::{
    CoreResult, EncodedImage, MediaStream, RecorderBackend, RecorderEvent, RecorderOptions,
};

use std::{sync::Arc, time::Duration};

use image::imageops::{self, FilterType};
use tokio::{
    sync::{mpsc, oneshot},
    time::{MissedTickBehavior, interval},
};
use tracing::{debug, info, instrument, warn};

/// Container type reported for frame dumps.
pub const FRAME_DUMP_MIME_TYPE: &str = "application/x-moonlight-frames";

/// Width of each sampled frame.
const SAMPLE_WIDTH: u32 = 160;

/// [`RecorderBackend`] with no codec dependencies.
///
/// Output is the concatenation of PNG streams, so it is only readable by
/// tools that split on PNG signatures.
#[derive(Debug, Default)]
pub struct FrameDumpRecorder {
    stop_tx: Option<oneshot::Sender<()>>,
}

impl FrameDumpRecorder {
    /// Creates an idle recorder.
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecorderBackend for FrameDumpRecorder {
    fn is_type_supported(&self, mime_type: &str) -> bool {
        mime_type == FRAME_DUMP_MIME_TYPE
    }

    #[instrument(skip_all, fields(stream_id = %stream.id()))]
    fn start(
        &mut self,
        stream: Arc<MediaStream>,
        options: &RecorderOptions,
    ) -> CoreResult<mpsc::UnboundedReceiver<RecorderEvent>> {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (stop_tx, stop_rx) = oneshot::channel();
        self.stop_tx = Some(stop_tx);

        tokio::spawn(sample(stream, options.timeslice, events_tx, stop_rx));
        info!(timeslice_ms = options.timeslice.as_millis(), "Frame dump recorder started");

        Ok(events_rx)
    }

    fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
            debug!("Frame dump recorder stop requested");
        }
    }

    fn mime_type(&self) -> Option<String> {
        Some(FRAME_DUMP_MIME_TYPE.to_owned())
    }
}

async fn sample(
    stream: Arc<MediaStream>,
    timeslice: Duration,
    events_tx: mpsc::UnboundedSender<RecorderEvent>,
    mut stop_rx: oneshot::Receiver<()>,
) {
    let mut ticker = interval(timeslice);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut frames = 0usize;

    loop {
        tokio::select! {
            _ = &mut stop_rx => break,
            _ = ticker.tick() => {
                let chunk = grab(&stream).await;
                frames += usize::from(!chunk.is_empty());
                if events_tx.send(RecorderEvent::Data(chunk)).is_err() {
                    return;
                }
            }
        }
    }

    // Final slice on stop.
    let chunk = grab(&stream).await;
    frames += usize::from(!chunk.is_empty());
    let _ = events_tx.send(RecorderEvent::Data(chunk));
    let _ = events_tx.send(RecorderEvent::Stopped);
    info!(frames, "Frame dump recorder stopped");
}

/// One downscaled PNG of the current frame, or nothing if no frame is ready.
async fn grab(stream: &MediaStream) -> Vec<u8> {
    if !stream.ready_state().has_current_frame() {
        return Vec::new();
    }
    let Some(frame) = stream.video().and_then(|v| v.current_frame()) else {
        return Vec::new();
    };

    let encoded = tokio::task::spawn_blocking(move || {
        let image = frame.image();
        let height = (u64::from(image.height()) * u64::from(SAMPLE_WIDTH)
            / u64::from(image.width().max(1)))
        .max(1) as u32;
        let small = imageops::resize(image, SAMPLE_WIDTH, height, FilterType::Triangle);
        EncodedImage::encode(&small)
    })
    .await;

    match encoded {
        Ok(Ok(png)) => png.as_bytes().to_vec(),
        Ok(Err(e)) => {
            warn!(error = %e, "Frame sample could not be encoded");
            Vec::new()
        }
        Err(e) => {
            warn!(error = %e, "Frame sample task failed");
            Vec::new()
        }
    }
}
