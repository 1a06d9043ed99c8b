use crate::{AppCommand, AppError, AppResult, Downloads, config::Config, load_strip_font};

use moonlight_booth_core::{
    ArtifactCache, BoothCommand, BoothError, BoothHandle, CachedArtifacts, CameraConstraints,
    CameraErrorKind, CameraProvider, Compositor, CoreResult, EncodedImage, FRAME_DESIGNS,
    FlowController, FlowEvent, FlowStage, FrameDesign, MediaStream, ObjectUrls, Overlay,
    RecorderBackend, RecordingArtifact, RecordingHandle, RecordingSession, StripRenderer,
    artifact_filename, cached_artifact_filename, find_design, unix_millis_now,
};

use std::{fmt::Write as _, panic::Location, sync::Arc};

use error_location::ErrorLocation;
use time::{Date, OffsetDateTime};
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

/// Builds a fresh recorder for every recording.
pub(crate) type RecorderFactory = Arc<dyn Fn() -> Box<dyn RecorderBackend> + Send + Sync>;

/// A frame-select thumbnail.
#[derive(Debug, Clone)]
pub(crate) struct Preview {
    pub(crate) design_id: &'static str,
    pub(crate) image: EncodedImage,
}

/// Results of background work, tagged with the epoch they were started in.
enum AppEvent {
    CameraOpened {
        epoch: u64,
        result: CoreResult<Arc<MediaStream>>,
    },
    PreviewsRendered {
        epoch: u64,
        previews: Vec<Preview>,
    },
    StripRendered {
        epoch: u64,
        design_id: &'static str,
        result: CoreResult<EncodedImage>,
    },
}

/// Main application state.
///
/// Owns the camera stream, the booth and recording tasks and the flow
/// controller. Slow work (camera acquisition, rendering) runs in the
/// background and reports back through `event_rx`; results from an epoch
/// that has since been left (restart, back) are discarded.
pub struct App {
    pub(crate) config: Config,
    pub(crate) camera: Arc<dyn CameraProvider>,
    pub(crate) recorders: RecorderFactory,
    pub(crate) compositor: Compositor,
    pub(crate) renderer: StripRenderer,
    pub(crate) cache: Option<ArtifactCache>,
    pub(crate) cached: CachedArtifacts,
    pub(crate) urls: ObjectUrls,
    pub(crate) downloads: Downloads,
    pub(crate) flow: FlowController,
    pub(crate) epoch: u64,
    pub(crate) stream: Option<Arc<MediaStream>>,
    pub(crate) booth: Option<BoothHandle>,
    pub(crate) recording: Option<RecordingHandle>,
    pub(crate) video: Option<RecordingArtifact>,
    pub(crate) previews: Vec<Preview>,
    pub(crate) rendering: bool,
    pub(crate) command_rx: mpsc::Receiver<AppCommand>,
    event_tx: mpsc::Sender<AppEvent>,
    event_rx: mpsc::Receiver<AppEvent>,
}

impl App {
    /// Assembles the application. Loads the overlay, the strip font and
    /// the cached artifacts of the previous run.
    #[instrument(skip_all)]
    pub(crate) fn new(
        config: Config,
        camera: Arc<dyn CameraProvider>,
        recorders: RecorderFactory,
        cache: Option<ArtifactCache>,
        command_rx: mpsc::Receiver<AppCommand>,
    ) -> Self {
        let overlay = config
            .booth
            .overlay_path
            .as_deref()
            .map(Overlay::load)
            .unwrap_or_default();
        let font = load_strip_font(config.booth.font_path.as_deref());
        let cached = cache.as_ref().map(ArtifactCache::load_last).unwrap_or_default();
        let downloads = Downloads::new(
            config.output.downloads_dir.clone(),
            config.output.open_downloads,
        );
        let (event_tx, event_rx) = mpsc::channel(8);

        Self {
            config,
            camera,
            recorders,
            compositor: Compositor::new(overlay),
            renderer: StripRenderer::new(font),
            cache,
            cached,
            urls: ObjectUrls::new(),
            downloads,
            flow: FlowController::new(),
            epoch: 0,
            stream: None,
            booth: None,
            recording: None,
            video: None,
            previews: Vec::new(),
            rendering: false,
            command_rx,
            event_tx,
            event_rx,
        }
    }

    /// Run the main application event loop.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!(downloads = ?self.downloads.dir(), "Moonlight Booth starting");
        println!("{}", self.status());

        loop {
            tokio::select! {
                command = self.command_rx.recv() => {
                    let Some(command) = command else {
                        info!("Command channel closed, shutting down");
                        self.shutdown();
                        break;
                    };
                    match self.handle(command).await {
                        Ok(true) => {}
                        Ok(false) => break,
                        Err(e) => error!(error = ?e, "Command failed"),
                    }
                    println!("{}", self.status());
                }

                Some(event) = self.event_rx.recv() => {
                    self.on_event(event);
                    println!("{}", self.status());
                }
            }
        }

        info!("Moonlight Booth shut down successfully");
        Ok(())
    }

    /// Applies one command. Returns `false` once shutdown was requested.
    #[instrument(skip(self))]
    pub(crate) async fn handle(&mut self, command: AppCommand) -> AppResult<bool> {
        match command {
            AppCommand::Start => self.open_camera(),
            AppCommand::Shoot => self.forward(BoothCommand::Shoot).await?,
            AppCommand::Mode(mode) => self.forward(BoothCommand::SetMode(mode)).await?,
            AppCommand::Countdown => self.forward(BoothCommand::StartCountdown).await?,
            AppCommand::CancelCountdown => self.forward(BoothCommand::CancelCountdown).await?,
            AppCommand::Select(slot) => self.forward(BoothCommand::Select(slot)).await?,
            AppCommand::Deselect => self.forward(BoothCommand::ClearSelection).await?,
            AppCommand::Retake => self.forward(BoothCommand::Retake).await?,
            AppCommand::ResetPhotos => self.forward(BoothCommand::Reset).await?,
            AppCommand::Next => self.leave_booth().await?,
            AppCommand::Choose(id) => self.choose_design(&id),
            AppCommand::Continue => self.finish().await,
            AppCommand::Back => self.back(),
            AppCommand::SaveStrip => {
                self.save_strip()?;
            }
            AppCommand::SaveVideo => {
                self.save_video()?;
            }
            AppCommand::DismissError => {
                let _ = self.flow.apply(FlowEvent::DismissError);
            }
            AppCommand::Restart => {
                self.teardown();
                let _ = self.flow.apply(FlowEvent::Restart);
            }
            AppCommand::Status => {}
            AppCommand::Shutdown => {
                info!("Shutdown requested");
                self.shutdown();
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn open_camera(&mut self) {
        if !self.flow.begin_acquire() {
            warn!(stage = %self.flow.stage(), "Camera is already opening or in use");
            return;
        }

        let camera = Arc::clone(&self.camera);
        let event_tx = self.event_tx.clone();
        let epoch = self.epoch;

        tokio::spawn(async move {
            let acquired =
                tokio::task::spawn_blocking(move || camera.acquire(&CameraConstraints::default()))
                    .await;
            let result = acquired.unwrap_or_else(|e| {
                error!(error = %e, "Camera task failed");
                Err(BoothError::Camera {
                    kind: CameraErrorKind::Other(None),
                    location: ErrorLocation::from(Location::caller()),
                })
            });

            if let Err(mpsc::error::SendError(AppEvent::CameraOpened {
                result: Ok(stream), ..
            })) = event_tx.send(AppEvent::CameraOpened { epoch, result }).await
            {
                // Nobody is left to own the stream.
                stream.stop_all_tracks();
            }
        });
    }

    async fn forward(&self, command: BoothCommand) -> AppResult<()> {
        match &self.booth {
            Some(booth) if self.flow.stage() == FlowStage::Booth => {
                booth.send(command).await?;
            }
            _ => warn!(stage = %self.flow.stage(), ?command, "Not in the booth"),
        }
        Ok(())
    }

    async fn leave_booth(&mut self) -> AppResult<()> {
        let Some(booth) = self.booth.as_ref().filter(|_| self.flow.stage() == FlowStage::Booth)
        else {
            warn!(stage = %self.flow.stage(), "Next is only available in the booth");
            return Ok(());
        };

        let Some(photos) = booth.photos().await? else {
            info!("Take all four photos before continuing");
            return Ok(());
        };

        if self.flow.apply(FlowEvent::BoothCompleted(photos.clone())).is_ok() {
            self.render_previews(photos);
        }
        Ok(())
    }

    fn render_previews(&mut self, photos: Vec<EncodedImage>) {
        let designs: Vec<FrameDesign> = FRAME_DESIGNS.iter().map(|d| self.config.branded(d)).collect();
        let renderer = self.renderer.clone();
        let width = self.config.output.preview_width;
        let event_tx = self.event_tx.clone();
        let epoch = self.epoch;

        tokio::spawn(async move {
            let rendered = tokio::task::spawn_blocking(move || {
                let date = today();
                designs
                    .iter()
                    .filter_map(|design| {
                        match renderer.render(&photos, design, width, date) {
                            Ok(image) => Some(Preview {
                                design_id: design.id,
                                image,
                            }),
                            Err(e) => {
                                warn!(design = design.id, error = %e, "Preview skipped");
                                None
                            }
                        }
                    })
                    .collect::<Vec<_>>()
            })
            .await;

            match rendered {
                Ok(previews) => {
                    let _ = event_tx
                        .send(AppEvent::PreviewsRendered { epoch, previews })
                        .await;
                }
                Err(e) => error!(error = %e, "Preview task failed"),
            }
        });
    }

    fn choose_design(&mut self, id: &str) {
        if self.flow.stage() != FlowStage::FrameSelect {
            warn!(stage = %self.flow.stage(), "Designs are chosen on the frame-select screen");
            return;
        }
        if self.rendering {
            debug!("Strip render already in progress");
            return;
        }
        let Some(design) = find_design(id) else {
            warn!(design = id, "Unknown frame design");
            return;
        };
        let Some(photos) = self.flow.state().photos().map(<[EncodedImage]>::to_vec) else {
            return;
        };

        let design = self.config.branded(design);
        let renderer = self.renderer.clone();
        let width = self.config.output.full_width;
        let event_tx = self.event_tx.clone();
        let epoch = self.epoch;
        self.rendering = true;
        info!(design = design.id, width, "Rendering strip");

        tokio::spawn(async move {
            let design_id = design.id;
            let result = tokio::task::spawn_blocking(move || {
                renderer.render(&photos, &design, width, today())
            })
            .await
            .unwrap_or_else(|e| {
                error!(error = %e, "Render task failed");
                Err(BoothError::TaskClosed {
                    task: "render",
                    location: ErrorLocation::from(Location::caller()),
                })
            });

            let _ = event_tx
                .send(AppEvent::StripRendered {
                    epoch,
                    design_id,
                    result,
                })
                .await;
        });
    }

    async fn finish(&mut self) {
        if self.flow.apply(FlowEvent::InterstitialDismissed).is_err() {
            return;
        }
        if let Some(recording) = &self.recording {
            self.video = recording.stop().await;
            match &self.video {
                Some(video) => info!(
                    filename = %video.filename,
                    bytes = video.bytes.len(),
                    "Reaction video ready"
                ),
                None => info!("No reaction video was produced"),
            }
        }
    }

    fn back(&mut self) {
        let Ok(stage) = self.flow.apply(FlowEvent::Back) else {
            return;
        };
        // Anything still rendering belongs to the screen we just left.
        self.epoch += 1;
        self.rendering = false;
        self.previews.clear();

        if stage == FlowStage::FrameSelect
            && let Some(photos) = self.flow.state().photos().map(<[EncodedImage]>::to_vec)
        {
            self.render_previews(photos);
        }
    }

    #[track_caller]
    fn save_strip(&self) -> AppResult<std::path::PathBuf> {
        let product = &self.config.branding.product_name;
        if let Some(strip) = self.flow.state().strip() {
            let filename = artifact_filename(product, unix_millis_now(), "png");
            return self.downloads.save(&filename, strip.as_bytes());
        }
        if let Some(photo) = &self.cached.last_photo {
            info!("Offering the photo from the previous session");
            let filename = cached_artifact_filename(product, "png");
            return self.downloads.save(&filename, photo.as_bytes());
        }
        Err(AppError::NothingToDownload {
            what: "strip",
            location: ErrorLocation::from(Location::caller()),
        })
    }

    #[track_caller]
    fn save_video(&self) -> AppResult<std::path::PathBuf> {
        if let Some(video) = &self.video
            && let Some(bytes) = self.urls.resolve(&video.url)
        {
            return self.downloads.save(&video.filename, &bytes);
        }
        if self.recording.as_ref().is_some_and(|r| r.status().is_recording()) {
            info!("Reaction video is still recording");
        } else if let Some(bytes) = &self.cached.last_video {
            info!("Offering the video from the previous session");
            let filename = cached_artifact_filename(&self.config.branding.product_name, "webm");
            return self.downloads.save(&filename, bytes);
        }
        Err(AppError::NothingToDownload {
            what: "video",
            location: ErrorLocation::from(Location::caller()),
        })
    }

    fn on_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::CameraOpened { epoch, result } => self.on_camera_opened(epoch, result),
            AppEvent::PreviewsRendered { epoch, previews } => {
                if epoch == self.epoch && self.flow.stage() == FlowStage::FrameSelect {
                    debug!(
                        count = previews.len(),
                        bytes = previews.iter().map(|p| p.image.len()).sum::<usize>(),
                        "Previews ready"
                    );
                    self.previews = previews;
                }
            }
            AppEvent::StripRendered {
                epoch,
                design_id,
                result,
            } => self.on_strip_rendered(epoch, design_id, result),
        }
    }

    fn on_camera_opened(&mut self, epoch: u64, result: CoreResult<Arc<MediaStream>>) {
        if epoch != self.epoch || !self.flow.is_acquiring() {
            if let Ok(stream) = result {
                debug!(stream_id = %stream.id(), "Stale camera stream released");
                stream.stop_all_tracks();
            }
            return;
        }

        let stream = match result {
            Ok(stream) => stream,
            Err(BoothError::Camera { kind, .. }) => {
                let _ = self.flow.apply(FlowEvent::CameraFailed(kind));
                return;
            }
            Err(e) => {
                error!(error = ?e, "Camera acquisition failed");
                let _ = self
                    .flow
                    .apply(FlowEvent::CameraFailed(CameraErrorKind::Other(None)));
                return;
            }
        };

        if self.flow.apply(FlowEvent::StreamAcquired).is_err() {
            stream.stop_all_tracks();
            return;
        }

        self.booth = Some(BoothHandle::spawn(
            Arc::clone(&stream),
            self.compositor.clone(),
            self.config.booth.interval_secs,
            self.cache.clone(),
        ));
        let session = RecordingSession::new(
            self.config.recording_config(),
            self.urls.clone(),
            self.cache.clone(),
        );
        self.recording = session.start((self.recorders)(), Arc::clone(&stream));
        self.stream = Some(stream);
    }

    fn on_strip_rendered(
        &mut self,
        epoch: u64,
        design_id: &'static str,
        result: CoreResult<EncodedImage>,
    ) {
        if epoch != self.epoch {
            debug!(design = design_id, "Stale strip discarded");
            return;
        }
        self.rendering = false;

        match result {
            Ok(strip) => {
                if self.flow.apply(FlowEvent::StripRendered(strip.clone())).is_ok()
                    && let Some(cache) = self.cache.clone()
                {
                    tokio::task::spawn_blocking(move || cache.remember_photo(&strip));
                }
            }
            Err(e) => {
                error!(design = design_id, error = ?e, "Strip render failed");
            }
        }
    }

    /// Stops everything tied to the current pass. Safe to call repeatedly.
    fn teardown(&mut self) {
        self.epoch += 1;
        self.rendering = false;
        self.previews.clear();
        self.booth = None;
        // Dropping the handle stops the recorder and revokes its URL.
        self.recording = None;
        self.video = None;
        if let Some(stream) = self.stream.take() {
            stream.stop_all_tracks();
        }
    }

    fn shutdown(&mut self) {
        self.teardown();
        if let Some(cache) = &self.cache {
            cache.close();
        }
    }

    /// One-line summary of the current screen.
    pub(crate) fn status(&self) -> String {
        let stage = self.flow.stage();
        let mut line = format!("[{stage}]");

        match stage {
            FlowStage::Start => {
                if self.flow.is_acquiring() {
                    line.push_str(" opening camera...");
                } else {
                    line.push_str(" type 'start' to begin");
                }
                if !self.cached.is_empty() {
                    line.push_str(" | last session available ('save strip' / 'save video')");
                }
            }
            FlowStage::Booth => {
                if let Some(booth) = &self.booth {
                    let s = booth.snapshot();
                    let _ = write!(line, " photos {}/{} mode {:?}", s.filled, s.slots.len(), s.mode);
                    if let Some(countdown) = s.countdown {
                        let _ = write!(line, " countdown {}s", countdown.remaining_secs);
                    }
                    if let Some(slot) = s.selected {
                        let _ = write!(line, " retake #{}", slot + 1);
                    }
                    if s.complete {
                        line.push_str(" | 'next' to choose a frame");
                    }
                }
            }
            FlowStage::FrameSelect => {
                let ids: Vec<_> = self.previews.iter().map(|p| p.design_id).collect();
                if self.rendering {
                    line.push_str(" rendering strip...");
                } else if ids.is_empty() {
                    line.push_str(" rendering previews...");
                } else {
                    let _ = write!(line, " choose one of: {}", ids.join(", "));
                }
            }
            FlowStage::Valentine => line.push_str(" strip ready! 'continue'"),
            FlowStage::End => {
                line.push_str(" 'save strip'");
                if self.video.is_some() {
                    line.push_str(" / 'save video'");
                }
                line.push_str(" | 'restart' for the next guest");
            }
        }

        if let Some(recording) = &self.recording
            && recording.status().is_recording()
        {
            line.push_str(" | recording");
        }
        if let Some(kind) = self.flow.camera_error() {
            let _ = write!(line, " | error: {kind} ('dismiss')");
        }
        line
    }

    /// Waits for one background result and applies it.
    #[cfg(test)]
    pub(crate) async fn pump(&mut self) -> bool {
        match self.event_rx.recv().await {
            Some(event) => {
                self.on_event(event);
                true
            }
            None => false,
        }
    }
}

fn today() -> Date {
    OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .date()
}
