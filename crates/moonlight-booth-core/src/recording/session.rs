//! Bounded reaction recording.
//!
//! A recording runs as its own task, independent of the booth. It ends when
//! the max duration elapses, when [`RecordingHandle::stop`] is called, or
//! when the handle is dropped; the recorder is stopped exactly once in every
//! case. The camera stream's tracks are never stopped here.

use crate::{
    ArtifactCache, MediaStream, ObjectUrl, ObjectUrls, RecordingArtifact, artifact_filename,
    extension_for_mime, unix_millis_now,
    recording::backend::{
        AUDIO_BITS_PER_SECOND, FALLBACK_MIME_TYPE, RecorderBackend, RecorderEvent,
        RecorderOptions, VIDEO_BITS_PER_SECOND, preferred_mime_type,
    },
};

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{mpsc, oneshot, watch},
    task::JoinHandle,
    time::{Instant, sleep_until},
};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Default recording ceiling.
pub const DEFAULT_MAX_DURATION: Duration = Duration::from_secs(18);
/// Default recorder time slice.
pub const DEFAULT_TIMESLICE: Duration = Duration::from_millis(1000);

/// Recording parameters.
#[derive(Debug, Clone)]
pub struct RecordingConfig {
    /// Recording stops on its own after this long.
    pub max_duration: Duration,
    /// Recorder time slice.
    pub timeslice: Duration,
    /// Video bitrate requested with an explicit mime type.
    pub video_bits_per_second: u32,
    /// Audio bitrate requested with an explicit mime type.
    pub audio_bits_per_second: u32,
    /// Prefix of the artifact filename.
    pub product_name: String,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            max_duration: DEFAULT_MAX_DURATION,
            timeslice: DEFAULT_TIMESLICE,
            video_bits_per_second: VIDEO_BITS_PER_SECOND,
            audio_bits_per_second: AUDIO_BITS_PER_SECOND,
            product_name: "moon-light-room".to_owned(),
        }
    }
}

/// Why the recorder was stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopCause {
    /// The max duration elapsed.
    MaxDuration,
    /// [`RecordingHandle::stop`] was called.
    Requested,
    /// The handle was dropped.
    Teardown,
    /// The recorder reported an error or stopped by itself.
    Recorder,
}

/// Observable recording state.
#[derive(Debug, Clone)]
pub enum RecordingStatus {
    /// Recording in progress.
    Recording,
    /// Stopped with an artifact.
    Finished(RecordingArtifact),
    /// Stopped without any data.
    Empty,
    /// The recorder failed; no artifact.
    Failed(String),
}

impl RecordingStatus {
    /// The artifact, if the recording produced one.
    pub fn artifact(&self) -> Option<&RecordingArtifact> {
        match self {
            Self::Finished(artifact) => Some(artifact),
            _ => None,
        }
    }

    /// True while recording.
    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording)
    }
}

enum RecordingCommand {
    Stop {
        reply: oneshot::Sender<Option<RecordingArtifact>>,
    },
}

/// Handle to a running (or finished) recording.
///
/// Dropping the handle forces a stop if still recording and revokes the
/// artifact's object URL.
#[derive(Debug)]
pub struct RecordingHandle {
    id: Uuid,
    command_tx: mpsc::Sender<RecordingCommand>,
    status_rx: watch::Receiver<RecordingStatus>,
    urls: ObjectUrls,
    task: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for RecordingCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Stop")
    }
}

/// Starts reaction recordings.
#[derive(Debug, Clone)]
pub struct RecordingSession {
    config: RecordingConfig,
    urls: ObjectUrls,
    cache: Option<ArtifactCache>,
}

impl RecordingSession {
    /// Creates a session publishing artifacts through `urls` and remembering
    /// them in `cache`.
    pub fn new(config: RecordingConfig, urls: ObjectUrls, cache: Option<ArtifactCache>) -> Self {
        Self { config, urls, cache }
    }

    /// Starts recording `stream` with `backend`.
    ///
    /// Returns `None` when the stream has no video track. A backend that
    /// fails to start yields a handle whose status is already `Failed`.
    #[instrument(skip_all, fields(stream_id = %stream.id()))]
    pub fn start(
        &self,
        mut backend: Box<dyn RecorderBackend>,
        stream: Arc<MediaStream>,
    ) -> Option<RecordingHandle> {
        if stream.video_track_count() == 0 {
            debug!("Stream has no video track, not recording");
            return None;
        }

        let id = Uuid::new_v4();
        let mime = preferred_mime_type(backend.as_ref());
        let options = RecorderOptions::for_mime(mime, &self.config);
        let (command_tx, command_rx) = mpsc::channel(4);

        let events = match backend.start(stream, &options) {
            Ok(events) => events,
            Err(e) => {
                error!(recording_id = %id, error = %e, "Failed to start recording");
                let (_, status_rx) =
                    watch::channel(RecordingStatus::Failed("Failed to start recording".to_owned()));
                return Some(RecordingHandle {
                    id,
                    command_tx,
                    status_rx,
                    urls: self.urls.clone(),
                    task: None,
                });
            }
        };

        info!(
            recording_id = %id,
            mime = mime.unwrap_or("platform default"),
            max_duration_ms = self.config.max_duration.as_millis(),
            "Recording started"
        );

        let (status_tx, status_rx) = watch::channel(RecordingStatus::Recording);
        let task = RecordingTask {
            id,
            backend,
            events,
            command_rx,
            status_tx,
            deadline: Instant::now() + self.config.max_duration,
            config: self.config.clone(),
            urls: self.urls.clone(),
            cache: self.cache.clone(),
        };

        Some(RecordingHandle {
            id,
            command_tx,
            status_rx,
            urls: self.urls.clone(),
            task: Some(tokio::spawn(task.run())),
        })
    }
}

impl RecordingHandle {
    /// Recording identifier for log correlation.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Current status.
    pub fn status(&self) -> RecordingStatus {
        self.status_rx.borrow().clone()
    }

    /// Receiver for status changes.
    pub fn subscribe(&self) -> watch::Receiver<RecordingStatus> {
        self.status_rx.clone()
    }

    /// Stops the recording and waits for the artifact.
    ///
    /// On a recording that already ended this is a no-op returning the
    /// existing artifact.
    #[instrument(skip(self), fields(recording_id = %self.id))]
    pub async fn stop(&self) -> Option<RecordingArtifact> {
        let (reply, rx) = oneshot::channel();
        if self
            .command_tx
            .send(RecordingCommand::Stop { reply })
            .await
            .is_ok()
            && let Ok(artifact) = rx.await
        {
            return artifact;
        }
        self.finished().await
    }

    /// Waits until the recording has ended and returns its artifact.
    pub async fn finished(&self) -> Option<RecordingArtifact> {
        let mut rx = self.status_rx.clone();
        match rx.wait_for(|s| !s.is_recording()).await {
            Ok(status) => status.artifact().cloned(),
            Err(_) => self.status().artifact().cloned(),
        }
    }
}

impl Drop for RecordingHandle {
    fn drop(&mut self) {
        // Closing the command channel makes a running task stop the
        // recorder; the task then revokes its own URL.
        if let Some(task) = &self.task
            && !task.is_finished()
        {
            debug!(recording_id = %self.id, "Recording torn down");
        }
        if let Some(artifact) = self.status_rx.borrow().artifact() {
            self.urls.revoke(&artifact.url);
        }
    }
}

struct RecordingTask {
    id: Uuid,
    backend: Box<dyn RecorderBackend>,
    events: mpsc::UnboundedReceiver<RecorderEvent>,
    command_rx: mpsc::Receiver<RecordingCommand>,
    status_tx: watch::Sender<RecordingStatus>,
    deadline: Instant,
    config: RecordingConfig,
    urls: ObjectUrls,
    cache: Option<ArtifactCache>,
}

impl RecordingTask {
    async fn run(mut self) {
        let mut chunks: Vec<Vec<u8>> = Vec::new();
        let mut stop_cause: Option<StopCause> = None;
        let mut failure: Option<String> = None;
        let mut replies = Vec::new();
        let mut handle_dropped = false;

        loop {
            tokio::select! {
                event = self.events.recv() => match event {
                    Some(RecorderEvent::Data(data)) => {
                        if !data.is_empty() {
                            chunks.push(data);
                        }
                    }
                    Some(RecorderEvent::Error(message)) => {
                        let message = message.unwrap_or_else(|| "Recording failed".to_owned());
                        warn!(recording_id = %self.id, error = %message, "Recorder error");
                        failure = Some(message);
                        self.stop_once(&mut stop_cause, StopCause::Recorder);
                    }
                    Some(RecorderEvent::Stopped) | None => break,
                },
                command = self.command_rx.recv(), if !handle_dropped => match command {
                    Some(RecordingCommand::Stop { reply }) => {
                        replies.push(reply);
                        self.stop_once(&mut stop_cause, StopCause::Requested);
                    }
                    None => {
                        handle_dropped = true;
                        self.stop_once(&mut stop_cause, StopCause::Teardown);
                    }
                },
                _ = sleep_until(self.deadline), if stop_cause.is_none() => {
                    self.stop_once(&mut stop_cause, StopCause::MaxDuration);
                }
            }
        }

        // Make sure the recorder is inactive even if it stopped by itself.
        self.stop_once(&mut stop_cause, StopCause::Recorder);

        let status = match failure {
            Some(message) => RecordingStatus::Failed(message),
            None if chunks.is_empty() => RecordingStatus::Empty,
            None => RecordingStatus::Finished(self.assemble(chunks)),
        };

        info!(
            recording_id = %self.id,
            cause = ?stop_cause,
            status = status_label(&status),
            "Recording finished"
        );

        let artifact = status.artifact().cloned();
        self.status_tx.send_replace(status);
        if (handle_dropped || self.status_tx.is_closed())
            && let Some(artifact) = &artifact
        {
            // Nobody is left to download it.
            self.urls.revoke(&artifact.url);
        }
        for reply in replies {
            let _ = reply.send(artifact.clone());
        }

        // Answer stops that raced with the end of the recording.
        self.command_rx.close();
        while let Ok(RecordingCommand::Stop { reply }) = self.command_rx.try_recv() {
            let _ = reply.send(artifact.clone());
        }

        if let Some(artifact) = &artifact {
            persist(self.id, self.cache.clone(), artifact);
        }
    }

    fn stop_once(&mut self, stop_cause: &mut Option<StopCause>, cause: StopCause) {
        if stop_cause.is_some() {
            return;
        }
        *stop_cause = Some(cause);
        debug!(recording_id = %self.id, ?cause, "Stopping recorder");
        self.backend.stop();
    }

    fn assemble(&self, chunks: Vec<Vec<u8>>) -> RecordingArtifact {
        let bytes: Arc<[u8]> = chunks.concat().into();
        let mime_type = self
            .backend
            .mime_type()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| FALLBACK_MIME_TYPE.to_owned());
        let filename = artifact_filename(
            &self.config.product_name,
            unix_millis_now(),
            extension_for_mime(&mime_type),
        );
        let url: ObjectUrl = self.urls.create(Arc::clone(&bytes));
        debug!(recording_id = %self.id, bytes = bytes.len(), %filename, "Recording assembled");

        RecordingArtifact {
            bytes,
            mime_type,
            filename,
            url,
        }
    }
}

/// Offers the finished recording to the cache in the background. Nobody
/// waits on the write.
fn persist(recording_id: Uuid, cache: Option<ArtifactCache>, artifact: &RecordingArtifact) {
    let Some(cache) = cache else {
        return;
    };
    let bytes = Arc::clone(&artifact.bytes);
    let _ = tokio::task::spawn_blocking(move || {
        if !cache.remember_video(&bytes) {
            debug!(%recording_id, "Recording not cached");
        }
    });
}

fn status_label(status: &RecordingStatus) -> &'static str {
    match status {
        RecordingStatus::Recording => "recording",
        RecordingStatus::Finished(_) => "finished",
        RecordingStatus::Empty => "empty",
        RecordingStatus::Failed(_) => "failed",
    }
}
