//! Async driver that runs a [`CaptureSession`] against a live stream.

use crate::{
    ArtifactCache, BoothError, CaptureMode, CaptureRejected, CaptureSession, CaptureTicket,
    Compositor, CoreResult, Countdown, EncodedImage, MediaStream, PHOTO_COUNT, TickOutcome,
};

use std::{panic::Location, sync::Arc, time::Duration};

use error_location::ErrorLocation;
use tokio::{
    sync::{mpsc, oneshot, watch},
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval_at, sleep_until},
};
use tracing::{debug, info, instrument, warn};

/// Delay between admitting a capture and grabbing the frame: two display
/// frames at 60 Hz.
pub const FRAME_DELAY: Duration = Duration::from_millis(33);

const COUNTDOWN_STEP: Duration = Duration::from_secs(1);

/// User actions on the booth screen.
#[derive(Debug)]
pub enum BoothCommand {
    /// Take one photo (manual mode).
    Shoot,
    /// Switch between manual and timed capture.
    SetMode(CaptureMode),
    /// Start the timed countdown.
    StartCountdown,
    /// Stop the timed countdown.
    CancelCountdown,
    /// Select a slot for retake.
    Select(usize),
    /// Drop the retake selection.
    ClearSelection,
    /// Retake the selected slot.
    Retake,
    /// Discard all photos.
    Reset,
    /// Hand out the finished photo set, if complete.
    Photos {
        /// Receives the photos in slot order.
        reply: oneshot::Sender<Option<Vec<EncodedImage>>>,
    },
}

/// Observable booth state, published after every change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoothSnapshot {
    /// Which slots hold a photo.
    pub slots: [bool; PHOTO_COUNT],
    /// Number of filled slots.
    pub filled: usize,
    /// Current capture mode.
    pub mode: CaptureMode,
    /// Running countdown.
    pub countdown: Option<Countdown>,
    /// Slot selected for retake.
    pub selected: Option<usize>,
    /// A grab is pending.
    pub capturing: bool,
    /// All slots filled and nothing pending.
    pub complete: bool,
    /// Most recent rejected request.
    pub last_rejection: Option<CaptureRejected>,
}

impl BoothSnapshot {
    fn of(session: &CaptureSession, last_rejection: Option<CaptureRejected>) -> Self {
        Self {
            slots: std::array::from_fn(|i| session.slot(i).is_some()),
            filled: session.filled(),
            mode: session.mode(),
            countdown: session.countdown(),
            selected: session.selected(),
            capturing: session.is_capturing(),
            complete: session.is_complete(),
            last_rejection,
        }
    }
}

/// Handle to a running booth task.
///
/// Dropping the handle stops the task, which cancels the countdown timer
/// and any pending grab.
#[derive(Debug)]
pub struct BoothHandle {
    command_tx: mpsc::Sender<BoothCommand>,
    snapshot_rx: watch::Receiver<BoothSnapshot>,
    task: JoinHandle<()>,
}

impl BoothHandle {
    /// Spawns the booth task for `stream`. Each captured photo is also
    /// offered to `cache`.
    #[instrument(skip_all, fields(stream_id = %stream.id()))]
    pub fn spawn(
        stream: Arc<MediaStream>,
        compositor: Compositor,
        interval_secs: u32,
        cache: Option<ArtifactCache>,
    ) -> Self {
        let session = CaptureSession::new(interval_secs);
        let (snapshot_tx, snapshot_rx) = watch::channel(BoothSnapshot::of(&session, None));
        let (command_tx, command_rx) = mpsc::channel(32);

        let driver = BoothDriver {
            session,
            stream,
            compositor: Arc::new(compositor),
            cache,
            command_rx,
            snapshot_tx,
            pending: None,
            last_rejection: None,
        };
        let task = tokio::spawn(driver.run());
        info!("Booth started");

        Self {
            command_tx,
            snapshot_rx,
            task,
        }
    }

    /// Queues a command. The error location is the caller's.
    #[track_caller]
    pub fn send(&self, command: BoothCommand) -> impl Future<Output = CoreResult<()>> + '_ {
        let location = ErrorLocation::from(Location::caller());
        async move {
            self.command_tx
                .send(command)
                .await
                .map_err(|_| BoothError::TaskClosed {
                    task: "booth",
                    location,
                })
        }
    }

    /// Latest published state.
    pub fn snapshot(&self) -> BoothSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Receiver for state updates.
    pub fn subscribe(&self) -> watch::Receiver<BoothSnapshot> {
        self.snapshot_rx.clone()
    }

    /// The four photos once the session is complete.
    #[track_caller]
    pub fn photos(&self) -> impl Future<Output = CoreResult<Option<Vec<EncodedImage>>>> + '_ {
        let location = ErrorLocation::from(Location::caller());
        async move {
            let (reply, rx) = oneshot::channel();
            self.command_tx
                .send(BoothCommand::Photos { reply })
                .await
                .map_err(|_| BoothError::TaskClosed {
                    task: "booth",
                    location,
                })?;
            rx.await.map_err(|_| BoothError::TaskClosed {
                task: "booth",
                location,
            })
        }
    }
}

#[cfg(test)]
impl BoothHandle {
    /// Ends the booth task while keeping the handle.
    pub(crate) fn abort_task(&self) {
        self.task.abort();
    }
}

impl Drop for BoothHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

struct BoothDriver {
    session: CaptureSession,
    stream: Arc<MediaStream>,
    compositor: Arc<Compositor>,
    cache: Option<ArtifactCache>,
    command_rx: mpsc::Receiver<BoothCommand>,
    snapshot_tx: watch::Sender<BoothSnapshot>,
    pending: Option<(CaptureTicket, Instant)>,
    last_rejection: Option<CaptureRejected>,
}

impl BoothDriver {
    async fn run(mut self) {
        let mut ticker = interval_at(Instant::now() + COUNTDOWN_STEP, COUNTDOWN_STEP);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let counting = self.session.countdown().is_some();
            let grab_at = self.pending.map_or_else(Instant::now, |(_, at)| at);

            tokio::select! {
                command = self.command_rx.recv() => match command {
                    Some(command) => {
                        if self.handle(command) {
                            ticker.reset();
                        }
                    }
                    None => break,
                },
                _ = ticker.tick(), if counting => self.on_tick(),
                _ = sleep_until(grab_at), if self.pending.is_some() => self.grab().await,
            }

            self.publish();
        }

        debug!("Booth task stopped");
    }

    /// Returns true when the countdown was (re)started.
    fn handle(&mut self, command: BoothCommand) -> bool {
        let ready = self.stream.ready_state();
        let result = match command {
            BoothCommand::Shoot => self.session.request_manual(ready).map(|t| self.schedule(t)),
            BoothCommand::Retake => self.session.request_retake(ready).map(|t| self.schedule(t)),
            BoothCommand::StartCountdown => {
                let started = self.session.start_countdown();
                self.record(started.map(|_| ()));
                return started.is_ok();
            }
            BoothCommand::CancelCountdown => {
                if self.session.cancel_countdown() {
                    self.pending = None;
                }
                Ok(())
            }
            BoothCommand::SetMode(mode) => {
                self.session.set_mode(mode);
                self.pending = None;
                Ok(())
            }
            BoothCommand::Select(index) => self.session.select(index),
            BoothCommand::ClearSelection => {
                self.session.clear_selection();
                Ok(())
            }
            BoothCommand::Reset => {
                self.session.reset();
                self.pending = None;
                Ok(())
            }
            BoothCommand::Photos { reply } => {
                let _ = reply.send(self.session.photos());
                Ok(())
            }
        };
        self.record(result);
        false
    }

    fn on_tick(&mut self) {
        match self.session.tick(self.stream.ready_state()) {
            TickOutcome::Capture(ticket) => self.schedule(ticket),
            TickOutcome::Counting { remaining_secs } => debug!(remaining_secs, "Countdown"),
            TickOutcome::Finished => info!("Countdown finished"),
            TickOutcome::Idle => {}
        }
    }

    fn schedule(&mut self, ticket: CaptureTicket) {
        debug!(slot = ticket.slot(), kind = ?ticket.kind(), "Capture scheduled");
        self.pending = Some((ticket, Instant::now() + FRAME_DELAY));
    }

    async fn grab(&mut self) {
        let Some((ticket, _)) = self.pending.take() else {
            return;
        };

        let frame = if self.stream.ready_state().has_current_frame() {
            self.stream.video().and_then(|v| v.current_frame())
        } else {
            None
        };
        let Some(frame) = frame else {
            warn!(slot = ticket.slot(), "No frame available, capture dropped");
            let _ = self.session.abort(ticket);
            return;
        };

        let compositor = Arc::clone(&self.compositor);
        let composed = tokio::task::spawn_blocking(move || compositor.compose(&frame)).await;

        match composed {
            Ok(Ok(Some(photo))) => {
                if self.session.complete(ticket, photo.clone()).is_ok()
                    && let Some(cache) = self.cache.clone()
                {
                    // Best effort; the booth never waits on the cache.
                    let _ = tokio::task::spawn_blocking(move || cache.remember_photo(&photo));
                }
            }
            Ok(Ok(None)) => {
                let _ = self.session.abort(ticket);
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Compositing failed");
                let _ = self.session.abort(ticket);
            }
            Err(e) => {
                warn!(error = %e, "Compositing task failed");
                let _ = self.session.abort(ticket);
            }
        }
    }

    fn record(&mut self, result: Result<(), CaptureRejected>) {
        if let Err(reason) = result {
            debug!(%reason, "Booth request ignored");
            self.last_rejection = Some(reason);
        } else {
            self.last_rejection = None;
        }
    }

    fn publish(&self) {
        let snapshot = BoothSnapshot::of(&self.session, self.last_rejection);
        self.snapshot_tx.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }
}
